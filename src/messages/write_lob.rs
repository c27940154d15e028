//! Write-lob request for LOB continuation data

use bytes::Bytes;
use std::collections::VecDeque;

use crate::constants::{lob_options, MessageType, WRITE_LOB_CHUNK_HEADER_SIZE};
use crate::error::{Error, Result};
use crate::messages::{Request, RequestPart};
use crate::types::{LobBuffer, LocatorId};

/// One chunk of LOB data addressed to a locator
#[derive(Debug, Clone, PartialEq)]
pub struct WriteLobChunk {
    /// Target locator
    pub locator_id: LocatorId,
    /// Option bits (`lob_options`)
    pub options: u8,
    /// Byte offset of the chunk within the LOB value
    pub offset: usize,
    /// Chunk bytes
    pub data: Bytes,
}

impl WriteLobChunk {
    /// Check if this chunk completes its LOB
    pub fn is_last(&self) -> bool {
        self.options & lob_options::LAST_DATA != 0
    }
}

/// Chunks of one write-lob request
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WriteLobRequest {
    /// Chunks in send order
    pub chunks: Vec<WriteLobChunk>,
}

impl WriteLobRequest {
    /// Take as much pending data from the front of `lobs` as fits into
    /// `max_payload` bytes.
    ///
    /// Buffers that become complete are removed from the queue. A buffer
    /// without a locator id is an interface error.
    pub fn drain(lobs: &mut VecDeque<LobBuffer>, max_payload: usize) -> Result<WriteLobRequest> {
        let mut request = WriteLobRequest::default();
        let mut room = max_payload;

        while let Some(buffer) = lobs.front_mut() {
            if room <= WRITE_LOB_CHUNK_HEADER_SIZE && !request.chunks.is_empty() {
                break;
            }
            let locator_id = buffer
                .locator_id()
                .ok_or_else(|| Error::interface("LOB buffer has no locator id"))?;

            let offset = buffer.offset();
            let budget = room.saturating_sub(WRITE_LOB_CHUNK_HEADER_SIZE).max(1);
            let data = buffer.take_chunk(budget);
            room = room.saturating_sub(WRITE_LOB_CHUNK_HEADER_SIZE + data.len());

            let mut options = lob_options::DATA_INCLUDED;
            let complete = buffer.is_complete();
            if complete {
                options |= lob_options::LAST_DATA;
            }
            request.chunks.push(WriteLobChunk {
                locator_id,
                options,
                offset,
                data,
            });

            if !complete {
                break;
            }
            lobs.pop_front();
        }

        Ok(request)
    }

    /// Build the write-lob request
    pub fn build_request(self, auto_commit: bool) -> Request {
        Request::new(MessageType::WriteLob, auto_commit)
            .with_part(RequestPart::WriteLobRequest(self))
    }

    /// Total chunk bytes in the request
    pub fn data_len(&self) -> usize {
        self.chunks.iter().map(|chunk| chunk.data.len()).sum()
    }
}
