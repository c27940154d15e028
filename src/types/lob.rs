//! Buffers for LOB data that did not fit into an execute request

use bytes::Bytes;

use crate::constants::TypeCode;
use crate::types::LocatorId;

/// LOB payload still owed to the server.
///
/// Created while packing a parameters part, one per LOB value whose bytes
/// were not sent completely inline. The server answers the execute request
/// with one locator id per such buffer, after which the remaining bytes are
/// streamed with write-lob requests.
#[derive(Debug, Clone)]
pub struct LobBuffer {
    data: Bytes,
    offset: usize,
    locator_id: Option<LocatorId>,
    type_code: TypeCode,
}

impl LobBuffer {
    /// Create a buffer for `data`, of which `sent` bytes already went inline
    pub fn new(type_code: TypeCode, data: Bytes, sent: usize) -> Self {
        Self {
            offset: sent.min(data.len()),
            data,
            locator_id: None,
            type_code,
        }
    }

    /// Type of the LOB column
    pub fn type_code(&self) -> TypeCode {
        self.type_code
    }

    /// Total encoded length of the LOB value
    pub fn total_len(&self) -> usize {
        self.data.len()
    }

    /// Bytes written so far (inline plus continuation chunks)
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes not yet written
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Whether every byte has been written
    pub fn is_complete(&self) -> bool {
        self.remaining() == 0
    }

    /// Locator assigned by the server, once known
    pub fn locator_id(&self) -> Option<LocatorId> {
        self.locator_id
    }

    /// Attach the locator id from the write-lob reply
    pub fn set_locator_id(&mut self, locator_id: LocatorId) {
        self.locator_id = Some(locator_id);
    }

    /// Take up to `max` of the remaining bytes and advance the offset.
    ///
    /// The returned slice shares the underlying allocation.
    pub fn take_chunk(&mut self, max: usize) -> Bytes {
        let end = self.offset + max.min(self.remaining());
        let chunk = self.data.slice(self.offset..end);
        self.offset = end;
        chunk
    }
}
