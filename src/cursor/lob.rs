//! LOB continuation writes
//!
//! When an insert or update could not carry all LOB bytes inline, the
//! server answers with one locator per unfinished value. The remaining
//! bytes are then streamed with write-lob requests, in buffer order.

use std::collections::VecDeque;

use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::messages::WriteLobRequest;
use crate::types::{LobBuffer, LocatorId};

/// Pair the locators of a write-lob reply with the unwritten buffers.
///
/// Locators are matched one-to-one in order. A reply for a request that
/// left nothing unwritten is ignored.
pub(super) fn attach_locators(
    lobs: &mut VecDeque<LobBuffer>,
    locator_ids: &[LocatorId],
) -> Result<()> {
    if lobs.is_empty() {
        if !locator_ids.is_empty() {
            tracing::debug!(
                locators = locator_ids.len(),
                "Write-lob reply for a request without pending LOB data"
            );
        }
        return Ok(());
    }
    if lobs.len() != locator_ids.len() {
        return Err(Error::interface(format!(
            "write-lob reply carries {} locators for {} unwritten LOBs",
            locator_ids.len(),
            lobs.len()
        )));
    }
    for (buffer, locator_id) in lobs.iter_mut().zip(locator_ids) {
        buffer.set_locator_id(*locator_id);
    }
    Ok(())
}

impl Cursor {
    /// Send the remaining bytes of every buffer, as many requests as needed
    pub(super) fn write_lobs(&mut self, lobs: &mut VecDeque<LobBuffer>) -> Result<()> {
        let auto_commit = self.auto_commit()?;
        let max_payload = self.max_payload_size()?;

        while let Some(front) = lobs.front() {
            let locator = front
                .locator_id()
                .ok_or_else(|| Error::interface("LOB buffer has no locator id"))?;
            let request = WriteLobRequest::drain(lobs, max_payload)?;
            tracing::trace!(
                locator = %locator,
                chunks = request.chunks.len(),
                bytes = request.data_len(),
                pending = lobs.len(),
                "Writing LOB data"
            );
            self.send(&request.build_request(auto_commit))
                .map_err(|source| Error::LobWrite {
                    locator,
                    source: Box::new(source),
                })?;
        }
        Ok(())
    }
}
