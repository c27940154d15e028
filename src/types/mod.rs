//! HANA protocol identifier and large object types
//!
//! Statement, result set and LOB locator ids are opaque 8-byte values
//! assigned by the server. LOB buffers carry the bytes of large object
//! parameters that still have to be written after an execute request.

mod ids;
mod lob;

pub use ids::{LocatorId, ResultSetId, StatementId};
pub use lob::LobBuffer;
