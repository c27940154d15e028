//! Fetch message for retrieving more rows of an open result set

use crate::constants::MessageType;
use crate::messages::{Request, RequestPart};
use crate::types::ResultSetId;

/// Fetch-next request for one result set
#[derive(Debug)]
pub struct FetchMessage {
    result_set_id: ResultSetId,
    fetch_size: u32,
}

impl FetchMessage {
    /// Create a new fetch message
    pub fn new(result_set_id: ResultSetId, fetch_size: u32) -> Self {
        Self {
            result_set_id,
            fetch_size,
        }
    }

    /// Build the fetch request
    pub fn build_request(&self, auto_commit: bool) -> Request {
        Request::new(MessageType::FetchNext, auto_commit)
            .with_part(RequestPart::ResultSetId(self.result_set_id))
            .with_part(RequestPart::FetchSize(self.fetch_size))
    }

    /// Get the result set id
    pub fn result_set_id(&self) -> ResultSetId {
        self.result_set_id
    }

    /// Get the number of rows to fetch
    pub fn fetch_size(&self) -> u32 {
        self.fetch_size
    }
}
