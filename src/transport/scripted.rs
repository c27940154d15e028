//! In-memory transport replaying scripted replies
//!
//! Used to drive the cursor without a server: every request is recorded
//! and answered with the next queued reply.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::messages::{Reply, Request};
use crate::transport::Transport;

/// Shared record of the requests a [`ScriptedTransport`] received
#[derive(Debug, Clone, Default)]
pub struct RequestLog {
    requests: Arc<Mutex<Vec<Request>>>,
}

impl RequestLog {
    fn lock(&self) -> MutexGuard<'_, Vec<Request>> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, request: Request) {
        self.lock().push(request);
    }

    /// Copy of all recorded requests
    pub fn requests(&self) -> Vec<Request> {
        self.lock().clone()
    }

    /// Number of recorded requests
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if no request was recorded
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// The most recent request
    pub fn last(&self) -> Option<Request> {
        self.lock().last().cloned()
    }
}

/// Transport answering requests from a queue of scripted outcomes
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    outcomes: VecDeque<Result<Reply>>,
    log: RequestLog,
    closed: bool,
}

impl ScriptedTransport {
    /// Create a transport with an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply
    pub fn push_reply(&mut self, reply: Reply) -> &mut Self {
        self.outcomes.push_back(Ok(reply));
        self
    }

    /// Queue a failure
    pub fn push_error(&mut self, error: Error) -> &mut Self {
        self.outcomes.push_back(Err(error));
        self
    }

    /// Queue a reply, builder style
    pub fn with_reply(mut self, reply: Reply) -> Self {
        self.push_reply(reply);
        self
    }

    /// Queue a failure, builder style
    pub fn with_error(mut self, error: Error) -> Self {
        self.push_error(error);
        self
    }

    /// Handle on the request log, usable after the transport moved
    pub fn log(&self) -> RequestLog {
        self.log.clone()
    }

    /// Number of outcomes not yet consumed
    pub fn remaining(&self) -> usize {
        self.outcomes.len()
    }
}

impl Transport for ScriptedTransport {
    fn round_trip(&mut self, request: &Request) -> Result<Reply> {
        if self.closed {
            return Err(Error::ConnectionClosed);
        }
        self.log.push(request.clone());
        self.outcomes.pop_front().unwrap_or_else(|| {
            Err(Error::interface(format!(
                "no scripted reply for {:?} request",
                request.message_type()
            )))
        })
    }

    fn is_connected(&self) -> bool {
        !self.closed
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}
