//! Transport layer for HANA connections
//!
//! A transport performs one request/response round trip: it encodes the
//! request into a message, sends it, and decodes the reply segments and
//! parts. Socket handling, authentication and byte-level codecs live
//! behind this trait.

#[cfg(any(test, feature = "testing"))]
mod scripted;

#[cfg(any(test, feature = "testing"))]
pub use scripted::{RequestLog, ScriptedTransport};

use crate::error::Result;
use crate::messages::{Reply, Request};

/// Trait for transport implementations
pub trait Transport: Send {
    /// Send a request and wait for its decoded reply
    fn round_trip(&mut self, request: &Request) -> Result<Reply>;

    /// Check if the transport is connected
    fn is_connected(&self) -> bool;

    /// Close the connection
    fn close(&mut self) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn round_trip(&mut self, request: &Request) -> Result<Reply> {
        (**self).round_trip(request)
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}
