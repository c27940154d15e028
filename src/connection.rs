//! HANA database connection
//!
//! This module provides the `Connection` handle shared by cursors. It owns
//! the transport, the prepared statement cache and the transaction flags
//! relayed by the server.
//!
//! # Example
//!
//! ```rust,ignore
//! use hana_rs::{Config, Connection, Params};
//!
//! let conn = Connection::new(transport, Config::new().auto_commit(true))?;
//! let mut cursor = conn.cursor()?;
//!
//! cursor.execute("SELECT * FROM EMPLOYEES", ())?;
//! while let Some(row) = cursor.fetchone()? {
//!     println!("{:?}", row);
//! }
//!
//! conn.close()?;
//! ```

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::Config;
use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::messages::{Part, Reply, Request, TransactionFlags};
use crate::statement::PreparedStatement;
use crate::statement_cache::StatementCache;
use crate::transport::Transport;
use crate::types::StatementId;

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Ready for requests
    Ready,
    /// Connection is closed
    Closed,
}

/// State behind the connection lock
struct ConnectionInner {
    transport: Box<dyn Transport>,
    state: ConnectionState,
    statement_cache: StatementCache,
    transaction_flags: TransactionFlags,
    round_trips: u64,
}

/// A connection to a HANA database.
///
/// `Connection` is a cheap, cloneable handle. Clones and the cursors created
/// from them share one transport; every round trip holds the connection
/// lock, so requests are never pipelined.
#[derive(Clone)]
pub struct Connection {
    inner: Arc<Mutex<ConnectionInner>>,
    config: Arc<Config>,
    closed: Arc<AtomicBool>,
    id: u32,
}

// Connection ID counter
static CONNECTION_ID_COUNTER: AtomicU32 = AtomicU32::new(1);

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Connection {
    /// Create a connection over an established, authenticated transport
    pub fn new(transport: impl Transport + 'static, config: Config) -> Result<Self> {
        config.validate()?;
        let id = CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed);

        let inner = ConnectionInner {
            transport: Box::new(transport),
            state: ConnectionState::Ready,
            statement_cache: StatementCache::new(),
            transaction_flags: TransactionFlags::default(),
            round_trips: 0,
        };

        tracing::debug!(connection_id = id, config = %config, "Connection opened");

        Ok(Connection {
            inner: Arc::new(Mutex::new(inner)),
            config: Arc::new(config),
            closed: Arc::new(AtomicBool::new(false)),
            id,
        })
    }

    /// Get the connection ID
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Check if the connection is closed
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }

    /// Get the current connection state
    pub fn state(&self) -> Result<ConnectionState> {
        Ok(self.lock()?.state)
    }

    /// Create a cursor on this connection
    pub fn cursor(&self) -> Result<Cursor> {
        if self.is_closed() {
            return Err(Error::usage("connection closed"));
        }
        Ok(Cursor::new(self.clone()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ConnectionInner>> {
        self.inner
            .lock()
            .map_err(|_| Error::Internal("connection lock poisoned".to_string()))
    }

    /// Send a request and return its reply.
    ///
    /// Error parts in the reply become [`Error::Database`]; warnings are
    /// logged and skipped. Transaction flags are recorded on the connection.
    pub fn send_request(&self, request: &Request) -> Result<Reply> {
        if self.is_closed() {
            return Err(Error::ConnectionClosed);
        }
        let mut inner = self.lock()?;
        if inner.state == ConnectionState::Closed {
            return Err(Error::ConnectionClosed);
        }

        tracing::trace!(
            connection_id = self.id,
            message_type = ?request.message_type(),
            parts = ?request.part_kinds(),
            "Sending request"
        );
        inner.round_trips += 1;
        let reply = inner.transport.round_trip(request)?;

        for part in reply.parts() {
            match part {
                Part::Error(errors) => {
                    for error in errors {
                        if error.is_warning() {
                            tracing::warn!(
                                code = error.code,
                                message = %error.message,
                                "Server warning"
                            );
                        } else {
                            tracing::debug!(
                                code = error.code,
                                sql_state = %error.sql_state,
                                "Server reported error"
                            );
                            return Err(error.clone().into());
                        }
                    }
                }
                Part::TransactionFlags(flags) => {
                    tracing::trace!(flags = ?flags, "Transaction flags");
                    inner.transaction_flags = *flags;
                }
                _ => {}
            }
        }

        Ok(reply)
    }

    /// Transaction flags from the most recent reply that carried them
    pub fn transaction_flags(&self) -> Result<TransactionFlags> {
        Ok(self.lock()?.transaction_flags)
    }

    /// Number of round trips performed on this connection
    pub fn round_trips(&self) -> Result<u64> {
        Ok(self.lock()?.round_trips)
    }

    /// Add a prepared statement to the connection's cache
    pub fn cache_statement(&self, statement: PreparedStatement) -> Result<Arc<PreparedStatement>> {
        Ok(self.lock()?.statement_cache.insert(statement))
    }

    /// Look up a cached prepared statement
    pub fn cached_statement(&self, id: &StatementId) -> Result<Option<Arc<PreparedStatement>>> {
        Ok(self.lock()?.statement_cache.get(id))
    }

    /// Ids of all cached prepared statements
    pub fn cached_statement_ids(&self) -> Result<Vec<StatementId>> {
        Ok(self.lock()?.statement_cache.ids())
    }

    /// Close the connection.
    ///
    /// Clears the statement cache and closes the transport. Cursors created
    /// from this connection fail with a usage error afterwards. Closing an
    /// already closed connection does nothing.
    pub fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::Relaxed) {
            return Ok(());
        }

        let mut inner = self.lock()?;
        inner.state = ConnectionState::Closed;
        inner.statement_cache.clear();
        let result = inner.transport.close();
        tracing::debug!(connection_id = self.id, "Connection closed");
        result
    }
}
