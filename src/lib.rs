#![warn(missing_docs)]

//! # hana-rs
//!
//! A pure Rust cursor and reply engine for the SAP HANA SQL command network
//! protocol.
//!
//! The crate turns SQL operations into protocol requests, interprets the
//! multi-part replies, and exposes their rows through a DB-API style
//! cursor. Byte-level message encoding, sockets and authentication live
//! behind the [`Transport`] trait.
//!
//! ## Features
//!
//! - **Prepared statements** - cached per connection, keyed by statement id
//! - **Multi-row execution** - parameter rows packed into as few requests as fit
//! - **Multiple result sets** - procedure results and output parameters behind `nextset`
//! - **LOB upload** - continuation writes for values too large for one request
//! - **Percent fallback** - client-side substitution when the server rejects `%s`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hana_rs::{Config, Connection, Value};
//!
//! fn main() -> hana_rs::Result<()> {
//!     let conn = Connection::new(transport, Config::new())?;
//!     let mut cursor = conn.cursor()?;
//!
//!     cursor.execute("SELECT ID, NAME FROM USERS WHERE ID > ?", vec![Value::Integer(10)])?;
//!     for row in cursor.fetchall()? {
//!         println!("User {}: {}", row[0], row[1]);
//!     }
//!
//!     conn.close()
//! }
//! ```
//!
//! ## Stored Procedures
//!
//! Output parameters come first, then each result set in the order the
//! server opened them:
//!
//! ```rust,ignore
//! cursor.execute("CALL GET_STATS(?, ?)", ())?;
//! let output = cursor.fetchone()?;      // output parameter row
//! cursor.nextset()?;
//! let first_table = cursor.fetchall()?; // first result set
//! ```
//!
//! ## Errors
//!
//! Every failure is an [`Error`] that is either a usage error (the API was
//! misused), an interface error (the reply broke the protocol or the
//! transport failed) or a database error (the server rejected the
//! statement). See [`Error::is_usage_error`] and friends.

pub mod batch;
pub mod config;
pub mod connection;
pub mod constants;
pub mod cursor;
pub mod error;
pub mod format;
pub mod messages;
pub mod row;
pub mod statement;
pub mod statement_cache;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use batch::{BoundParameter, ParameterBatch, ParameterRow, Params};
pub use config::Config;
pub use connection::{Connection, ConnectionState};
pub use constants::{FunctionCode, ParameterMode, PartKind, TypeCode};
pub use cursor::Cursor;
pub use error::{Error, Result};
pub use row::{Row, Value};
pub use statement::{
    ColumnDescription, ColumnMetadata, ParameterMetadata, PreparedStatement, ResultSetMetadata,
};
pub use statement_cache::StatementCache;
pub use transport::Transport;
#[cfg(any(test, feature = "testing"))]
pub use transport::{RequestLog, ScriptedTransport};
pub use types::{LobBuffer, LocatorId, ResultSetId, StatementId};
