//! HANA SQL command protocol messages
//!
//! Requests are built from typed parts and handed to a [`Transport`] which
//! owns the byte-level encoding. Replies come back as segments of decoded
//! parts.
//!
//! [`Transport`]: crate::transport::Transport

mod execute;
mod fetch;
mod parts;
mod write_lob;

pub use execute::{ExecuteDirectMessage, ExecuteMessage, InlineLob, ParametersPart, PrepareMessage};
pub use fetch::FetchMessage;
pub use parts::{
    ErrorLevel, OutputParametersPart, Part, ResultSetPart, ServerError, TransactionFlags,
};
pub use write_lob::{WriteLobChunk, WriteLobRequest};

use crate::constants::{FunctionCode, MessageType, PartKind};
use crate::error::Result;
use crate::types::{ResultSetId, StatementId};

/// A request message with a single segment
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    message_type: MessageType,
    auto_commit: bool,
    parts: Vec<RequestPart>,
}

impl Request {
    /// Create an empty request of the given type
    pub fn new(message_type: MessageType, auto_commit: bool) -> Self {
        Self {
            message_type,
            auto_commit,
            parts: Vec::new(),
        }
    }

    /// Append a part
    pub fn with_part(mut self, part: RequestPart) -> Self {
        self.parts.push(part);
        self
    }

    /// Message type of the request segment
    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    /// Whether the server commits after executing the request
    pub fn auto_commit(&self) -> bool {
        self.auto_commit
    }

    /// Parts in send order
    pub fn parts(&self) -> &[RequestPart] {
        &self.parts
    }

    /// Part kinds in send order
    pub fn part_kinds(&self) -> Vec<PartKind> {
        self.parts.iter().map(RequestPart::kind).collect()
    }

    /// The command text, if the request carries one
    pub fn command(&self) -> Option<&str> {
        self.parts.iter().find_map(|part| match part {
            RequestPart::Command(sql) => Some(sql.as_str()),
            _ => None,
        })
    }
}

/// A part of a request segment
#[derive(Debug, Clone, PartialEq)]
pub enum RequestPart {
    /// SQL text
    Command(String),
    /// Prepared statement to execute
    StatementId(StatementId),
    /// Bound parameter rows
    Parameters(ParametersPart),
    /// Result set to fetch from
    ResultSetId(ResultSetId),
    /// Number of rows to fetch
    FetchSize(u32),
    /// LOB continuation data
    WriteLobRequest(WriteLobRequest),
}

impl RequestPart {
    /// Kind tag sent in the part header
    pub fn kind(&self) -> PartKind {
        match self {
            RequestPart::Command(_) => PartKind::Command,
            RequestPart::StatementId(_) => PartKind::StatementId,
            RequestPart::Parameters(_) => PartKind::Parameters,
            RequestPart::ResultSetId(_) => PartKind::ResultSetId,
            RequestPart::FetchSize(_) => PartKind::FetchSize,
            RequestPart::WriteLobRequest(_) => PartKind::WriteLobRequest,
        }
    }
}

/// A decoded reply message
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reply {
    /// Reply segments in arrival order
    pub segments: Vec<Segment>,
}

impl Reply {
    /// Create a reply from segments
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Create a reply with one segment
    pub fn single(segment: Segment) -> Self {
        Self {
            segments: vec![segment],
        }
    }

    /// All parts of all segments, in arrival order
    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.segments.iter().flat_map(|segment| segment.parts.iter())
    }
}

/// One reply segment
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    function_code: u16,
    /// Decoded parts in arrival order
    pub parts: Vec<Part>,
}

impl Segment {
    /// Create a segment with a known function code
    pub fn new(function_code: FunctionCode, parts: Vec<Part>) -> Self {
        Self {
            function_code: function_code as u16,
            parts,
        }
    }

    /// Create a segment from the raw function code number
    pub fn from_raw(function_code: u16, parts: Vec<Part>) -> Self {
        Self {
            function_code,
            parts,
        }
    }

    /// Raw function code number
    pub fn raw_function_code(&self) -> u16 {
        self.function_code
    }

    /// Function code; an unknown number is an interface error
    pub fn function_code(&self) -> Result<FunctionCode> {
        FunctionCode::try_from(self.function_code)
    }
}
