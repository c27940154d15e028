//! Result set tracking for one logical execution
//!
//! A single execution can open several result sets and return an output
//! parameter row. Ids, metadata and rows arrive as separate parts in any
//! order the server chooses; this module pairs them up and keeps one
//! forward-only navigation position across them.

use indexmap::IndexMap;
use std::collections::VecDeque;

use crate::constants::TypeCode;
use crate::error::{Error, Result};
use crate::messages::ResultSetPart;
use crate::row::Row;
use crate::statement::{ColumnDescription, ResultSetMetadata};
use crate::types::ResultSetId;

/// Described columns of a result set whose id is not known yet
#[derive(Debug, Clone, PartialEq)]
struct DescribedColumns {
    description: Vec<ColumnDescription>,
    codecs: Vec<TypeCode>,
}

impl DescribedColumns {
    fn from_metadata(metadata: &ResultSetMetadata) -> Result<Self> {
        Ok(Self {
            description: metadata.describe()?,
            codecs: metadata.codecs()?,
        })
    }
}

/// Half of a result set announcement waiting for its other half
#[derive(Debug, Clone, PartialEq, Default)]
enum PendingResultSet {
    #[default]
    Empty,
    IdSeen(ResultSetId),
    MetadataSeen(DescribedColumns),
}

/// State of one committed result set
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ResultSetState {
    pub(crate) description: Vec<ColumnDescription>,
    pub(crate) codecs: Vec<TypeCode>,
    /// Rows not yet handed out; `None` until the first row part arrives
    pub(crate) buffer: Option<VecDeque<Row>>,
    pub(crate) closed: bool,
}

impl ResultSetState {
    fn new(columns: DescribedColumns) -> Self {
        Self {
            description: columns.description,
            codecs: columns.codecs,
            buffer: None,
            closed: false,
        }
    }

    /// Replace the buffer with the rows of `part`
    pub(crate) fn load(&mut self, part: ResultSetPart) -> Result<usize> {
        self.closed = part.is_closed();
        let rows = part.unpack_rows(&self.codecs)?;
        let count = rows.len();
        self.buffer = Some(rows.into());
        Ok(count)
    }

    /// Whether the result set is closed and every row was handed out
    pub(crate) fn is_exhausted(&self) -> bool {
        self.closed && self.buffer.as_ref().map_or(true, VecDeque::is_empty)
    }
}

/// Result sets and output parameters of the current execution
#[derive(Debug, Default)]
pub(crate) struct ResultStream {
    pending: PendingResultSet,
    result_sets: IndexMap<ResultSetId, ResultSetState>,
    current: Option<usize>,
    last_id: Option<ResultSetId>,
    output_params: Option<VecDeque<Row>>,
}

impl ResultStream {
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    /// Take a result set id part
    pub(crate) fn absorb_id(&mut self, id: ResultSetId) {
        self.last_id = Some(id);
        match std::mem::take(&mut self.pending) {
            PendingResultSet::MetadataSeen(columns) => self.commit(id, columns),
            PendingResultSet::Empty | PendingResultSet::IdSeen(_) => {
                self.pending = PendingResultSet::IdSeen(id);
            }
        }
    }

    /// Take result set metadata, from a reply part or the prepared statement
    pub(crate) fn absorb_metadata(&mut self, metadata: &ResultSetMetadata) -> Result<()> {
        let columns = DescribedColumns::from_metadata(metadata)?;
        match std::mem::take(&mut self.pending) {
            PendingResultSet::IdSeen(id) => self.commit(id, columns),
            PendingResultSet::Empty | PendingResultSet::MetadataSeen(_) => {
                self.pending = PendingResultSet::MetadataSeen(columns);
            }
        }
        Ok(())
    }

    fn commit(&mut self, id: ResultSetId, columns: DescribedColumns) {
        if self.result_sets.contains_key(&id) {
            tracing::trace!(result_set_id = %id, "Result set already known, keeping first metadata");
            return;
        }
        let (index, _) = self.result_sets.insert_full(id, ResultSetState::new(columns));
        if self.current.is_none() {
            self.current = Some(index);
        }
        tracing::debug!(
            result_set_id = %id,
            position = index,
            "Result set committed"
        );
    }

    /// Take a row part; rows belong to the most recently announced id
    pub(crate) fn absorb_rows(&mut self, part: ResultSetPart) -> Result<()> {
        let id = self
            .last_id
            .ok_or_else(|| Error::interface("result set rows received before any result set id"))?;
        let state = self.result_sets.get_mut(&id).ok_or_else(|| {
            Error::interface(format!("result set rows received for unknown result set {}", id))
        })?;
        let count = state.load(part)?;
        tracing::trace!(
            result_set_id = %id,
            rows = count,
            closed = state.closed,
            "Buffered result set rows"
        );
        Ok(())
    }

    /// Take the output parameter row of a procedure call
    pub(crate) fn absorb_output_params(&mut self, rows: Vec<Row>) {
        self.output_params = Some(rows.into());
    }

    /// Whether output parameters are pending
    pub(crate) fn has_output_params(&self) -> bool {
        self.output_params.is_some()
    }

    /// Output parameter rows not yet handed out
    pub(crate) fn output_params_mut(&mut self) -> Option<&mut VecDeque<Row>> {
        self.output_params.as_mut()
    }

    /// Id of the selected result set
    pub(crate) fn current_id(&self) -> Option<ResultSetId> {
        self.current
            .and_then(|index| self.result_sets.get_index(index))
            .map(|(id, _)| *id)
    }

    /// The selected result set
    pub(crate) fn current(&self) -> Option<&ResultSetState> {
        self.current
            .and_then(|index| self.result_sets.get_index(index))
            .map(|(_, state)| state)
    }

    /// The selected result set, mutably
    pub(crate) fn current_mut(&mut self) -> Option<&mut ResultSetState> {
        self.current
            .and_then(|index| self.result_sets.get_index_mut(index))
            .map(|(_, state)| state)
    }

    /// Ids of all committed result sets, in arrival order
    pub(crate) fn ids(&self) -> Vec<ResultSetId> {
        self.result_sets.keys().copied().collect()
    }

    /// Move to the next source of rows.
    ///
    /// Pending output parameters are dropped first; otherwise the selection
    /// advances to the next result set. Returns whether a source remains.
    pub(crate) fn next_result_set(&mut self) -> bool {
        if self.output_params.take().is_some() {
            return self.current.is_some();
        }
        let Some(index) = self.current else {
            return false;
        };
        if index + 1 < self.result_sets.len() {
            self.current = Some(index + 1);
            true
        } else {
            false
        }
    }
}
