//! Fetching rows from the selected result set
//!
//! Rows come from the local buffer of the selected result set. A fetch-next
//! request is sent only when that buffer was never filled, or when the
//! previous round of the same `fetchmany` call came back empty, and never
//! for a result set the server already closed.

use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::messages::{FetchMessage, Part};
use crate::row::Row;

/// Where the rows of a fetch round come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowSource {
    OutputParameters,
    ResultSet,
}

impl Cursor {
    /// Make sure the current row source has a buffer, refilling it from the
    /// server when it is absent or `force_refill` is set
    fn fill_buffer(&mut self, fetch_size: usize, force_refill: bool) -> Result<RowSource> {
        if self.stream.has_output_params() {
            return Ok(RowSource::OutputParameters);
        }
        let id = self
            .stream
            .current_id()
            .ok_or_else(|| Error::usage("no result set to fetch from"))?;
        let needs_fetch = self
            .stream
            .current()
            .is_some_and(|state| (state.buffer.is_none() || force_refill) && !state.closed);
        if !needs_fetch {
            return Ok(RowSource::ResultSet);
        }

        let fetch_size = u32::try_from(fetch_size).unwrap_or(u32::MAX);
        let request = FetchMessage::new(id, fetch_size).build_request(self.auto_commit()?);
        let reply = self.send(&request)?;
        let part = reply
            .segments
            .into_iter()
            .flat_map(|segment| segment.parts)
            .find_map(|part| match part {
                Part::ResultSet(rows) => Some(rows),
                _ => None,
            })
            .ok_or_else(|| Error::interface("fetch reply without result set part"))?;

        let state = self
            .stream
            .current_mut()
            .ok_or_else(|| Error::Internal("selected result set vanished".to_string()))?;
        let count = state.load(part)?;
        tracing::trace!(
            result_set_id = %id,
            requested = fetch_size,
            rows = count,
            closed = state.closed,
            "Fetched rows"
        );
        Ok(RowSource::ResultSet)
    }

    fn take_rows(&mut self, source: RowSource, max: usize) -> Vec<Row> {
        let buffer = match source {
            RowSource::OutputParameters => self.stream.output_params_mut(),
            RowSource::ResultSet => self
                .stream
                .current_mut()
                .and_then(|state| state.buffer.as_mut()),
        };
        match buffer {
            Some(buffer) => {
                let count = max.min(buffer.len());
                buffer.drain(..count).collect()
            }
            None => Vec::new(),
        }
    }

    fn current_closed(&self) -> bool {
        self.stream.current().map_or(true, |state| state.closed)
    }

    /// Whether the current row source has nothing left to hand out
    fn source_exhausted(&self) -> bool {
        if self.stream.has_output_params() {
            return true;
        }
        self.stream.current().map_or(true, |state| state.is_exhausted())
    }

    /// Fetch up to `size` rows, or `arraysize` rows when `size` is `None`.
    ///
    /// Fewer rows than requested are returned when the result set ends.
    /// Output parameters are returned in one round and never mixed with
    /// result set rows.
    pub fn fetchmany(&mut self, size: Option<usize>) -> Result<Vec<Row>> {
        self.connection()?;
        if !self.executed {
            return Err(Error::usage("require execute() first"));
        }
        let size = size.unwrap_or(self.arraysize);

        let mut result = Vec::with_capacity(size.min(1024));
        let mut last_round: Option<usize> = None;
        while result.len() < size {
            let force_refill = last_round == Some(0);
            let wanted = size - result.len();
            let source = self.fill_buffer(wanted, force_refill)?;
            let rows = self.take_rows(source, wanted);
            let taken = rows.len();
            result.extend(rows);

            if source == RowSource::OutputParameters
                || result.len() == size
                || self.current_closed()
            {
                break;
            }
            if force_refill && taken == 0 {
                tracing::debug!("Fetch-next returned no rows for an open result set");
                break;
            }
            last_round = Some(taken);
        }
        Ok(result)
    }

    /// Fetch the next row, or `None` when the current source is exhausted
    pub fn fetchone(&mut self) -> Result<Option<Row>> {
        Ok(self.fetchmany(Some(1))?.into_iter().next())
    }

    /// Fetch all remaining rows of the current source
    pub fn fetchall(&mut self) -> Result<Vec<Row>> {
        let block_size = self.connection()?.config().fetchall_block_size;
        let mut rows = Vec::new();
        loop {
            let block = self.fetchmany(Some(block_size))?;
            let fetched = block.len();
            rows.extend(block);
            if fetched == 0 || self.source_exhausted() {
                break;
            }
        }
        Ok(rows)
    }
}
