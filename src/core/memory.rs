//! Purpose: In-memory `RowSource` over a fixed list of rows.
//! Exports: `MemorySource`.
//! Role: Exercises the dump pipeline without a file; used by unit and CLI-level tests.
//! Invariants: Rows come out in insertion order.
//! Invariants: A configured failure position turns that cursor step into a Corrupt error.

use std::cell::Cell;

use serde_json::Value;

use crate::core::error::{Error, ErrorKind};
use crate::core::row::Row;
use crate::core::source::{RowCursor, RowSource};

#[derive(Debug, Default)]
pub struct MemorySource {
    schema: Value,
    rows: Vec<Row>,
    fail_at: Option<u64>,
    cursors_opened: Cell<u64>,
    rows_pulled: Cell<u64>,
    closed: u64,
}

impl MemorySource {
    pub fn new(schema: Value, rows: Vec<Row>) -> Self {
        Self {
            schema,
            rows,
            ..Self::default()
        }
    }

    /// Makes the cursor fail when it reaches `position` instead of yielding that row.
    pub fn with_failure_at(mut self, position: u64) -> Self {
        self.fail_at = Some(position);
        self
    }

    pub fn cursors_opened(&self) -> u64 {
        self.cursors_opened.get()
    }

    /// Rows handed out across all cursors.
    pub fn rows_pulled(&self) -> u64 {
        self.rows_pulled.get()
    }

    pub fn close_count(&self) -> u64 {
        self.closed
    }
}

impl RowSource for MemorySource {
    fn schema(&self) -> Result<Value, Error> {
        Ok(self.schema.clone())
    }

    fn row_count(&self) -> Result<u64, Error> {
        Ok(self.rows.len() as u64)
    }

    fn cursor(&self) -> Result<Box<dyn RowCursor + '_>, Error> {
        self.cursors_opened.set(self.cursors_opened.get() + 1);
        Ok(Box::new(MemoryCursor {
            source: self,
            position: 0,
        }))
    }

    fn close(&mut self) {
        self.closed += 1;
    }
}

struct MemoryCursor<'a> {
    source: &'a MemorySource,
    position: u64,
}

impl RowCursor for MemoryCursor<'_> {
    fn next_row(&mut self) -> Result<Option<Row>, Error> {
        if self.source.fail_at == Some(self.position) {
            return Err(Error::new(ErrorKind::Corrupt).with_message("simulated decode failure"));
        }
        let Some(row) = usize::try_from(self.position)
            .ok()
            .and_then(|idx| self.source.rows.get(idx))
        else {
            return Ok(None);
        };
        self.position += 1;
        let pulled = &self.source.rows_pulled;
        pulled.set(pulled.get() + 1);
        Ok(Some(row.clone()))
    }
}
