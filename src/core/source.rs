//! Purpose: Capability seams between the dump pipeline and its collaborators.
//! Exports: `RowSource`, `RowCursor`, `RowDisplay`.
//! Role: Lets the range reader and dispatcher run against any decoder or display.
//! Invariants: Cursors yield rows strictly in storage order; `Ok(None)` marks the end.
//! Invariants: A cursor error is a decode failure for the row at the current position.
//! Invariants: `RowSource::close` is idempotent.

use serde_json::Value;

use crate::core::error::Error;
use crate::core::row::Row;

/// An opened file that can describe itself and hand out sequential cursors.
pub trait RowSource {
    fn schema(&self) -> Result<Value, Error>;

    fn row_count(&self) -> Result<u64, Error>;

    /// A fresh cursor positioned before the first row.
    fn cursor(&self) -> Result<Box<dyn RowCursor + '_>, Error>;

    fn close(&mut self);
}

pub trait RowCursor {
    fn next_row(&mut self) -> Result<Option<Row>, Error>;
}

/// Renders one value at a time for a human, with no framing between values.
pub trait RowDisplay {
    fn show(&mut self, value: &Value) -> Result<(), Error>;
}
