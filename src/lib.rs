//! Purpose: Library crate behind the `parquetscraper` CLI and its tests.
//! Exports: `core` (row model, sources, normalization, range reader, JSON framing, errors).
//! Role: Keeps dump semantics testable without the binary; the CLI only wires it up.
//! Invariants: Core modules take explicit inputs (sources, ranges, sinks); no ambient config.
//! Invariants: Only `core::parquet_source` names the decoder's concrete types.
pub mod core;

pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::memory::MemorySource;
pub use crate::core::parquet_source::ParquetSource;
pub use crate::core::range::RowRange;
pub use crate::core::range_reader::{ReadSummary, RowSink, read_rows};
pub use crate::core::row::{Row, RowValue};
pub use crate::core::source::{RowCursor, RowDisplay, RowSource};
