//! Purpose: Stream rows inside an inclusive position window from a cursor to a sink.
//! Exports: `read_rows`, `RowSink`, `ReadSummary`.
//! Role: Core of the `read` command; owns array framing for export sinks.
//! Invariants: Rows are delivered in cursor order; positions are 0-based and count every row.
//! Invariants: Only in-range rows are normalized; out-of-range rows are dropped untouched.
//! Invariants: Export output is a closed JSON array even when the cursor fails mid-stream.
//! Invariants: Display output carries no array framing or separators.
//! Notes: Consumption stops once the position passes `to`; later rows can never match.

use std::io::Write;

use tracing::debug;

use crate::core::error::Error;
use crate::core::json_array::JsonArrayWriter;
use crate::core::normalize::normalize_row;
use crate::core::range::RowRange;
use crate::core::row::Row;
use crate::core::source::{RowDisplay, RowSource};

pub enum RowSink<'a, W: Write> {
    /// Byte stream receiving one pretty-printed JSON array.
    Export(&'a mut W),
    /// Per-row human rendering.
    Display(&'a mut dyn RowDisplay),
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ReadSummary {
    /// Rows pulled from the cursor, in range or not.
    pub scanned: u64,
    pub emitted: u64,
}

pub fn read_rows<W: Write>(
    source: &dyn RowSource,
    range: RowRange,
    sink: RowSink<'_, W>,
) -> Result<ReadSummary, Error> {
    match sink {
        RowSink::Export(out) => {
            let mut writer = JsonArrayWriter::open(out)?;
            let scanned = scan(source, range, |row| writer.write_element(&row));
            writer.close()?;
            finish(scanned)
        }
        RowSink::Display(display) => {
            let scanned = scan(source, range, |row| display.show(&row.to_json()));
            finish(scanned)
        }
    }
}

/// Outcome of a scan: the summary so far plus the error that stopped it, if any.
type Scanned = (ReadSummary, Option<Error>);

fn scan<F>(source: &dyn RowSource, range: RowRange, mut deliver: F) -> Scanned
where
    F: FnMut(Row) -> Result<(), Error>,
{
    let mut summary = ReadSummary::default();
    let mut cursor = match source.cursor() {
        Ok(cursor) => cursor,
        Err(err) => return (summary, Some(err)),
    };

    let mut position: u64 = 0;
    loop {
        if range.is_past(position) {
            break;
        }
        let row = match cursor.next_row() {
            Ok(Some(row)) => row,
            Ok(None) => break,
            Err(err) => {
                debug!(row = position, error = %err, "row decode failed; stopping scan");
                return (summary, Some(err.with_row(position)));
            }
        };
        summary.scanned += 1;

        if range.contains(position) {
            let mut row = row;
            normalize_row(&mut row);
            if let Err(err) = deliver(row) {
                return (summary, Some(err.with_row(position)));
            }
            summary.emitted += 1;
        }
        position += 1;
    }
    (summary, None)
}

fn finish((summary, err): Scanned) -> Result<ReadSummary, Error> {
    debug!(
        scanned = summary.scanned,
        emitted = summary.emitted,
        "row scan complete"
    );
    match err {
        Some(err) => Err(err),
        None => Ok(summary),
    }
}

#[cfg(test)]
mod tests {
    use super::{ReadSummary, RowSink, read_rows};
    use crate::core::error::{Error, ErrorKind};
    use crate::core::memory::MemorySource;
    use crate::core::range::RowRange;
    use crate::core::row::{Row, RowValue};
    use crate::core::source::RowDisplay;
    use serde_json::{Value, json};

    fn rows(count: u64) -> Vec<Row> {
        (0..count)
            .map(|idx| {
                Row::new()
                    .with_column("id", RowValue::from(json!(idx)))
                    .with_column("tag", RowValue::Binary(format!("r{idx}").into_bytes()))
            })
            .collect()
    }

    fn export(source: &MemorySource, range: RowRange) -> (Result<ReadSummary, Error>, String) {
        let mut out = Vec::new();
        let result = read_rows(source, range, RowSink::Export(&mut out));
        (result, String::from_utf8(out).expect("utf8"))
    }

    fn ids(output: &str) -> Vec<u64> {
        let parsed: Value = serde_json::from_str(output).expect("valid json array");
        parsed
            .as_array()
            .expect("array")
            .iter()
            .map(|row| row["id"].as_u64().expect("id"))
            .collect()
    }

    #[derive(Default)]
    struct CollectDisplay {
        shown: Vec<Value>,
    }

    impl RowDisplay for CollectDisplay {
        fn show(&mut self, value: &Value) -> Result<(), Error> {
            self.shown.push(value.clone());
            Ok(())
        }
    }

    #[test]
    fn window_selects_inclusive_positions_in_order() {
        let source = MemorySource::new(json!({}), rows(5));
        let (result, out) = export(&source, RowRange::new(1, Some(3)).expect("range"));
        let summary = result.expect("read");
        assert_eq!(ids(&out), [1, 2, 3]);
        assert_eq!(summary.emitted, 3);
        assert_eq!(summary.scanned, 4);
    }

    #[test]
    fn emitted_rows_are_normalized() {
        let source = MemorySource::new(json!({}), rows(2));
        let (result, out) = export(&source, RowRange::all());
        result.expect("read");
        let parsed: Value = serde_json::from_str(&out).expect("json");
        assert_eq!(parsed[0]["tag"], "r0");
        assert_eq!(parsed[1]["tag"], "r1");
    }

    #[test]
    fn no_matching_rows_yields_empty_array() {
        let source = MemorySource::new(json!({}), rows(3));
        let (result, out) = export(&source, RowRange::new(10, Some(20)).expect("range"));
        assert_eq!(result.expect("read").emitted, 0);
        assert_eq!(out, "[]");

        let empty = MemorySource::new(json!({}), Vec::new());
        let (result, out) = export(&empty, RowRange::all());
        assert_eq!(result.expect("read"), ReadSummary::default());
        assert_eq!(out, "[]");
    }

    #[test]
    fn separators_count_is_rows_minus_one() {
        let source = MemorySource::new(json!({}), rows(6));
        let (result, out) = export(&source, RowRange::all());
        result.expect("read");
        assert_eq!(out.matches("}, {").count(), 5);
        assert!(out.ends_with("}]"));
    }

    #[test]
    fn decode_failure_keeps_array_closed() {
        let source = MemorySource::new(json!({}), rows(10)).with_failure_at(2);
        let (result, out) = export(&source, RowRange::all());
        let err = result.expect_err("decode failure");
        assert_eq!(err.kind(), ErrorKind::Corrupt);
        assert_eq!(err.row(), Some(2));
        assert_eq!(ids(&out), [0, 1]);
    }

    #[test]
    fn failure_before_window_emits_empty_array() {
        let source = MemorySource::new(json!({}), rows(10)).with_failure_at(1);
        let (result, out) = export(&source, RowRange::new(5, None).expect("range"));
        assert!(result.is_err());
        assert_eq!(out, "[]");
    }

    #[test]
    fn scan_stops_after_upper_bound() {
        let source = MemorySource::new(json!({}), rows(100));
        let (result, out) = export(&source, RowRange::new(0, Some(1)).expect("range"));
        result.expect("read");
        assert_eq!(ids(&out), [0, 1]);
        assert_eq!(source.rows_pulled(), 2);
    }

    #[test]
    fn display_sink_gets_unframed_rows() {
        let source = MemorySource::new(json!({}), rows(4));
        let mut display = CollectDisplay::default();
        let result = read_rows::<Vec<u8>>(
            &source,
            RowRange::new(2, None).expect("range"),
            RowSink::Display(&mut display),
        );
        assert_eq!(result.expect("read").emitted, 2);
        assert_eq!(display.shown.len(), 2);
        assert_eq!(display.shown[0], json!({"id": 2, "tag": "r2"}));
        assert_eq!(display.shown[1], json!({"id": 3, "tag": "r3"}));
    }
}
