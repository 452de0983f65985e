//! Purpose: Turn binary payloads inside a decoded row into text before output.
//! Exports: `normalize_row`, `bytes_to_text`.
//! Role: Applied to every in-range row between the cursor and the sink.
//! Invariants: Each byte maps to the char with the same code point (Latin-1 style, not UTF-8).
//! Invariants: Descends into nested rows only; lists and their contents are left as-is.
//! Invariants: Uses an explicit worklist so nesting depth never grows the call stack.

use serde_json::Value;

use crate::core::row::{Row, RowValue};

pub fn normalize_row(row: &mut Row) {
    let mut pending: Vec<&mut Row> = vec![row];
    while let Some(current) = pending.pop() {
        for value in current.values_mut() {
            match value {
                RowValue::Binary(bytes) => {
                    let text = bytes_to_text(bytes);
                    *value = RowValue::Primitive(Value::String(text));
                }
                RowValue::Nested(nested) => pending.push(nested),
                RowValue::Primitive(_) | RowValue::List(_) => {}
            }
        }
    }
}

pub fn bytes_to_text(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}
