//! Purpose: Decoder-independent model of one decoded record.
//! Exports: `Row`, `RowValue`.
//! Role: The value type flowing from cursors through normalization into sinks.
//! Invariants: Column order is the decoder's order and survives serialization.
//! Invariants: Rows are owned values; nothing aliases a row while it is normalized.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::Value;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, RowValue)>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RowValue {
    /// Any scalar the decoder already renders as JSON (numbers, strings, null).
    Primitive(Value),
    /// Raw byte payload, not yet turned into text.
    Binary(Vec<u8>),
    /// Structured sub-record.
    Nested(Row),
    /// Repeated values. Normalization does not descend into lists.
    List(Vec<RowValue>),
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(mut self, name: impl Into<String>, value: RowValue) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: RowValue) {
        self.columns.push((name.into(), value));
    }

    pub fn get(&self, name: &str) -> Option<&RowValue> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &RowValue)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut RowValue> {
        self.columns.iter_mut().map(|(_, value)| value)
    }

    /// Converts to a `serde_json::Value`, keeping column order.
    pub fn to_json(&self) -> Value {
        let mut map = serde_json::Map::with_capacity(self.columns.len());
        for (name, value) in &self.columns {
            map.insert(name.clone(), value.to_json());
        }
        Value::Object(map)
    }
}

impl RowValue {
    pub fn to_json(&self) -> Value {
        match self {
            RowValue::Primitive(value) => value.clone(),
            RowValue::Binary(bytes) => {
                Value::Array(bytes.iter().map(|byte| Value::from(*byte)).collect())
            }
            RowValue::Nested(row) => row.to_json(),
            RowValue::List(items) => Value::Array(items.iter().map(RowValue::to_json).collect()),
        }
    }
}

impl From<Value> for RowValue {
    fn from(value: Value) -> Self {
        RowValue::Primitive(value)
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl Serialize for RowValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RowValue::Primitive(value) => value.serialize(serializer),
            RowValue::Binary(bytes) => {
                let mut seq = serializer.serialize_seq(Some(bytes.len()))?;
                for byte in bytes {
                    seq.serialize_element(byte)?;
                }
                seq.end()
            }
            RowValue::Nested(row) => row.serialize(serializer),
            RowValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}
