//! Purpose: `RowSource` backed by a Parquet file via the `parquet` record API.
//! Exports: `ParquetSource`.
//! Role: The only place that knows the decoder's concrete types.
//! Invariants: Byte-array fields become `RowValue::Binary`; groups become nested rows.
//! Invariants: Schema JSON lists fields in declaration order and is deterministic.
//! Invariants: After `close`, every operation fails with a Usage error.

use std::fs::File;
use std::path::{Path, PathBuf};

use parquet::basic::ConvertedType;
use parquet::errors::ParquetError;
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::Field;
use parquet::record::reader::RowIter;
use parquet::schema::types::Type;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::core::error::{Error, ErrorKind};
use crate::core::row::{Row, RowValue};
use crate::core::source::{RowCursor, RowSource};

pub struct ParquetSource {
    path: PathBuf,
    reader: Option<SerializedFileReader<File>>,
}

impl ParquetSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| {
            Error::from_io(err)
                .with_message("cannot open file")
                .with_path(path)
        })?;
        let reader = SerializedFileReader::new(file).map_err(|err| {
            parquet_error(err)
                .with_message("not a readable parquet file")
                .with_path(path)
        })?;
        debug!(
            path = %path.display(),
            rows = reader.metadata().file_metadata().num_rows(),
            row_groups = reader.num_row_groups(),
            "opened parquet source"
        );
        Ok(Self {
            path: path.to_path_buf(),
            reader: Some(reader),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn reader(&self) -> Result<&SerializedFileReader<File>, Error> {
        self.reader.as_ref().ok_or_else(|| {
            Error::new(ErrorKind::Usage)
                .with_message("parquet source is closed")
                .with_path(&self.path)
        })
    }
}

impl RowSource for ParquetSource {
    fn schema(&self) -> Result<Value, Error> {
        let metadata = self.reader()?.metadata().file_metadata();
        let root = metadata.schema();
        let mut map = Map::new();
        map.insert("name".to_string(), json!(root.name()));
        map.insert(
            "num_columns".to_string(),
            json!(metadata.schema_descr().num_columns()),
        );
        map.insert("fields".to_string(), fields_json(root.get_fields()));
        Ok(Value::Object(map))
    }

    fn row_count(&self) -> Result<u64, Error> {
        let rows = self.reader()?.metadata().file_metadata().num_rows();
        Ok(u64::try_from(rows).unwrap_or(0))
    }

    fn cursor(&self) -> Result<Box<dyn RowCursor + '_>, Error> {
        let rows = self.reader()?.get_row_iter(None).map_err(|err| {
            parquet_error(err)
                .with_message("cannot start row iteration")
                .with_path(&self.path)
        })?;
        Ok(Box::new(ParquetCursor {
            rows,
            path: &self.path,
        }))
    }

    fn close(&mut self) {
        if self.reader.take().is_some() {
            debug!(path = %self.path.display(), "closed parquet source");
        }
    }
}

struct ParquetCursor<'a> {
    rows: RowIter<'a>,
    path: &'a Path,
}

impl RowCursor for ParquetCursor<'_> {
    fn next_row(&mut self) -> Result<Option<Row>, Error> {
        match self.rows.next() {
            None => Ok(None),
            Some(Ok(row)) => Ok(Some(convert_row(&row))),
            Some(Err(err)) => Err(parquet_error(err)
                .with_message("cannot read row")
                .with_path(self.path)),
        }
    }
}

fn parquet_error(err: ParquetError) -> Error {
    let kind = if matches!(err, ParquetError::NYI(_)) {
        ErrorKind::Usage
    } else {
        ErrorKind::Corrupt
    };
    Error::new(kind).with_source(err)
}

fn convert_row(row: &parquet::record::Row) -> Row {
    let mut out = Row::new();
    for (name, field) in row.get_column_iter() {
        out.push(name.clone(), convert_field(field));
    }
    out
}

fn convert_field(field: &Field) -> RowValue {
    match field {
        Field::Bytes(bytes) => RowValue::Binary(bytes.data().to_vec()),
        Field::Group(row) => RowValue::Nested(convert_row(row)),
        Field::ListInternal(list) => {
            RowValue::List(list.elements().iter().map(convert_field).collect())
        }
        Field::MapInternal(map) => {
            let mut out = Row::new();
            for (key, value) in map.entries() {
                out.push(map_key(key), convert_field(value));
            }
            RowValue::Nested(out)
        }
        other => RowValue::Primitive(other.to_json_value()),
    }
}

fn map_key(key: &Field) -> String {
    match key {
        Field::Str(text) => text.clone(),
        other => other.to_string(),
    }
}

fn fields_json(fields: &[parquet::schema::types::TypePtr]) -> Value {
    let mut map = Map::new();
    for field in fields {
        map.insert(field.name().to_string(), field_json(field));
    }
    Value::Object(map)
}

fn field_json(field: &Type) -> Value {
    let info = field.get_basic_info();
    let mut map = Map::new();
    if let Type::PrimitiveType {
        physical_type,
        type_length,
        scale,
        precision,
        ..
    } = field
    {
        map.insert("type".to_string(), json!(physical_type.to_string()));
        if *type_length > 0 {
            map.insert("type_length".to_string(), json!(type_length));
        }
        if *precision > 0 {
            map.insert("precision".to_string(), json!(precision));
            map.insert("scale".to_string(), json!(scale));
        }
    }
    if info.has_repetition() {
        map.insert(
            "repetition".to_string(),
            json!(info.repetition().to_string()),
        );
    }
    if info.converted_type() != ConvertedType::NONE {
        map.insert(
            "converted_type".to_string(),
            json!(info.converted_type().to_string()),
        );
    }
    if field.is_group() {
        map.insert("fields".to_string(), fields_json(field.get_fields()));
    }
    Value::Object(map)
}
