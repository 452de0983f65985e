//! Purpose: Emit one JSON array across many writes without holding it in memory.
//! Exports: `JsonArrayWriter`, `to_pretty_json`, `write_pretty_json`.
//! Role: Framing for row exports; also the shared 4-space pretty printer.
//! Invariants: Output is `[` + elements joined by `", "` + `]`; zero elements gives `[]`.
//! Invariants: Elements are pretty-printed with a 4-space indent.
//! Invariants: `close` consumes the writer, so framing cannot be closed twice.

use std::io::Write;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::core::error::{Error, ErrorKind};

const INDENT: &[u8] = b"    ";
const SEPARATOR: &[u8] = b", ";

#[derive(Debug)]
pub struct JsonArrayWriter<W: Write> {
    out: W,
    wrote_element: bool,
}

impl<W: Write> JsonArrayWriter<W> {
    /// Emits the opening bracket.
    pub fn open(mut out: W) -> Result<Self, Error> {
        out.write_all(b"[").map_err(Error::from_io)?;
        Ok(Self {
            out,
            wrote_element: false,
        })
    }

    pub fn write_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        if self.wrote_element {
            self.out.write_all(SEPARATOR).map_err(Error::from_io)?;
        }
        write_pretty_json(&mut self.out, value)?;
        self.wrote_element = true;
        Ok(())
    }

    /// Emits the closing bracket and hands back the sink.
    pub fn close(mut self) -> Result<W, Error> {
        self.out.write_all(b"]").map_err(Error::from_io)?;
        Ok(self.out)
    }
}

pub fn write_pretty_json<W: Write, T: Serialize + ?Sized>(
    out: W,
    value: &T,
) -> Result<(), Error> {
    let formatter = PrettyFormatter::with_indent(INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(out, formatter);
    value.serialize(&mut serializer).map_err(|err| {
        if err.is_io() {
            Error::new(ErrorKind::Io)
                .with_message("failed to write json")
                .with_source(err)
        } else {
            Error::new(ErrorKind::Internal)
                .with_message("json encode failed")
                .with_source(err)
        }
    })
}

pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, Error> {
    let mut buf = Vec::new();
    write_pretty_json(&mut buf, value)?;
    Ok(buf)
}
