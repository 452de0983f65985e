//! Purpose: Run the single command of an invocation against an opened source.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap; owns sinks and source lifetime.
//! Invariants: Exactly one operation runs, then the source is closed, whatever the outcome.
//! Invariants: Export files are flushed before returning, even after a mid-stream read error.
//! Invariants: `rows` prints a bare integer and never writes a file.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use parquetscraper::core::json_array::to_pretty_json;
use parquetscraper::{
    Error, ParquetSource, RowDisplay, RowRange, RowSink, RowSource, read_rows,
};
use tracing::debug;

use super::{Command, ScrapeConfig};
use crate::color_json::TerminalDisplay;

pub(super) fn dispatch_command(config: &ScrapeConfig) -> Result<(), Error> {
    let mut source = ParquetSource::open(&config.file)?;
    let mut display = TerminalDisplay::stdout(config.color);
    let mut stdout = io::stdout().lock();
    run_with_source(config, &mut source, &mut display, &mut stdout)
}

fn run_with_source(
    config: &ScrapeConfig,
    source: &mut dyn RowSource,
    display: &mut dyn RowDisplay,
    out: &mut dyn Write,
) -> Result<(), Error> {
    let result = execute(config, source, display, out);
    source.close();
    result
}

fn execute(
    config: &ScrapeConfig,
    source: &dyn RowSource,
    display: &mut dyn RowDisplay,
    out: &mut dyn Write,
) -> Result<(), Error> {
    match config.command {
        Command::Read => match &config.export {
            Some(path) => export_rows(source, config.range, path),
            None => {
                read_rows::<io::Sink>(source, config.range, RowSink::Display(display))?;
                Ok(())
            }
        },
        Command::Schema => {
            let schema = source.schema()?;
            match &config.export {
                Some(path) => export_schema(&schema, path),
                None => display.show(&schema),
            }
        }
        Command::Rows => {
            let count = source.row_count()?;
            writeln!(out, "{count}").map_err(Error::from_io)
        }
    }
}

fn export_rows(source: &dyn RowSource, range: RowRange, path: &Path) -> Result<(), Error> {
    let file = File::create(path).map_err(|err| {
        Error::from_io(err)
            .with_message("cannot create export file")
            .with_path(path)
    })?;
    let mut out = BufWriter::new(file);
    let result = read_rows(source, range, RowSink::Export(&mut out));
    let flushed = out.flush().map_err(|err| {
        Error::from_io(err)
            .with_message("cannot write export file")
            .with_path(path)
    });
    let summary = result?;
    flushed?;
    debug!(path = %path.display(), rows = summary.emitted, "wrote row export");
    Ok(())
}

fn export_schema(schema: &serde_json::Value, path: &Path) -> Result<(), Error> {
    let bytes = to_pretty_json(schema)?;
    fs::write(path, bytes).map_err(|err| {
        Error::from_io(err)
            .with_message("cannot write export file")
            .with_path(path)
    })?;
    debug!(path = %path.display(), "wrote schema export");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::run_with_source;
    use crate::color_json::TerminalDisplay;
    use crate::{ColorMode, Command, ScrapeConfig};
    use parquetscraper::{ErrorKind, MemorySource, Row, RowRange, RowValue};
    use serde_json::{Value, json};
    use std::path::PathBuf;

    fn source(count: u64) -> MemorySource {
        let rows = (0..count)
            .map(|idx| {
                Row::new()
                    .with_column("id", RowValue::from(json!(idx)))
                    .with_column("name", RowValue::Binary(format!("n{idx}").into_bytes()))
            })
            .collect();
        MemorySource::new(json!({"name": "schema", "fields": {"id": {"type": "INT64"}}}), rows)
    }

    fn config(command: Command, export: Option<PathBuf>, range: RowRange) -> ScrapeConfig {
        ScrapeConfig {
            command,
            file: PathBuf::from("input.parquet"),
            export,
            range,
            color: ColorMode::Never,
        }
    }

    struct Outputs {
        display: String,
        stdout: String,
    }

    fn run(config: &ScrapeConfig, source: &mut MemorySource) -> (Result<(), parquetscraper::Error>, Outputs) {
        let mut display = TerminalDisplay::new(Vec::new(), false);
        let mut stdout = Vec::new();
        let result = run_with_source(config, source, &mut display, &mut stdout);
        let outputs = Outputs {
            display: String::from_utf8(display.into_inner()).expect("utf8"),
            stdout: String::from_utf8(stdout).expect("utf8"),
        };
        (result, outputs)
    }

    #[test]
    fn read_export_writes_windowed_array() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("input.contents.json");
        let mut source = source(5);
        let config = config(
            Command::Read,
            Some(path.clone()),
            RowRange::new(1, Some(3)).expect("range"),
        );

        let (result, outputs) = run(&config, &mut source);
        result.expect("read");
        assert!(outputs.display.is_empty());
        assert_eq!(source.close_count(), 1);

        let text = std::fs::read_to_string(&path).expect("export file");
        let parsed: Value = serde_json::from_str(&text).expect("valid json");
        assert_eq!(
            parsed,
            json!([
                {"id": 1, "name": "n1"},
                {"id": 2, "name": "n2"},
                {"id": 3, "name": "n3"}
            ])
        );
        assert_eq!(text.matches("}, {").count(), 2);
    }

    #[test]
    fn read_without_export_shows_each_row() {
        let mut source = source(3);
        let config = config(Command::Read, None, RowRange::all());

        let (result, outputs) = run(&config, &mut source);
        result.expect("read");
        assert!(!outputs.display.starts_with('['));
        assert_eq!(outputs.display.matches("\"id\"").count(), 3);
        assert!(outputs.display.contains("\"name\": \"n2\""));
        assert!(outputs.stdout.is_empty());
    }

    #[test]
    fn read_export_survives_decode_failure() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("input.contents.json");
        let mut source = source(10).with_failure_at(2);
        let config = config(Command::Read, Some(path.clone()), RowRange::all());

        let (result, _) = run(&config, &mut source);
        let err = result.expect_err("decode failure");
        assert_eq!(err.kind(), ErrorKind::Corrupt);
        assert_eq!(err.row(), Some(2));
        assert_eq!(source.close_count(), 1);

        let text = std::fs::read_to_string(&path).expect("export file");
        let parsed: Value = serde_json::from_str(&text).expect("closed json array");
        assert_eq!(parsed.as_array().expect("array").len(), 2);
    }

    #[test]
    fn schema_export_is_reproducible() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("input.schema.json");
        let config = config(Command::Schema, Some(path.clone()), RowRange::all());

        let (result, _) = run(&config, &mut source(1));
        result.expect("schema");
        let first = std::fs::read(&path).expect("first export");
        let (result, _) = run(&config, &mut source(1));
        result.expect("schema again");
        let second = std::fs::read(&path).expect("second export");

        assert_eq!(first, second);
        let text = String::from_utf8(first).expect("utf8");
        assert!(text.starts_with("{\n    \"name\": \"schema\""));
        let parsed: Value = serde_json::from_str(&text).expect("json");
        assert_eq!(parsed["fields"]["id"]["type"], "INT64");
    }

    #[test]
    fn schema_without_export_goes_to_display() {
        let config = config(Command::Schema, None, RowRange::all());
        let (result, outputs) = run(&config, &mut source(0));
        result.expect("schema");
        let parsed: Value = serde_json::from_str(&outputs.display).expect("json");
        assert_eq!(parsed["name"], "schema");
    }

    #[test]
    fn rows_prints_count_and_never_reads() {
        let mut source = source(7);
        let config = config(Command::Rows, None, RowRange::all());
        let (result, outputs) = run(&config, &mut source);
        result.expect("rows");
        assert_eq!(outputs.stdout, "7\n");
        assert_eq!(source.cursors_opened(), 0);
        assert_eq!(source.close_count(), 1);
    }

    #[test]
    fn export_failure_still_closes_source() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("missing-dir").join("out.json");
        let mut source = source(3);
        let config = config(Command::Read, Some(path), RowRange::all());

        let (result, _) = run(&config, &mut source);
        assert_eq!(result.expect_err("create fails").kind(), ErrorKind::NotFound);
        assert_eq!(source.cursors_opened(), 0);
        assert_eq!(source.close_count(), 1);
    }
}
