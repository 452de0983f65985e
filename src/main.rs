//! Purpose: `parquetscraper` CLI entry point.
//! Role: Binary crate root; parses args, builds the run config, reports failures.
//! Invariants: Configuration is validated before any file is opened or created.
//! Invariants: Errors are emitted once on stderr (text on a terminal, JSON otherwise).
//! Invariants: Exit code is 0 on success and 1 on any failure.
//! Invariants: stdout carries only command output; logs go to stderr.
use std::error::Error as StdError;
use std::ffi::OsString;
use std::fmt;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind};
use parquetscraper::{Error, ErrorKind, RowRange};
use serde_json::{Map, Value, json};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod color_json;
mod command_dispatch;
mod export_paths;

use export_paths::export_file_name;

fn main() {
    let exit_code = match run(std::env::args_os()) {
        Ok(()) => 0,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            1
        }
    };
    std::process::exit(exit_code);
}

fn run<I>(args: I) -> Result<(), (Error, ColorMode)>
where
    I: IntoIterator<Item = OsString>,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                return Ok(());
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint("Try `parquetscraper --help`."),
                    ColorMode::Auto,
                ));
            }
        },
    };

    init_tracing();
    let color_mode = cli.color;
    let config = ScrapeConfig::from_cli(cli).map_err(|err| (err, color_mode))?;
    debug!(?config, "parsed configuration");

    command_dispatch::dispatch_command(&config)
        .map_err(add_not_found_hint)
        .map_err(add_corrupt_hint)
        .map_err(add_io_hint)
        .map_err(add_internal_hint)
        .map_err(|err| (err, color_mode))
}

#[derive(Parser, Debug)]
#[command(
    name = "parquetscraper",
    version,
    about = "Dump Parquet rows, schema, or row counts as JSON",
    long_about = None,
    after_help = r#"COMMANDS
  read     Print rows (optionally a --from/--to window) as JSON
  schema   Print the file's column layout as JSON
  rows     Print the total number of rows

EXAMPLES
  $ parquetscraper rows users.parquet
  $ parquetscraper read users.parquet --from 10 --to 19
  $ parquetscraper read users.parquet --export     # writes users.contents.json
  $ parquetscraper schema users.parquet --export   # writes users.schema.json

NOTES
  - --from and --to are 0-based and inclusive
  - Binary columns are shown as text, one character per byte
  - Set RUST_LOG=debug for diagnostics on stderr"#
)]
struct Cli {
    #[arg(help = "Command to run: read|schema|rows")]
    command: String,
    #[arg(help = "Parquet file to inspect", value_hint = ValueHint::FilePath)]
    file: PathBuf,
    #[arg(long, help = "Write output to <name>.<contents|schema>.json next to the input")]
    export: bool,
    #[arg(long, default_value_t = 0, help = "First row position to include (0-based)")]
    from: u64,
    #[arg(long, help = "Last row position to include (inclusive; default: end of file)")]
    to: Option<u64>,
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Colorize terminal JSON output: auto|always|never"
    )]
    color: ColorMode,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Command {
    Read,
    Schema,
    Rows,
}

impl Command {
    fn as_str(self) -> &'static str {
        match self {
            Command::Read => "read",
            Command::Schema => "schema",
            Command::Rows => "rows",
        }
    }

    fn export_label(self) -> &'static str {
        match self {
            Command::Read => "contents",
            other => other.as_str(),
        }
    }
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "read" => Ok(Command::Read),
            "schema" => Ok(Command::Schema),
            "rows" => Ok(Command::Rows),
            other => Err(Error::new(ErrorKind::Usage)
                .with_message(format!("unknown command `{other}`"))
                .with_hint("Use one of: read, schema, rows.")),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything one invocation needs, validated up front.
#[derive(Clone, Debug, Eq, PartialEq)]
struct ScrapeConfig {
    command: Command,
    file: PathBuf,
    export: Option<PathBuf>,
    range: RowRange,
    color: ColorMode,
}

impl ScrapeConfig {
    fn from_cli(cli: Cli) -> Result<Self, Error> {
        let command: Command = cli.command.parse()?;
        let range = RowRange::new(cli.from, cli.to)?;
        let export = match (cli.export, command) {
            (false, _) => None,
            (true, Command::Rows) => {
                debug!("--export has no effect for `rows`");
                None
            }
            (true, command) => Some(export_file_name(&cli.file, command)),
        };
        Ok(Self {
            command,
            file: cli.file,
            export,
            range,
            color: cli.color,
        })
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn add_not_found_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::NotFound || err.hint().is_some() {
        return err;
    }
    err.with_hint("Check the file path; it is resolved relative to the current directory.")
}

fn add_io_hint(err: Error) -> Error {
    if err.hint().is_some() {
        return err;
    }
    match err.kind() {
        ErrorKind::Permission => err.with_hint(
            "Permission denied. Check read access to the input and write access to its directory.",
        ),
        ErrorKind::Io => err.with_hint("I/O error. Check the path, filesystem, and disk space."),
        _ => err,
    }
}

fn add_corrupt_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Corrupt || err.hint().is_some() {
        return err;
    }
    if err.row().is_some() {
        return err.with_hint(
            "Rows before this position were emitted; use --to to stop before the damaged row.",
        );
    }
    err.with_hint("The file is not a valid Parquet file or is damaged.")
}

fn add_internal_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Internal || err.hint().is_some() {
        return err;
    }
    err.with_hint(
        "Unexpected internal failure. Retry with RUST_LOG=debug and share command/context if it persists.",
    )
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::NotFound => "not found".to_string(),
        ErrorKind::Permission => "permission denied".to_string(),
        ErrorKind::Corrupt => "corrupt data".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    if let Some(row) = err.row() {
        inner.insert("row".to_string(), json!(row));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));

    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(path) = err.path() {
        lines.push(format!(
            "{} {}",
            colorize_label("path:", use_color, AnsiColor::Yellow),
            path.display()
        ));
    }
    if let Some(row) = err.row() {
        lines.push(format!(
            "{} {row}",
            colorize_label("row:", use_color, AnsiColor::Yellow)
        ));
    }

    let causes = error_causes(err);
    if let Some(cause) = causes.first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }

    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

#[cfg(test)]
mod tests {
    use super::{Cli, ColorMode, Command, ScrapeConfig, error_json, error_text};
    use clap::Parser;
    use parquetscraper::{Error, ErrorKind, RowRange};
    use std::path::PathBuf;

    fn config(args: &[&str]) -> Result<ScrapeConfig, Error> {
        let mut argv = vec!["parquetscraper"];
        argv.extend_from_slice(args);
        ScrapeConfig::from_cli(Cli::try_parse_from(argv).expect("clap parse"))
    }

    #[test]
    fn defaults_read_everything_to_display() {
        let config = config(&["read", "data/users.parquet"]).expect("config");
        assert_eq!(config.command, Command::Read);
        assert_eq!(config.file, PathBuf::from("data/users.parquet"));
        assert_eq!(config.export, None);
        assert_eq!(config.range, RowRange::all());
        assert_eq!(config.color, ColorMode::Auto);
    }

    #[test]
    fn export_paths_follow_command() {
        let read = config(&["read", "data/users.parquet", "--export"]).expect("read");
        assert_eq!(read.export, Some(PathBuf::from("data/users.contents.json")));

        let schema = config(&["schema", "users.parquet", "--export"]).expect("schema");
        assert_eq!(schema.export, Some(PathBuf::from("users.schema.json")));

        let rows = config(&["rows", "users.parquet", "--export"]).expect("rows");
        assert_eq!(rows.export, None);
    }

    #[test]
    fn window_flags_are_parsed() {
        let config = config(&["read", "a.parquet", "--from", "2", "--to", "9"]).expect("config");
        assert_eq!(config.range, RowRange::new(2, Some(9)).expect("range"));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let err = config(&["read", "a.parquet", "--from", "9", "--to", "2"]).expect_err("inverted");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn unknown_command_is_rejected() {
        let err = config(&["dump", "a.parquet"]).expect_err("unknown");
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert!(err.message().unwrap_or_default().contains("dump"));
        assert!(err.hint().is_some());
    }

    #[test]
    fn command_labels() {
        for (name, command, label) in [
            ("read", Command::Read, "contents"),
            ("schema", Command::Schema, "schema"),
            ("rows", Command::Rows, "rows"),
        ] {
            assert_eq!(name.parse::<Command>().expect("parse"), command);
            assert_eq!(command.to_string(), name);
            assert_eq!(command.export_label(), label);
        }
    }

    #[test]
    fn error_envelope_carries_row_and_path() {
        let err = Error::new(ErrorKind::Corrupt)
            .with_message("cannot read row")
            .with_path("a.parquet")
            .with_row(2)
            .with_hint("look closer");
        let value = error_json(&err);
        assert_eq!(value["error"]["kind"], "Corrupt");
        assert_eq!(value["error"]["message"], "cannot read row");
        assert_eq!(value["error"]["path"], "a.parquet");
        assert_eq!(value["error"]["row"], 2);
        assert_eq!(value["error"]["hint"], "look closer");

        let text = error_text(&err, false);
        assert!(text.starts_with("error: cannot read row"));
        assert!(text.contains("row: 2"));
    }
}
