//! Purpose: Render pretty JSON with optional ANSI colorization for terminal display.
//! Exports: `colorize_json`, `TerminalDisplay`.
//! Role: The display sink for rows and schemas when nothing is exported.
//! Invariants: When color is disabled, output equals serde_json::to_string_pretty.
//! Invariants: ANSI escapes appear only when explicitly enabled.
//! Invariants: Each shown value ends with a newline; no framing between values.
use std::io::{self, IsTerminal, Write};

use parquetscraper::{Error, RowDisplay};
use serde_json::{Map, Value};

use crate::ColorMode;

const INDENT: &str = "  ";

// 8/16-color palette; bright variants lose contrast on some themes.
const COLOR_KEY: &str = "36";
const COLOR_STRING: &str = "32";
const COLOR_NUMBER: &str = "33";
const COLOR_BOOL: &str = "35";
const COLOR_NULL: &str = "90";
const COLOR_PUNCT: &str = "39";

pub(crate) struct TerminalDisplay<W: Write> {
    out: W,
    use_color: bool,
}

impl TerminalDisplay<io::Stdout> {
    pub(crate) fn stdout(color_mode: ColorMode) -> Self {
        let out = io::stdout();
        let use_color = color_mode.use_color(out.is_terminal());
        Self::new(out, use_color)
    }
}

impl<W: Write> TerminalDisplay<W> {
    pub(crate) fn new(out: W, use_color: bool) -> Self {
        Self { out, use_color }
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RowDisplay for TerminalDisplay<W> {
    fn show(&mut self, value: &Value) -> Result<(), Error> {
        let rendered = colorize_json(value, self.use_color);
        writeln!(self.out, "{rendered}").map_err(Error::from_io)
    }
}

pub(crate) fn colorize_json(value: &Value, use_color: bool) -> String {
    let mut painter = Painter {
        use_color,
        out: String::new(),
    };
    painter.value(value, 0);
    painter.out
}

struct Painter {
    use_color: bool,
    out: String,
}

impl Painter {
    fn value(&mut self, value: &Value, depth: usize) {
        match value {
            Value::Null => self.paint("null", COLOR_NULL),
            Value::Bool(flag) => self.paint(if *flag { "true" } else { "false" }, COLOR_BOOL),
            Value::Number(num) => self.paint(&num.to_string(), COLOR_NUMBER),
            Value::String(text) => self.paint(&quote(text), COLOR_STRING),
            Value::Array(items) => self.array(items, depth),
            Value::Object(map) => self.object(map, depth),
        }
    }

    fn array(&mut self, items: &[Value], depth: usize) {
        if items.is_empty() {
            self.paint("[]", COLOR_PUNCT);
            return;
        }
        self.paint("[", COLOR_PUNCT);
        for (idx, item) in items.iter().enumerate() {
            self.entry_start(idx, depth + 1);
            self.value(item, depth + 1);
        }
        self.close("]", depth);
    }

    fn object(&mut self, map: &Map<String, Value>, depth: usize) {
        if map.is_empty() {
            self.paint("{}", COLOR_PUNCT);
            return;
        }
        self.paint("{", COLOR_PUNCT);
        for (idx, (key, value)) in map.iter().enumerate() {
            self.entry_start(idx, depth + 1);
            self.paint(&quote(key), COLOR_KEY);
            self.paint(":", COLOR_PUNCT);
            self.out.push(' ');
            self.value(value, depth + 1);
        }
        self.close("}", depth);
    }

    fn entry_start(&mut self, idx: usize, depth: usize) {
        if idx > 0 {
            self.paint(",", COLOR_PUNCT);
        }
        self.out.push('\n');
        self.indent(depth);
    }

    fn close(&mut self, bracket: &str, depth: usize) {
        self.out.push('\n');
        self.indent(depth);
        self.paint(bracket, COLOR_PUNCT);
    }

    fn indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.out.push_str(INDENT);
        }
    }

    fn paint(&mut self, text: &str, color: &str) {
        if self.use_color {
            self.out.push_str("\u{1b}[");
            self.out.push_str(color);
            self.out.push('m');
            self.out.push_str(text);
            self.out.push_str("\u{1b}[0m");
        } else {
            self.out.push_str(text);
        }
    }
}

fn quote(text: &str) -> String {
    Value::String(text.to_owned()).to_string()
}
