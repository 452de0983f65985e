//! Purpose: Derive export file paths from the input path and command.
//! Exports: `export_file_name`.
//! Role: Keeps export naming in one place for `read` and `schema`.
//! Invariants: `dir/name.ext` + command maps to `dir/name.<label>.json`.
//! Invariants: Only the last extension segment is stripped; dotless names keep the whole name.

use std::path::{Path, PathBuf};

use crate::Command;

pub(crate) fn export_file_name(file: &Path, command: Command) -> PathBuf {
    let name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = match name.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem,
        _ => name.as_str(),
    };
    file.with_file_name(format!("{stem}.{}.json", command.export_label()))
}
