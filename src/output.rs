//! Result formatting
//!
//! Three layouts: aligned name/branch columns, bare absolute paths, or JSON.

use crate::config::OutputMode;
use crate::walker::{RepoRecord, ScanResult};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

/// Marker appended to names cut to fit the column
const ELLIPSIS: &str = "..";

#[derive(Serialize)]
struct JsonReport<'a> {
    root: &'a Path,
    repositories: Vec<JsonRepo<'a>>,
}

#[derive(Serialize)]
struct JsonRepo<'a> {
    path: &'a Path,
    branch: Option<&'a str>,
}

/// Display name of a record: its last path component
fn display_name(record: &RepoRecord) -> String {
    record
        .relative_path
        .file_name()
        .unwrap_or(record.relative_path.as_os_str())
        .to_string_lossy()
        .into_owned()
}

/// Format one record as `name  branch`, with the name fitted to `width`
pub fn format_columns(record: &RepoRecord, width: usize) -> String {
    let name = display_name(record);
    let branch = record.branch().unwrap_or("");

    let line = if name.chars().count() > width {
        let cut: String = name.chars().take(width.saturating_sub(ELLIPSIS.len())).collect();
        format!("{}{}  {}", cut, ELLIPSIS, branch)
    } else {
        format!("{:<width$}  {}", name, branch, width = width)
    };

    line.trim_end().to_string()
}

/// Format one record as an absolute path
pub fn format_clean(root: &Path, record: &RepoRecord) -> String {
    root.join(&record.relative_path).display().to_string()
}

/// Render the whole result as a JSON document
pub fn to_json(result: &ScanResult) -> serde_json::Result<String> {
    let report = JsonReport {
        root: &result.root,
        repositories: result
            .repos
            .iter()
            .map(|r| JsonRepo {
                path: &r.relative_path,
                branch: r.branch(),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&report)
}

/// Write the scan result in the requested layout
pub fn write_results<W: Write>(
    out: &mut W,
    result: &ScanResult,
    mode: OutputMode,
    width: usize,
) -> io::Result<()> {
    match mode {
        OutputMode::Columns => {
            for record in &result.repos {
                writeln!(out, "{}", format_columns(record, width))?;
            }
        }
        OutputMode::Clean => {
            for record in &result.repos {
                writeln!(out, "{}", format_clean(&result.root, record))?;
            }
        }
        OutputMode::Json => {
            let json = to_json(result).map_err(io::Error::from)?;
            writeln!(out, "{}", json)?;
        }
    }
    out.flush()
}
