//! Fixed-column CSV export of flat JSON records.
//!
//! Output mirrors a minimal-quoting CSV writer: comma delimited, `\r\n` row
//! terminator, fields quoted only when they contain `,`, `"`, `\r` or `\n`.

use crate::exchange::Record;
use anyhow::{Context, Result};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

const ROW_TERMINATOR: &str = "\r\n";

/// Where exported rows go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    /// Overwrite the file at this path.
    File(PathBuf),
    Stdout,
}

impl fmt::Display for ExportTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportTarget::File(path) => write!(f, "{}", path.display()),
            ExportTarget::Stdout => write!(f, "<stdout>"),
        }
    }
}

/// Result of an export call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Written { rows: usize, target: ExportTarget },
    /// Nothing to export; no output was produced.
    Skipped,
}

/// Export `records` under `columns` to `target`.
///
/// An empty record list writes nothing at all, not even a header.
pub fn export_records(
    records: &[Record],
    columns: &[&str],
    target: &ExportTarget,
) -> Result<ExportOutcome> {
    if records.is_empty() {
        info!("No records to export, skipping {}", target);
        return Ok(ExportOutcome::Skipped);
    }

    info!("Writing {} rows to {}", records.len(), target);

    let rows = match target {
        ExportTarget::File(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            let rows = write_csv(&mut writer, records, columns)
                .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
            writer
                .flush()
                .with_context(|| format!("Failed to flush CSV file: {}", path.display()))?;
            rows
        }
        ExportTarget::Stdout => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            let rows = write_csv(&mut lock, records, columns).context("Failed to write CSV to stdout")?;
            lock.flush().context("Failed to flush stdout")?;
            rows
        }
    };

    Ok(ExportOutcome::Written {
        rows,
        target: target.clone(),
    })
}

/// Write a header row and one row per record. Returns the number of data rows.
pub fn write_csv<W: Write>(writer: &mut W, records: &[Record], columns: &[&str]) -> io::Result<usize> {
    write_row(writer, columns.iter().map(|c| Cow::Borrowed(*c)))?;

    for record in records {
        write_row(writer, columns.iter().map(|c| render_cell(record.get(*c))))?;
    }

    Ok(records.len())
}

fn write_row<'a, W: Write>(
    writer: &mut W,
    fields: impl Iterator<Item = Cow<'a, str>>,
) -> io::Result<()> {
    let line = fields
        .map(|field| escape_field(&field).into_owned())
        .collect::<Vec<_>>()
        .join(",");
    writer.write_all(line.as_bytes())?;
    writer.write_all(ROW_TERMINATOR.as_bytes())
}

/// Text for one cell. Missing and null render empty; strings verbatim.
/// Booleans and nested values render as JSON text (`true`, `{"a":1}`).
fn render_cell(value: Option<&Value>) -> Cow<'_, str> {
    match value {
        None | Some(Value::Null) => Cow::Borrowed(""),
        Some(Value::String(s)) => Cow::Borrowed(s.as_str()),
        Some(other) => Cow::Owned(other.to_string()),
    }
}

fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
