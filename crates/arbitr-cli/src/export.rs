//! CSV and JSON encoders for exporting the registry.

use std::{io::Write, path::Path};

use arbitr_core::ArbitrationCase;
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
  Csv,
  Json,
}

impl ExportFormat {
  /// Pick a format from the file extension; anything but `.json` is CSV.
  pub fn from_path(path: &Path) -> Self {
    match path.extension().and_then(|e| e.to_str()) {
      Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
      _ => Self::Csv,
    }
  }
}

// ─── CSV ─────────────────────────────────────────────────────────────────────

const CSV_HEADER: [&str; 3] = ["case_number", "case_date", "inn"];

/// Quote a field when it contains a delimiter, quote, or line break
/// (RFC 4180); embedded quotes are doubled.
fn csv_field(s: &str) -> String {
  if s.contains([',', '"', '\r', '\n']) {
    format!("\"{}\"", s.replace('"', "\"\""))
  } else {
    s.to_owned()
  }
}

/// Rows end in CRLF (RFC 4180).
fn write_csv_row<W: Write>(out: &mut W, fields: [&str; 3]) -> std::io::Result<()> {
  let row: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
  write!(out, "{}\r\n", row.join(","))
}

/// Write `cases` as CSV with a header row. A missing date is an empty field.
pub fn write_csv<W: Write>(out: &mut W, cases: &[ArbitrationCase]) -> std::io::Result<()> {
  write_csv_row(out, CSV_HEADER)?;
  for case in cases {
    let date = case.case_date.map(|d| d.to_string()).unwrap_or_default();
    write_csv_row(out, [case.case_number.as_str(), &date, case.inn.as_str()])?;
  }
  Ok(())
}

// ─── JSON ────────────────────────────────────────────────────────────────────

/// Write `cases` as a pretty-printed JSON array.
pub fn write_json<W: Write>(out: &mut W, cases: &[ArbitrationCase]) -> serde_json::Result<()> {
  serde_json::to_writer_pretty(&mut *out, cases)?;
  writeln!(out).map_err(serde_json::Error::io)
}
