//! Case types — the single record kind held by the registry.
//!
//! A case is identified by its case number and carries an optional date and
//! the taxpayer identifier (INN) of the party it was found for. Records are
//! write-once: nothing in the registry updates or deletes them.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Storage capacity of the `inn` column, in characters.
pub const INN_MAX_LEN: usize = 12;

// ─── CaseNumber ──────────────────────────────────────────────────────────────

/// The primary key of a case, e.g. `А40-123456/2023`.
///
/// Never empty; surrounding whitespace is trimmed on construction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CaseNumber(String);

impl CaseNumber {
  pub fn new(value: impl Into<String>) -> Result<Self> {
    let value = value.into();
    let trimmed = value.trim();
    if trimmed.is_empty() {
      return Err(Error::EmptyCaseNumber);
    }
    if trimmed.len() == value.len() {
      Ok(Self(value))
    } else {
      Ok(Self(trimmed.to_owned()))
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl TryFrom<String> for CaseNumber {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> { Self::new(value) }
}

impl From<CaseNumber> for String {
  fn from(value: CaseNumber) -> Self { value.0 }
}

impl AsRef<str> for CaseNumber {
  fn as_ref(&self) -> &str { &self.0 }
}

impl fmt::Display for CaseNumber {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

// ─── Inn ─────────────────────────────────────────────────────────────────────

/// A taxpayer identification number.
///
/// Only presence and storage capacity are checked: the value must be
/// non-empty and at most [`INN_MAX_LEN`] characters. Digit and checksum rules
/// belong to whoever produces the records.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Inn(String);

impl Inn {
  pub fn new(value: impl Into<String>) -> Result<Self> {
    let value = value.into();
    let trimmed = value.trim();
    if trimmed.is_empty() {
      return Err(Error::MissingField("inn"));
    }
    let len = trimmed.chars().count();
    if len > INN_MAX_LEN {
      return Err(Error::InnTooLong { len });
    }
    Ok(Self(trimmed.to_owned()))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl TryFrom<String> for Inn {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> { Self::new(value) }
}

impl From<Inn> for String {
  fn from(value: Inn) -> Self { value.0 }
}

impl AsRef<str> for Inn {
  fn as_ref(&self) -> &str { &self.0 }
}

impl fmt::Display for Inn {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

// ─── Dates ───────────────────────────────────────────────────────────────────

/// Parse a `YYYY-MM-DD` case date. An empty or blank string means "no date".
pub fn parse_case_date(s: &str) -> Result<Option<NaiveDate>> {
  let s = s.trim();
  if s.is_empty() {
    return Ok(None);
  }
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map(Some)
    .map_err(|_| Error::InvalidDate(s.to_owned()))
}

// ─── ArbitrationCase ─────────────────────────────────────────────────────────

/// One row of the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArbitrationCase {
  pub case_number: CaseNumber,
  pub case_date:   Option<NaiveDate>,
  pub inn:         Inn,
}

impl ArbitrationCase {
  pub fn new(case_number: CaseNumber, case_date: Option<NaiveDate>, inn: Inn) -> Self {
    Self { case_number, case_date, inn }
  }
}

// ─── CaseRecord ──────────────────────────────────────────────────────────────

/// Loosely typed case input, as produced by external ingestion (JSON files).
///
/// Every field may be absent or null; [`ArbitrationCase::try_from`] enforces
/// the registry's required fields.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CaseRecord {
  #[serde(default)]
  pub case_number: Option<String>,
  #[serde(default)]
  pub case_date:   Option<String>,
  #[serde(default)]
  pub inn:         Option<String>,
}

impl TryFrom<CaseRecord> for ArbitrationCase {
  type Error = Error;

  fn try_from(record: CaseRecord) -> Result<Self> {
    let case_number = match record.case_number {
      Some(n) if !n.trim().is_empty() => CaseNumber::new(n)?,
      _ => return Err(Error::MissingField("case_number")),
    };
    let inn = Inn::new(record.inn.ok_or(Error::MissingField("inn"))?)?;
    let case_date = match record.case_date.as_deref() {
      Some(d) => parse_case_date(d)?,
      None => None,
    };
    Ok(Self { case_number, case_date, inn })
  }
}
