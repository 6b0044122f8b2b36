//! Encoding and decoding helpers between the case types and the plain-text
//! representations stored in SQLite columns.
//!
//! Dates are stored as `YYYY-MM-DD` strings so that lexical comparison in SQL
//! agrees with calendar order.

use arbitr_core::{ArbitrationCase, CaseNumber, Inn};
use chrono::NaiveDate;

use crate::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

/// Owned column values ready to be moved onto the connection thread.
pub struct CaseParams {
  pub case_number: String,
  pub case_date:   Option<String>,
  pub inn:         String,
}

impl From<&ArbitrationCase> for CaseParams {
  fn from(case: &ArbitrationCase) -> Self {
    Self {
      case_number: case.case_number.as_str().to_owned(),
      case_date:   case.case_date.map(encode_date),
      inn:         case.inn.as_str().to_owned(),
    }
  }
}

/// Raw strings read directly from an `arbitration_cases` row.
pub struct RawCase {
  pub case_number: String,
  pub case_date:   Option<String>,
  pub inn:         String,
}

impl RawCase {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      case_number: row.get(0)?,
      case_date:   row.get(1)?,
      inn:         row.get(2)?,
    })
  }

  pub fn into_case(self) -> Result<ArbitrationCase> {
    Ok(ArbitrationCase {
      case_number: CaseNumber::new(self.case_number)?,
      case_date:   self.case_date.as_deref().map(decode_date).transpose()?,
      inn:         Inn::new(self.inn)?,
    })
  }
}
