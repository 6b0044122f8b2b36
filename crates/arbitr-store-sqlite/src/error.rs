//! Error type for `arbitr-store-sqlite`.

use arbitr_core::CaseNumber;
use rusqlite::ffi;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] arbitr_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// A case with this number is already stored.
  #[error("duplicate case number: {0}")]
  DuplicateKey(CaseNumber),

  #[error("not-null constraint violated: {0}")]
  NullViolation(String),

  #[error("check constraint violated: {0}")]
  CheckViolation(String),

  #[error("date parse error: {0}")]
  DateParse(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Map SQLite constraint failures onto the registry's error taxonomy.
///
/// `key` names the case being written; without it a primary-key failure is
/// reported as a plain database error.
pub(crate) fn classify(err: tokio_rusqlite::Error, key: Option<&CaseNumber>) -> Error {
  if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(code, msg)) = &err {
    let msg = msg.clone().unwrap_or_default();
    match code.extended_code {
      ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE => {
        if let Some(key) = key {
          return Error::DuplicateKey(key.clone());
        }
      }
      ffi::SQLITE_CONSTRAINT_NOTNULL => return Error::NullViolation(msg),
      ffi::SQLITE_CONSTRAINT_CHECK => return Error::CheckViolation(msg),
      _ => {}
    }
  }
  Error::Database(err)
}
