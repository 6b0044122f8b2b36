//! Error types for `arbitr-core`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
  #[error("case number must not be empty")]
  EmptyCaseNumber,

  /// A required field was null or absent in loosely typed input.
  #[error("missing required field: {0}")]
  MissingField(&'static str),

  #[error("INN is {len} characters long; at most 12 are stored")]
  InnTooLong { len: usize },

  #[error("invalid case date {0:?}; expected YYYY-MM-DD")]
  InvalidDate(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
