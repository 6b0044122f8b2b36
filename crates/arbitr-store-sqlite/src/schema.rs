//! SQL schema for the case registry.
//!
//! [`SCHEMA`] runs on every open and only creates what is missing.
//! Re-initialisation runs [`RESET`] followed by [`SCHEMA`] in one
//! transaction, leaving an empty table.

macro_rules! whitespace {
  () => {
    "char(9, 10, 11, 12, 13, 32, 133, 160, 5760, 8192, 8193, 8194, 8195, 8196, 8197, \
     8198, 8199, 8200, 8201, 8202, 8232, 8233, 8239, 8287, 12288)"
  };
}

/// Connection-level settings; must run outside a transaction.
pub const PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
";

/// Idempotent DDL.
///
/// The `CHECK`s mirror the rules of `CaseNumber`, `Inn` and the date codec so
/// that any row accepted here can be read back. The `char(...)` list is the
/// Unicode `White_Space` set that `str::trim` strips.
pub const SCHEMA: &str = concat!(
  "
-- One row per arbitration case found for a taxpayer.
-- Rows are never updated or deleted; the table is only ever recreated.
CREATE TABLE IF NOT EXISTS arbitration_cases (
    case_number TEXT PRIMARY KEY NOT NULL    -- unique case number, e.g. А40-123456/2023
                CHECK (length(case_number) > 0
                       AND case_number = trim(case_number, ", whitespace!(), ")),
    case_date   TEXT                         -- YYYY-MM-DD or NULL when unknown
                CHECK (case_date IS NULL OR date(case_date) IS case_date),
    inn         TEXT NOT NULL                -- taxpayer identification number (INN)
                CHECK (length(inn) BETWEEN 1 AND 12
                       AND inn = trim(inn, ", whitespace!(), "))
);

-- One taxpayer to many cases.
CREATE INDEX IF NOT EXISTS arbitration_cases_inn_idx ON arbitration_cases(inn);

PRAGMA user_version = 2;
"
);

/// Drops the case table and everything in it.
pub const RESET: &str = "
DROP INDEX IF EXISTS arbitration_cases_inn_idx;
DROP TABLE IF EXISTS arbitration_cases;
";
