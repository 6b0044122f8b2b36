//! The `CaseStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `arbitr-store-sqlite`).
//! The CLI depends on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;
use serde::Serialize;

use crate::case::{ArbitrationCase, CaseNumber, Inn};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`CaseStore::search`]. Every populated criterion must
/// match; an empty filter matches every case.
#[derive(Debug, Clone, Default)]
pub struct CaseFilter {
  /// Case-insensitive substring of the case number.
  pub case_number: Option<String>,
  /// Case-insensitive substring of the INN.
  pub inn:         Option<String>,
  /// Inclusive lower bound on `case_date`.
  pub date_from:   Option<NaiveDate>,
  /// Inclusive upper bound on `case_date`.
  pub date_to:     Option<NaiveDate>,
}

impl CaseFilter {
  /// Whether the filter carries no criteria at all.
  pub fn is_empty(&self) -> bool {
    needle(&self.case_number).is_none()
      && needle(&self.inn).is_none()
      && self.date_from.is_none()
      && self.date_to.is_none()
  }

  /// Evaluate the filter against a single case.
  ///
  /// Text criteria fold case with Unicode rules, so `а40` matches `А40`.
  /// A case without a date never satisfies a date bound.
  pub fn matches(&self, case: &ArbitrationCase) -> bool {
    if let Some(n) = needle(&self.case_number)
      && !contains_folded(case.case_number.as_str(), &n)
    {
      return false;
    }
    if let Some(n) = needle(&self.inn)
      && !contains_folded(case.inn.as_str(), &n)
    {
      return false;
    }
    if self.date_from.is_some() || self.date_to.is_some() {
      let Some(date) = case.case_date else {
        return false;
      };
      if self.date_from.is_some_and(|from| date < from) {
        return false;
      }
      if self.date_to.is_some_and(|to| date > to) {
        return false;
      }
    }
    true
  }
}

/// A lowercased, trimmed text criterion; blank criteria are ignored.
fn needle(criterion: &Option<String>) -> Option<String> {
  criterion
    .as_deref()
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_lowercase)
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
  haystack.to_lowercase().contains(needle)
}

// ─── Write results ───────────────────────────────────────────────────────────

/// Result of [`CaseStore::insert_or_skip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
  Inserted,
  /// A case with the same number was already stored and left untouched.
  Skipped,
}

/// Totals reported by [`CaseStore::insert_many`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
  pub inserted: usize,
  pub skipped:  usize,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an arbitration case registry backend.
///
/// Cases are keyed by [`CaseNumber`]. The registry defines no update or
/// delete; the only destructive operation is [`CaseStore::reinitialize`].
///
/// All methods return `Send` futures so the trait can be used from a
/// multi-threaded tokio runtime.
pub trait CaseStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Schema ────────────────────────────────────────────────────────────

  /// Drop and recreate the case table. All stored cases are lost.
  fn reinitialize(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Insert a new case. Fails with a duplicate-key error if a case with the
  /// same number already exists.
  fn insert_case<'a>(
    &'a self,
    case: &'a ArbitrationCase,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Insert a case unless its number is already stored, in which case the
  /// existing row is kept and [`InsertOutcome::Skipped`] is returned.
  fn insert_or_skip<'a>(
    &'a self,
    case: &'a ArbitrationCase,
  ) -> impl Future<Output = Result<InsertOutcome, Self::Error>> + Send + 'a;

  /// Insert-or-skip every case in one transaction.
  fn insert_many<'a>(
    &'a self,
    cases: &'a [ArbitrationCase],
  ) -> impl Future<Output = Result<ImportSummary, Self::Error>> + Send + 'a;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Retrieve a case by number. Returns `None` if not found.
  fn get_case<'a>(
    &'a self,
    number: &'a CaseNumber,
  ) -> impl Future<Output = Result<Option<ArbitrationCase>, Self::Error>> + Send + 'a;

  fn case_exists<'a>(
    &'a self,
    number: &'a CaseNumber,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// All cases recorded for a taxpayer (exact match), ordered by number.
  fn cases_by_inn<'a>(
    &'a self,
    inn: &'a Inn,
  ) -> impl Future<Output = Result<Vec<ArbitrationCase>, Self::Error>> + Send + 'a;

  /// Every stored case, ordered by number.
  fn list_cases(
    &self,
  ) -> impl Future<Output = Result<Vec<ArbitrationCase>, Self::Error>> + Send + '_;

  /// Cases matching `filter`, ordered by number.
  fn search<'a>(
    &'a self,
    filter: &'a CaseFilter,
  ) -> impl Future<Output = Result<Vec<ArbitrationCase>, Self::Error>> + Send + 'a;

  fn count(&self) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;
}
