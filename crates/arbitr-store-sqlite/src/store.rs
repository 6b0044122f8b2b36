//! [`SqliteStore`] — the SQLite implementation of [`CaseStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;

use arbitr_core::{
  ArbitrationCase, CaseNumber, Inn,
  store::{CaseFilter, CaseStore, ImportSummary, InsertOutcome},
};

use crate::{
  Error, Result,
  encode::{CaseParams, RawCase, encode_date},
  error::classify,
  schema::{PRAGMAS, RESET, SCHEMA},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An arbitration case registry backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path`. Existing cases are kept; the table
  /// is created only if it is missing.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::info!(path = %path.display(), "opened case registry");
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(PRAGMAS)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `sql` whose rows decode to cases.
  async fn query_cases(
    &self,
    sql: &'static str,
    params: Vec<Option<String>>,
  ) -> Result<Vec<ArbitrationCase>> {
    let raws: Vec<RawCase> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawCase::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCase::into_case).collect()
  }

  /// Execute a raw statement, bypassing the typed API.
  #[cfg(test)]
  pub(crate) async fn execute_raw(&self, sql: &'static str) -> Result<usize> {
    self
      .conn
      .call(move |conn| Ok(conn.execute(sql, [])?))
      .await
      .map_err(|e| classify(e, None))
  }
}

// ─── CaseStore impl ──────────────────────────────────────────────────────────

impl CaseStore for SqliteStore {
  type Error = Error;

  // ── Schema ────────────────────────────────────────────────────────────────

  async fn reinitialize(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        let tx = conn.transaction()?;
        tx.execute_batch(RESET)?;
        tx.execute_batch(SCHEMA)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    tracing::info!("case registry reinitialised; all cases dropped");
    Ok(())
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn insert_case(&self, case: &ArbitrationCase) -> Result<()> {
    let p = CaseParams::from(case);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO arbitration_cases (case_number, case_date, inn) VALUES (?1, ?2, ?3)",
          rusqlite::params![p.case_number, p.case_date, p.inn],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| classify(e, Some(&case.case_number)))?;

    tracing::debug!(case_number = %case.case_number, "case inserted");
    Ok(())
  }

  async fn insert_or_skip(&self, case: &ArbitrationCase) -> Result<InsertOutcome> {
    let p = CaseParams::from(case);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT INTO arbitration_cases (case_number, case_date, inn) VALUES (?1, ?2, ?3)
           ON CONFLICT (case_number) DO NOTHING",
          rusqlite::params![p.case_number, p.case_date, p.inn],
        )?)
      })
      .await
      .map_err(|e| classify(e, Some(&case.case_number)))?;

    if changed == 0 {
      tracing::debug!(case_number = %case.case_number, "case already stored, skipped");
      Ok(InsertOutcome::Skipped)
    } else {
      tracing::debug!(case_number = %case.case_number, "case inserted");
      Ok(InsertOutcome::Inserted)
    }
  }

  async fn insert_many(&self, cases: &[ArbitrationCase]) -> Result<ImportSummary> {
    let params: Vec<CaseParams> = cases.iter().map(CaseParams::from).collect();

    let summary = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut summary = ImportSummary::default();
        {
          let mut stmt = tx.prepare(
            "INSERT INTO arbitration_cases (case_number, case_date, inn) VALUES (?1, ?2, ?3)
             ON CONFLICT (case_number) DO NOTHING",
          )?;
          for p in &params {
            if stmt.execute(rusqlite::params![p.case_number, p.case_date, p.inn])? == 0 {
              summary.skipped += 1;
            } else {
              summary.inserted += 1;
            }
          }
        }
        tx.commit()?;
        Ok(summary)
      })
      .await
      .map_err(|e| classify(e, None))?;

    tracing::debug!(
      inserted = summary.inserted,
      skipped = summary.skipped,
      "batch insert committed"
    );
    Ok(summary)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_case(&self, number: &CaseNumber) -> Result<Option<ArbitrationCase>> {
    let key = number.as_str().to_owned();

    let raw: Option<RawCase> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT case_number, case_date, inn FROM arbitration_cases WHERE case_number = ?1",
            rusqlite::params![key],
            RawCase::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawCase::into_case).transpose()
  }

  async fn case_exists(&self, number: &CaseNumber) -> Result<bool> {
    let key = number.as_str().to_owned();

    let exists = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT 1 FROM arbitration_cases WHERE case_number = ?1",
            rusqlite::params![key],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false))
      })
      .await?;

    Ok(exists)
  }

  async fn cases_by_inn(&self, inn: &Inn) -> Result<Vec<ArbitrationCase>> {
    self
      .query_cases(
        "SELECT case_number, case_date, inn FROM arbitration_cases
         WHERE inn = ?1
         ORDER BY case_number",
        vec![Some(inn.as_str().to_owned())],
      )
      .await
  }

  async fn list_cases(&self) -> Result<Vec<ArbitrationCase>> {
    let cases = self
      .query_cases(
        "SELECT case_number, case_date, inn FROM arbitration_cases ORDER BY case_number",
        Vec::new(),
      )
      .await?;
    tracing::debug!(count = cases.len(), "listed cases");
    Ok(cases)
  }

  async fn search(&self, filter: &CaseFilter) -> Result<Vec<ArbitrationCase>> {
    // Date bounds narrow the scan in SQL. Text criteria need Unicode case
    // folding, which SQLite's LIKE lacks, so they are applied afterwards.
    let from = filter.date_from.map(encode_date);
    let to = filter.date_to.map(encode_date);

    let mut cases = self
      .query_cases(
        "SELECT case_number, case_date, inn FROM arbitration_cases
         WHERE (?1 IS NULL OR case_date >= ?1)
           AND (?2 IS NULL OR case_date <= ?2)
         ORDER BY case_number",
        vec![from, to],
      )
      .await?;

    cases.retain(|c| filter.matches(c));
    tracing::debug!(count = cases.len(), "filtered cases");
    Ok(cases)
  }

  async fn count(&self) -> Result<usize> {
    let n: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM arbitration_cases", [], |r| r.get(0))?)
      })
      .await?;
    Ok(usize::try_from(n).unwrap_or_default())
  }
}
