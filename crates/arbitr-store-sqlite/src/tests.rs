//! Integration tests for `SqliteStore` against in-memory and on-disk databases.

use arbitr_core::{
  ArbitrationCase, CaseNumber, Inn,
  store::{CaseFilter, CaseStore, ImportSummary, InsertOutcome},
};
use chrono::NaiveDate;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn number(s: &str) -> CaseNumber { CaseNumber::new(s).unwrap() }

fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> { NaiveDate::from_ymd_opt(y, m, d) }

fn case(n: &str, date: Option<NaiveDate>, inn: &str) -> ArbitrationCase {
  ArbitrationCase::new(number(n), date, Inn::new(inn).unwrap())
}

// ─── Insert / lookup ─────────────────────────────────────────────────────────

#[tokio::test]
async fn case_round_trips_exactly() {
  let s = store().await;
  let original = case("A1", ymd(2024, 1, 1), "1234567890");

  s.insert_case(&original).await.unwrap();

  let fetched = s.get_case(&number("A1")).await.unwrap().unwrap();
  assert_eq!(fetched, original);
  assert_eq!(fetched.case_number.as_str(), "A1");
  assert_eq!(fetched.case_date, ymd(2024, 1, 1));
  assert_eq!(fetched.inn.as_str(), "1234567890");
}

#[tokio::test]
async fn get_missing_case_returns_none() {
  let s = store().await;
  assert!(s.get_case(&number("NOPE")).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_case_number_fails() {
  let s = store().await;
  s.insert_case(&case("A1", ymd(2024, 1, 1), "1234567890"))
    .await
    .unwrap();

  let err = s
    .insert_case(&case("A1", ymd(2024, 2, 2), "0987654321"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::DuplicateKey(ref n) if n.as_str() == "A1"));

  // The first row is untouched.
  let stored = s.get_case(&number("A1")).await.unwrap().unwrap();
  assert_eq!(stored.inn.as_str(), "1234567890");
  assert_eq!(s.count().await.unwrap(), 1);
}

#[tokio::test]
async fn case_without_date_is_accepted() {
  let s = store().await;
  s.insert_case(&case("A1", None, "1234567890")).await.unwrap();

  let stored = s.get_case(&number("A1")).await.unwrap().unwrap();
  assert_eq!(stored.case_date, None);
}

#[tokio::test]
async fn null_inn_is_rejected_by_schema() {
  let s = store().await;
  let err = s
    .execute_raw("INSERT INTO arbitration_cases (case_number, case_date, inn) VALUES ('A1', NULL, NULL)")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NullViolation(_)), "{err:?}");
  assert_eq!(s.count().await.unwrap(), 0);
}

#[tokio::test]
async fn null_case_number_is_rejected_by_schema() {
  let s = store().await;
  let err = s
    .execute_raw("INSERT INTO arbitration_cases (case_number, case_date, inn) VALUES (NULL, NULL, '1234567890')")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NullViolation(_)), "{err:?}");
}

#[tokio::test]
async fn overlong_inn_is_rejected_by_schema() {
  let s = store().await;
  let err = s
    .execute_raw("INSERT INTO arbitration_cases (case_number, case_date, inn) VALUES ('A1', NULL, '1234567890123')")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::CheckViolation(_)), "{err:?}");
}

#[tokio::test]
async fn rows_the_reader_cannot_decode_are_rejected() {
  let s = store().await;
  s.insert_case(&case("A1", ymd(2024, 1, 1), "1234567890"))
    .await
    .unwrap();

  let bad_rows = [
    "INSERT INTO arbitration_cases (case_number, case_date, inn) VALUES ('B1', NULL, '')",
    "INSERT INTO arbitration_cases (case_number, case_date, inn) VALUES ('B2', NULL, ' 77 ')",
    "INSERT INTO arbitration_cases (case_number, case_date, inn) VALUES ('B3', NULL, char(9) || '77')",
    "INSERT INTO arbitration_cases (case_number, case_date, inn) VALUES ('', NULL, '77')",
    "INSERT INTO arbitration_cases (case_number, case_date, inn) VALUES ('  ', NULL, '77')",
    "INSERT INTO arbitration_cases (case_number, case_date, inn) VALUES (' B4', NULL, '77')",
    "INSERT INTO arbitration_cases (case_number, case_date, inn) VALUES ('B5', '01.01.2024', '77')",
    "INSERT INTO arbitration_cases (case_number, case_date, inn) VALUES ('B6', '2024-02-30', '77')",
    "INSERT INTO arbitration_cases (case_number, case_date, inn) VALUES ('B7', '2024-01-01 10:00', '77')",
    "INSERT INTO arbitration_cases (case_number, case_date, inn) VALUES ('B8', '', '77')",
  ];
  for sql in bad_rows {
    let err = s.execute_raw(sql).await.unwrap_err();
    assert!(matches!(err, Error::CheckViolation(_)), "{sql}: {err:?}");
  }

  // Whatever the schema accepts must still decode.
  s.execute_raw("INSERT INTO arbitration_cases (case_number, case_date, inn) VALUES ('B9', '2024-02-29', '77')")
    .await
    .unwrap();
  let all = s.list_cases().await.unwrap();
  assert_eq!(numbers(&all), ["A1", "B9"]);
  assert_eq!(s.cases_by_inn(&Inn::new("77").unwrap()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn case_exists_reports_presence() {
  let s = store().await;
  s.insert_case(&case("CASE-001", ymd(2023, 1, 15), "1234567890"))
    .await
    .unwrap();

  assert!(s.case_exists(&number("CASE-001")).await.unwrap());
  assert!(!s.case_exists(&number("NON-EXISTENT-CASE")).await.unwrap());
}

// ─── Insert-or-skip ──────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_or_skip_keeps_existing_row() {
  let s = store().await;

  let first = s
    .insert_or_skip(&case("CASE-001", ymd(2023, 1, 15), "1234567890"))
    .await
    .unwrap();
  assert_eq!(first, InsertOutcome::Inserted);

  let second = s
    .insert_or_skip(&case("CASE-001", ymd(2023, 6, 1), "0987654321"))
    .await
    .unwrap();
  assert_eq!(second, InsertOutcome::Skipped);

  let stored = s.get_case(&number("CASE-001")).await.unwrap().unwrap();
  assert_eq!(stored.case_date, ymd(2023, 1, 15));
  assert_eq!(stored.inn.as_str(), "1234567890");
}

#[tokio::test]
async fn insert_many_counts_inserted_and_skipped() {
  let s = store().await;
  s.insert_case(&case("CASE-001", None, "1234567890")).await.unwrap();

  let batch = vec![
    case("CASE-001", ymd(2023, 1, 15), "1234567890"),
    case("CASE-002", ymd(2023, 1, 16), "0987654321"),
    case("CASE-003", None, "0987654321"),
    case("CASE-002", ymd(2023, 1, 17), "0987654321"),
  ];
  let summary = s.insert_many(&batch).await.unwrap();

  assert_eq!(summary, ImportSummary { inserted: 2, skipped: 2 });
  assert_eq!(s.count().await.unwrap(), 3);

  let second = s.get_case(&number("CASE-002")).await.unwrap().unwrap();
  assert_eq!(second.case_date, ymd(2023, 1, 16));
}

#[tokio::test]
async fn insert_many_empty_batch() {
  let s = store().await;
  let summary = s.insert_many(&[]).await.unwrap();
  assert_eq!(summary, ImportSummary::default());
}

// ─── Reads ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn cases_by_inn_returns_all_cases_of_taxpayer() {
  let s = store().await;
  s.insert_case(&case("B2", ymd(2024, 1, 2), "7700000000")).await.unwrap();
  s.insert_case(&case("A1", ymd(2024, 1, 1), "7700000000")).await.unwrap();
  s.insert_case(&case("C3", None, "5000000000")).await.unwrap();

  let cases = s.cases_by_inn(&Inn::new("7700000000").unwrap()).await.unwrap();
  let numbers: Vec<_> = cases.iter().map(|c| c.case_number.as_str()).collect();
  assert_eq!(numbers, ["A1", "B2"]);

  let none = s.cases_by_inn(&Inn::new("1111111111").unwrap()).await.unwrap();
  assert!(none.is_empty());
}

#[tokio::test]
async fn cases_by_inn_is_exact_match() {
  let s = store().await;
  s.insert_case(&case("A1", None, "770000000012")).await.unwrap();

  let cases = s.cases_by_inn(&Inn::new("7700000000").unwrap()).await.unwrap();
  assert!(cases.is_empty());
}

#[tokio::test]
async fn list_cases_is_ordered_by_number() {
  let s = store().await;
  for n in ["C3", "A1", "B2"] {
    s.insert_case(&case(n, None, "1")).await.unwrap();
  }

  let numbers: Vec<_> = s
    .list_cases()
    .await
    .unwrap()
    .into_iter()
    .map(|c| String::from(c.case_number))
    .collect();
  assert_eq!(numbers, ["A1", "B2", "C3"]);
}

// ─── Search ──────────────────────────────────────────────────────────────────

async fn seeded() -> SqliteStore {
  let s = store().await;
  let cases = [
    case("А40-100/2023", ymd(2023, 12, 31), "7701234567"),
    case("А40-200/2024", ymd(2024, 1, 1), "7701234567"),
    case("А41-300/2024", ymd(2024, 1, 31), "5009876543"),
    case("А41-400/2024", None, "5009876543"),
  ];
  s.insert_many(&cases).await.unwrap();
  s
}

fn numbers(cases: &[ArbitrationCase]) -> Vec<&str> {
  cases.iter().map(|c| c.case_number.as_str()).collect()
}

#[tokio::test]
async fn search_without_criteria_lists_everything() {
  let s = seeded().await;
  let found = s.search(&CaseFilter::default()).await.unwrap();
  assert_eq!(found.len(), 4);
}

#[tokio::test]
async fn search_by_case_number_is_case_insensitive() {
  let s = seeded().await;
  let found = s
    .search(&CaseFilter { case_number: Some("а41".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(numbers(&found), ["А41-300/2024", "А41-400/2024"]);
}

#[tokio::test]
async fn search_by_inn_substring() {
  let s = seeded().await;
  let found = s
    .search(&CaseFilter { inn: Some("0123".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(numbers(&found), ["А40-100/2023", "А40-200/2024"]);
}

#[tokio::test]
async fn search_date_range_is_inclusive_and_skips_undated() {
  let s = seeded().await;
  let found = s
    .search(&CaseFilter {
      date_from: ymd(2024, 1, 1),
      date_to:   ymd(2024, 1, 31),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(numbers(&found), ["А40-200/2024", "А41-300/2024"]);
}

#[tokio::test]
async fn search_combines_criteria() {
  let s = seeded().await;
  let found = s
    .search(&CaseFilter {
      inn:       Some("7701234567".into()),
      date_from: ymd(2024, 1, 1),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(numbers(&found), ["А40-200/2024"]);
}

// ─── Initialisation ──────────────────────────────────────────────────────────

#[tokio::test]
async fn reinitialize_yields_empty_table_with_constraints() {
  let s = seeded().await;
  assert_eq!(s.count().await.unwrap(), 4);

  s.reinitialize().await.unwrap();
  assert_eq!(s.count().await.unwrap(), 0);

  // Running it again is harmless.
  s.reinitialize().await.unwrap();
  assert_eq!(s.count().await.unwrap(), 0);

  // Constraints survive the rebuild.
  s.insert_case(&case("A1", None, "1")).await.unwrap();
  let err = s.insert_case(&case("A1", None, "2")).await.unwrap_err();
  assert!(matches!(err, Error::DuplicateKey(_)));
  let err = s
    .execute_raw("INSERT INTO arbitration_cases (case_number, inn) VALUES ('A2', NULL)")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NullViolation(_)));
}

#[tokio::test]
async fn reopening_a_file_keeps_cases() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("cases.db");

  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.insert_case(&case("A1", ymd(2024, 1, 1), "1234567890"))
      .await
      .unwrap();
  }

  let s = SqliteStore::open(&path).await.unwrap();
  assert!(s.case_exists(&number("A1")).await.unwrap());

  s.reinitialize().await.unwrap();
  drop(s);

  let s = SqliteStore::open(&path).await.unwrap();
  assert_eq!(s.count().await.unwrap(), 0);
}
