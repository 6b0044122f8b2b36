//! `arbitr` — command-line front end for the arbitration case registry.
//!
//! # Usage
//!
//! ```text
//! arbitr init
//! arbitr add А40-123456/2023 7701234567 --date 2023-11-02
//! arbitr by-inn 7701234567
//! arbitr list --case-number а40 --from 2023-01-01
//! arbitr import scraped.json
//! arbitr export cases.csv
//! arbitr --config /etc/arbitr/config.toml reset --yes
//! ```

mod export;
mod settings;

use std::{
  fs::{File, OpenOptions},
  io::{self, BufWriter, Write as _},
  path::{Path, PathBuf},
  sync::Mutex,
};

use anyhow::{Context as _, bail};
use arbitr_core::{
  ArbitrationCase, CaseNumber, CaseRecord, Inn,
  store::{CaseFilter, CaseStore, InsertOutcome},
};
use arbitr_store_sqlite::SqliteStore;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer as _, layer::SubscriberExt as _, util::SubscriberInitExt as _};

use export::ExportFormat;
use settings::CliConfig;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "arbitr", version, about = "Arbitration case registry")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Create the case table if it does not exist yet.
  Init,

  /// Drop and recreate the case table, discarding every stored case.
  Reset {
    /// Confirm that all data may be lost.
    #[arg(long)]
    yes: bool,
  },

  /// Record a single case.
  Add {
    case_number: String,
    inn:         String,
    /// Case date (YYYY-MM-DD).
    #[arg(long)]
    date:          Option<NaiveDate>,
    /// Leave an existing case untouched instead of failing.
    #[arg(long)]
    skip_existing: bool,
  },

  /// Show one case by number.
  Show { case_number: String },

  /// List every case recorded for a taxpayer.
  ByInn { inn: String },

  /// List cases, optionally filtered.
  List {
    /// Case-insensitive substring of the case number.
    #[arg(long)]
    case_number: Option<String>,
    /// Case-insensitive substring of the INN.
    #[arg(long)]
    inn:         Option<String>,
    /// Earliest case date, inclusive (YYYY-MM-DD).
    #[arg(long)]
    from:        Option<NaiveDate>,
    /// Latest case date, inclusive (YYYY-MM-DD).
    #[arg(long)]
    to:          Option<NaiveDate>,
    /// Print JSON instead of tab-separated lines.
    #[arg(long)]
    json:        bool,
  },

  /// Insert cases from a JSON array of `{case_number, case_date, inn}`
  /// objects, skipping numbers that are already stored.
  Import { file: PathBuf },

  /// Write every stored case to a file.
  Export {
    file:   PathBuf,
    /// Output format; inferred from the file extension when omitted.
    #[arg(long, value_enum)]
    format: Option<ExportFormat>,
  },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();
  let cfg = CliConfig::load(&cli.config)?;
  init_tracing(cfg.log_file.as_deref())?;

  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;

  run(cli.command, &store).await
}

/// Log to stderr, and additionally to `log_file` without colours.
fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<()> {
  let filter = || {
    EnvFilter::builder()
      .with_default_directive(LevelFilter::INFO.into())
      .from_env_lossy()
  };

  let file_layer = match log_file {
    Some(path) => {
      let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
      Some(
        tracing_subscriber::fmt::layer()
          .with_ansi(false)
          .with_writer(Mutex::new(file))
          .with_filter(filter()),
      )
    }
    None => None,
  };

  tracing_subscriber::registry()
    .with(
      tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_filter(filter()),
    )
    .with(file_layer)
    .init();
  Ok(())
}

// ─── Commands ─────────────────────────────────────────────────────────────────

async fn run<S>(command: Command, store: &S) -> anyhow::Result<()>
where
  S: CaseStore,
{
  match command {
    Command::Init => {
      let n = store.count().await?;
      tracing::info!(cases = n, "case table ready");
    }

    Command::Reset { yes } => {
      if !yes {
        bail!("refusing to drop all cases without --yes");
      }
      store.reinitialize().await?;
    }

    Command::Add { case_number, inn, date, skip_existing } => {
      let case = ArbitrationCase::new(CaseNumber::new(case_number)?, date, Inn::new(inn)?);
      if skip_existing {
        match store.insert_or_skip(&case).await? {
          InsertOutcome::Inserted => tracing::info!(case_number = %case.case_number, "case inserted"),
          InsertOutcome::Skipped => {
            tracing::info!(case_number = %case.case_number, "case already exists, skipped")
          }
        }
      } else {
        store.insert_case(&case).await?;
        tracing::info!(case_number = %case.case_number, "case inserted");
      }
    }

    Command::Show { case_number } => {
      let number = CaseNumber::new(case_number)?;
      let Some(case) = store.get_case(&number).await? else {
        bail!("case {number} not found");
      };
      println!("{}", serde_json::to_string_pretty(&case)?);
    }

    Command::ByInn { inn } => {
      let inn = Inn::new(inn)?;
      let cases = store.cases_by_inn(&inn).await?;
      tracing::info!(%inn, cases = cases.len(), "cases for taxpayer");
      print_lines(&cases)?;
    }

    Command::List { case_number, inn, from, to, json } => {
      let filter = CaseFilter { case_number, inn, date_from: from, date_to: to };
      let cases = if filter.is_empty() {
        store.list_cases().await?
      } else {
        store.search(&filter).await?
      };
      tracing::info!(cases = cases.len(), "cases found");
      if json {
        println!("{}", serde_json::to_string_pretty(&cases)?);
      } else {
        print_lines(&cases)?;
      }
    }

    Command::Import { file } => {
      let cases = read_records(&file)?;
      let summary = store.insert_many(&cases).await?;
      tracing::info!(
        inserted = summary.inserted,
        skipped = summary.skipped,
        "import finished"
      );
      println!("{}", serde_json::to_string(&summary)?);
    }

    Command::Export { file, format } => {
      let cases = store.list_cases().await?;
      if cases.is_empty() {
        tracing::warn!(path = %file.display(), cases = 0, "no cases to export");
        return Ok(());
      }
      let format = format.unwrap_or_else(|| ExportFormat::from_path(&file));
      write_export(&file, format, &cases)?;
      tracing::info!(path = %file.display(), ?format, cases = cases.len(), "export written");
    }
  }
  Ok(())
}

fn print_lines(cases: &[ArbitrationCase]) -> io::Result<()> {
  let mut out = io::stdout().lock();
  for case in cases {
    let date = case.case_date.map(|d| d.to_string());
    writeln!(
      out,
      "{}\t{}\t{}",
      case.case_number,
      date.as_deref().unwrap_or("-"),
      case.inn
    )?;
  }
  Ok(())
}

/// Parse a JSON array of loosely typed records into cases.
fn read_records(path: &Path) -> anyhow::Result<Vec<ArbitrationCase>> {
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("reading {}", path.display()))?;
  let records: Vec<CaseRecord> =
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;

  records
    .into_iter()
    .enumerate()
    .map(|(i, r)| {
      ArbitrationCase::try_from(r).with_context(|| format!("record #{i} in {}", path.display()))
    })
    .collect()
}

fn write_export(path: &Path, format: ExportFormat, cases: &[ArbitrationCase]) -> anyhow::Result<()> {
  let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
  let mut out = BufWriter::new(file);
  match format {
    ExportFormat::Csv => export::write_csv(&mut out, cases).context("writing CSV")?,
    ExportFormat::Json => export::write_json(&mut out, cases).context("writing JSON")?,
  }
  out.flush().context("flushing export")?;
  Ok(())
}
