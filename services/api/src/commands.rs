use clap::Args;
use merchant_ledger::config::AppConfig;
use merchant_ledger::error::AppError;
use merchant_ledger::telemetry::{self, LogTarget};
use merchant_ledger::workflows::merchants::{load_normalizer, MerchantNormalizer};
use merchant_ledger::workflows::transactions::{write_csv, TransactionImporter};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct NormalizeArgs {
    /// Raw merchant names as they appear on bank statements
    #[arg(required = true)]
    pub(crate) raw: Vec<String>,
    /// Print a JSON array instead of `raw -> canonical` lines
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// Bank CSV export to import
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Account label for rows that do not carry one
    #[arg(long)]
    pub(crate) source_account: Option<String>,
    /// Write the normalized CSV here instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct NormalizedMerchant<'a> {
    raw: &'a str,
    normalized: String,
}

pub(crate) fn run_normalize(args: NormalizeArgs) -> Result<(), AppError> {
    let normalizer = prepare_batch()?;
    let stdout = std::io::stdout();
    write_normalized(&normalizer, &args.raw, args.json, stdout.lock())?;
    Ok(())
}

pub(crate) fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let ImportArgs {
        csv,
        source_account,
        output,
    } = args;

    let normalizer = prepare_batch()?;
    let importer = TransactionImporter::new(&normalizer);
    let importer = match source_account {
        Some(account) => importer.with_source_account(account),
        None => importer,
    };

    let import = importer.import_path(&csv)?;
    match &output {
        Some(path) => write_csv(&import.records, std::fs::File::create(path)?)?,
        None => write_csv(&import.records, std::io::stdout().lock())?,
    }

    info!(
        path = %csv.display(),
        imported = import.records.len(),
        duplicates = import.duplicates,
        "bank export imported"
    );
    Ok(())
}

/// Batch commands log to stderr so stdout carries only their output.
fn prepare_batch() -> Result<MerchantNormalizer, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, LogTarget::Stderr)?;
    Ok(load_normalizer(config.merchants.rules_path.as_deref())?)
}

fn write_normalized<W: Write>(
    normalizer: &MerchantNormalizer,
    raw: &[String],
    json: bool,
    mut out: W,
) -> std::io::Result<()> {
    let results: Vec<NormalizedMerchant<'_>> = raw
        .iter()
        .map(|raw| NormalizedMerchant {
            raw,
            normalized: normalizer.normalize(raw),
        })
        .collect();

    if json {
        serde_json::to_writer_pretty(&mut out, &results)?;
        writeln!(out)?;
    } else {
        for result in &results {
            writeln!(out, "{} -> {}", result.raw, result.normalized)?;
        }
    }

    out.flush()
}
