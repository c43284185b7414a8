mod domain;
mod parser;

pub use domain::{Amount, DedupKey, TransactionRecord, DEFAULT_CURRENCY};

use crate::workflows::merchants::MerchantNormalizer;
use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

use parser::BankRow;

#[derive(Debug, thiserror::Error)]
pub enum TransactionImportError {
    #[error("failed to read bank export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid bank CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: unrecognised date '{value}'")]
    InvalidDate { line: u64, value: String },
    #[error("line {line}: unrecognised amount '{value}'")]
    InvalidAmount { line: u64, value: String },
}

/// Outcome of importing one bank export.
#[derive(Debug, Clone, Default)]
pub struct TransactionImport {
    pub records: Vec<TransactionRecord>,
    /// Described rows dropped because an earlier row had the same dedup key.
    pub duplicates: usize,
}

/// Reads bank CSV exports into normalized transaction records.
pub struct TransactionImporter<'a> {
    normalizer: &'a MerchantNormalizer,
    source_account: Option<String>,
}

impl<'a> TransactionImporter<'a> {
    pub fn new(normalizer: &'a MerchantNormalizer) -> Self {
        Self {
            normalizer,
            source_account: None,
        }
    }

    /// Account label applied to rows that do not name one.
    pub fn with_source_account(mut self, source_account: impl Into<String>) -> Self {
        self.source_account = Some(source_account.into());
        self
    }

    pub fn import_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<TransactionImport, TransactionImportError> {
        let file = std::fs::File::open(path)?;
        self.import_reader(file)
    }

    pub fn import_reader<R: Read>(
        &self,
        reader: R,
    ) -> Result<TransactionImport, TransactionImportError> {
        let mut import = TransactionImport::default();
        let mut seen: HashSet<DedupKey> = HashSet::new();

        for row in parser::parse_rows(reader)? {
            let line = row.line;
            let record = self.build_record(row)?;

            if let Some(key) = record.dedup_key() {
                if !seen.insert(key) {
                    debug!(line, date = %record.date, amount = %record.amount, "skipping duplicate transaction");
                    import.duplicates += 1;
                    continue;
                }
            }

            import.records.push(record);
        }

        Ok(import)
    }

    fn build_record(&self, row: BankRow) -> Result<TransactionRecord, TransactionImportError> {
        let date = parser::parse_date(&row.date).ok_or_else(|| TransactionImportError::InvalidDate {
            line: row.line,
            value: row.date.clone(),
        })?;
        let amount = Amount::parse(&row.amount).ok_or_else(|| TransactionImportError::InvalidAmount {
            line: row.line,
            value: row.amount.clone(),
        })?;

        let normalized_merchant = self.normalizer.normalize_optional(row.merchant.as_deref());

        Ok(TransactionRecord {
            date,
            amount,
            currency: row
                .currency
                .map(|currency| currency.to_ascii_uppercase())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            description: row.description,
            merchant: row.merchant,
            normalized_merchant,
            source_account: row.source_account.or_else(|| self.source_account.clone()),
        })
    }
}

/// Writes records as CSV with the `normalized_merchant` column next to the raw merchant.
pub fn write_csv<W: Write>(records: &[TransactionRecord], writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Cursor;

    fn importer() -> TransactionImporter<'static> {
        TransactionImporter::new(MerchantNormalizer::standard())
    }

    #[test]
    fn importer_fills_normalized_merchant_and_defaults() {
        let csv = "date,amount,description,merchant\n\
2024-03-07,\"-4,99\",Card payment,AH TO GO 5811\n\
2024-03-08,-12.00,Transfer,\n";
        let import = importer()
            .with_source_account("ING Main")
            .import_reader(Cursor::new(csv))
            .expect("import succeeds");

        assert_eq!(import.duplicates, 0);
        let first = &import.records[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 3, 7).unwrap());
        assert_eq!(first.amount, Amount::from_cents(-499));
        assert_eq!(first.currency, "EUR");
        assert_eq!(first.merchant.as_deref(), Some("AH TO GO 5811"));
        assert_eq!(first.normalized_merchant, "albert heijn");
        assert_eq!(first.source_account.as_deref(), Some("ING Main"));

        let second = &import.records[1];
        assert!(second.merchant.is_none());
        assert_eq!(second.normalized_merchant, "");
    }

    #[test]
    fn importer_keeps_first_of_duplicate_rows() {
        let csv = "date,amount,description,merchant,source_account\n\
2024-03-07,-4.99,Card payment,AH TO GO,ING Main\n\
07-03-2024,\"-4,99\",Card payment,ahtogo,Credit Card\n\
2024-03-07,-4.99,Card payment 2,AH TO GO,ING Main\n";
        let import = importer().import_reader(Cursor::new(csv)).expect("import succeeds");

        assert_eq!(import.records.len(), 2);
        assert_eq!(import.duplicates, 1);
        assert_eq!(import.records[0].source_account.as_deref(), Some("ING Main"));
    }

    #[test]
    fn rows_without_description_are_never_collapsed() {
        let csv = "date,amount,merchant\n\
2024-03-07,-3.50,Coffee Bar\n\
2024-03-07,-3.50,Coffee Bar\n";
        let import = importer().import_reader(Cursor::new(csv)).expect("import succeeds");

        assert_eq!(import.records.len(), 2);
        assert_eq!(import.duplicates, 0);
        assert!(import
            .records
            .iter()
            .all(|record| record.normalized_merchant == "coffee bar"));
    }

    #[test]
    fn row_account_wins_over_importer_default() {
        let csv = "date,amount,merchant,source_account\n2024-03-07,1.00,Bol.com,Credit Card\n";
        let import = importer()
            .with_source_account("ING Main")
            .import_reader(Cursor::new(csv))
            .expect("import succeeds");

        assert_eq!(import.records[0].source_account.as_deref(), Some("Credit Card"));
        assert_eq!(import.records[0].normalized_merchant, "bol com");
    }

    #[test]
    fn invalid_date_reports_line() {
        let csv = "date,amount\n2024-03-07,1.00\nyesterday,2.00\n";
        let error = importer()
            .import_reader(Cursor::new(csv))
            .expect_err("invalid date rejected");

        match error {
            TransactionImportError::InvalidDate { line, value } => {
                assert_eq!(line, 3);
                assert_eq!(value, "yesterday");
            }
            other => panic!("expected invalid date, got {other:?}"),
        }
    }

    #[test]
    fn invalid_amount_reports_line() {
        let csv = "date,amount\n2024-03-07,twelve\n";
        let error = importer()
            .import_reader(Cursor::new(csv))
            .expect_err("invalid amount rejected");

        assert!(matches!(
            error,
            TransactionImportError::InvalidAmount { line: 2, .. }
        ));
    }

    #[test]
    fn import_path_propagates_io_errors() {
        let error = importer()
            .import_path("./does-not-exist.csv")
            .expect_err("expected io error");

        match error {
            TransactionImportError::Io(_) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn write_csv_emits_normalized_column() {
        let csv = "date,amount,merchant\n2024-03-07,-4.99,1444 deventer\n";
        let import = importer().import_reader(Cursor::new(csv)).expect("import succeeds");

        let mut out = Vec::new();
        write_csv(&import.records, &mut out).expect("write succeeds");
        let written = String::from_utf8(out).expect("utf8 output");

        let mut lines = written.lines();
        assert_eq!(
            lines.next(),
            Some("date,amount,currency,description,merchant,normalized_merchant,source_account")
        );
        assert_eq!(lines.next(), Some("2024-03-07,-4.99,EUR,,1444 deventer,action,"));
    }
}
