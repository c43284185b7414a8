use merchant_ledger::workflows::merchants::MerchantNormalizer;
use merchant_ledger::workflows::transactions::{
    write_csv, Amount, TransactionImportError, TransactionImporter,
};
use std::io::{Cursor, Write};

const SAMPLE_EXPORT: &[u8] = include_bytes!("../bank_export_sample.csv");

#[test]
fn sample_export_imports_with_canonical_merchants() {
    let import = TransactionImporter::new(MerchantNormalizer::standard())
        .with_source_account("Shared Wallet")
        .import_reader(Cursor::new(SAMPLE_EXPORT))
        .expect("sample export imports");

    assert_eq!(import.records.len(), 11);
    assert_eq!(import.duplicates, 1);

    let merchants: Vec<&str> = import
        .records
        .iter()
        .map(|record| record.normalized_merchant.as_str())
        .collect();
    assert_eq!(
        merchants,
        vec![
            "albert heijn",
            "albert heijn",
            "action",
            "burger king",
            "amazon",
            "maxima",
            "",
            "jumbo",
            "bol com",
            "albert heijn",
            "vinted",
        ]
    );

    let salary = &import.records[6];
    assert_eq!(salary.amount, Amount::from_cents(215_000));
    assert!(salary.merchant.is_none());

    let jumbo = &import.records[7];
    assert_eq!(jumbo.currency, "EUR");

    let untagged = &import.records[9];
    assert_eq!(untagged.source_account.as_deref(), Some("Shared Wallet"));
}

#[test]
fn reimporting_the_same_export_is_stable() {
    let importer = TransactionImporter::new(MerchantNormalizer::standard());
    let first = importer
        .import_reader(Cursor::new(SAMPLE_EXPORT))
        .expect("first import");
    let second = importer
        .import_reader(Cursor::new(SAMPLE_EXPORT))
        .expect("second import");

    assert_eq!(first.records, second.records);
}

#[test]
fn import_path_reads_exports_from_disk() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(SAMPLE_EXPORT).expect("write export");

    let import = TransactionImporter::new(MerchantNormalizer::standard())
        .import_path(file.path())
        .expect("import from disk");
    assert_eq!(import.records.len(), 11);
}

#[test]
fn exported_csv_round_trips_normalized_column() {
    let import = TransactionImporter::new(MerchantNormalizer::standard())
        .import_reader(Cursor::new(SAMPLE_EXPORT))
        .expect("sample export imports");

    let mut out = Vec::new();
    write_csv(&import.records, &mut out).expect("write csv");

    let mut reader = csv::Reader::from_reader(out.as_slice());
    let headers = reader.headers().expect("headers").clone();
    let column = headers
        .iter()
        .position(|header| header == "normalized_merchant")
        .expect("normalized column present");

    let written: Vec<String> = reader
        .records()
        .map(|record| record.expect("record")[column].to_string())
        .collect();
    assert_eq!(written.len(), import.records.len());
    assert_eq!(written[2], "action");
}

#[test]
fn malformed_rows_abort_the_import() {
    let csv = "date,amount,merchant\n2024-03-01,-1.00,AH TO GO\n2024-13-45,-2.00,Lidl\n";
    let error = TransactionImporter::new(MerchantNormalizer::standard())
        .import_reader(Cursor::new(csv))
        .expect_err("bad date rejected");

    assert_eq!(error.to_string(), "line 3: unrecognised date '2024-13-45'");
    assert!(matches!(error, TransactionImportError::InvalidDate { .. }));
}
