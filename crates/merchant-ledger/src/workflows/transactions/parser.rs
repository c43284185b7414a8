use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::io::Read;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%d.%m.%Y", "%Y%m%d"];

/// One CSV row after field-level parsing, before merchant normalization.
#[derive(Debug)]
pub(crate) struct BankRow {
    pub(crate) line: u64,
    pub(crate) date: String,
    pub(crate) amount: String,
    pub(crate) currency: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) merchant: Option<String>,
    pub(crate) source_account: Option<String>,
}

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<BankRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut rows = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map(|pos| pos.line()).unwrap_or_default();
        let row: RawBankRow = record.deserialize(Some(&headers))?;

        rows.push(BankRow {
            line,
            date: row.date,
            amount: row.amount,
            currency: row.currency,
            description: row.description,
            merchant: row.merchant,
            source_account: row.source_account,
        });
    }

    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct RawBankRow {
    #[serde(alias = "Date", alias = "Datum")]
    date: String,
    #[serde(alias = "Amount", alias = "Bedrag")]
    amount: String,
    #[serde(
        alias = "Currency",
        alias = "Valuta",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    currency: Option<String>,
    #[serde(
        alias = "Description",
        alias = "Omschrijving",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    description: Option<String>,
    #[serde(
        alias = "Merchant",
        alias = "Name",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    merchant: Option<String>,
    #[serde(
        alias = "Source Account",
        alias = "Account",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    source_account: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}
