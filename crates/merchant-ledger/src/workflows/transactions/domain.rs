use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::fmt;

pub const DEFAULT_CURRENCY: &str = "EUR";

/// Signed monetary amount with two decimal places, held as cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Amount(i64);

impl Amount {
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(self) -> i64 {
        self.0
    }

    /// Parses bank-export notation: `-12.50`, `12,50`, `1.234,56`, `1,234.56`, `+3`.
    ///
    /// The right-most `.` or `,` is the decimal separator when at most two
    /// digits follow it; every other separator is a thousands separator.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        if unsigned.is_empty() || !unsigned.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
            return None;
        }

        let (whole, fraction) = match unsigned.rfind(['.', ',']) {
            Some(index) if unsigned.len() - index - 1 <= 2 => {
                (&unsigned[..index], &unsigned[index + 1..])
            }
            _ => (unsigned, ""),
        };

        let whole_digits: String = whole.chars().filter(char::is_ascii_digit).collect();
        if whole_digits.is_empty() && fraction.is_empty() {
            return None;
        }

        let whole_value = if whole_digits.is_empty() {
            0
        } else {
            whole_digits.parse::<i64>().ok()?
        };
        let fraction_value = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().ok()? * 10,
            _ => fraction.parse::<i64>().ok()?,
        };

        let cents = whole_value.checked_mul(100)?.checked_add(fraction_value)?;
        Some(Self(if negative { -cents } else { cents }))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, cents / 100, cents % 100)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A bank transaction ready for storage, raw merchant text kept alongside its
/// canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    pub date: NaiveDate,
    pub amount: Amount,
    pub currency: String,
    pub description: Option<String>,
    pub merchant: Option<String>,
    pub normalized_merchant: String,
    pub source_account: Option<String>,
}

impl TransactionRecord {
    /// `None` for undescribed rows, which are never treated as duplicates.
    pub fn dedup_key(&self) -> Option<DedupKey> {
        let description = self.description.clone()?;
        Some(DedupKey {
            date: self.date,
            amount: self.amount,
            description,
        })
    }
}

/// Natural identity of a described transaction across repeated imports.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub date: NaiveDate,
    pub amount: Amount,
    pub description: String,
}
