// Tenant & Transaction records as served by the property API
//
// The API hands us loosely typed JSON: amounts arrive as strings ("-50.00")
// or numbers, dates as plain dates or full timestamps, and the transaction
// type is free text. Everything is validated here, at the boundary, so the
// rest of the crate only ever sees typed values.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub type TenantId = i64;
pub type TransactionId = i64;

// ============================================================================
// TENANT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    pub unit: String,
}

// ============================================================================
// TRANSACTION KIND
// ============================================================================

/// Classification of a ledger line.
///
/// Matching is case-insensitive; anything that is neither a charge nor a
/// payment is kept as `Other` with its original label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionKind {
    Charge,
    Payment,
    Other(String),
}

impl TransactionKind {
    pub fn parse(raw: &str) -> Self {
        let label = raw.trim();
        if label.eq_ignore_ascii_case("charge") {
            TransactionKind::Charge
        } else if label.eq_ignore_ascii_case("payment") {
            TransactionKind::Payment
        } else {
            TransactionKind::Other(label.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TransactionKind::Charge => "charge",
            TransactionKind::Payment => "payment",
            TransactionKind::Other(label) => label.as_str(),
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// TRANSACTION
// ============================================================================

/// A validated ledger line for one tenant.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: TransactionId,
    pub date: NaiveDate,
    pub description: String,
    pub kind: TransactionKind,
    /// Type label exactly as the API sent it, used for the badge text
    pub type_label: String,
    pub amount: Decimal,
}

impl Transaction {
    /// Badge text: the API label with its first character upper-cased.
    pub fn badge(&self) -> String {
        let mut chars = self.type_label.trim().chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Transaction as it appears on the wire, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTransaction {
    pub id: TransactionId,
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub amount: Value,
}

/// Why a single wire record was rejected.
#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("malformed record: {0}")]
    Malformed(String),

    #[error("amount {0} is not a decimal number")]
    InvalidAmount(String),

    #[error("date {0:?} is not a recognised calendar date")]
    InvalidDate(String),
}

impl TryFrom<RawTransaction> for Transaction {
    type Error = RecordError;

    fn try_from(raw: RawTransaction) -> Result<Self, Self::Error> {
        let amount = parse_amount(&raw.amount)?;
        let date = parse_date(&raw.date)?;
        let kind = TransactionKind::parse(&raw.transaction_type);

        Ok(Transaction {
            id: raw.id,
            date,
            description: raw.description,
            kind,
            type_label: raw.transaction_type,
            amount,
        })
    }
}

impl Transaction {
    /// Validate one JSON value from the transactions endpoint.
    pub fn from_json(value: Value) -> Result<Self, RecordError> {
        let raw: RawTransaction =
            serde_json::from_value(value).map_err(|e| RecordError::Malformed(e.to_string()))?;
        Transaction::try_from(raw)
    }
}

// ============================================================================
// FIELD PARSERS
// ============================================================================

/// Accepts JSON strings ("-50.00", " 12 ") and JSON numbers, including
/// scientific notation. Everything else is rejected.
pub fn parse_amount(value: &Value) -> Result<Decimal, RecordError> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        other => return Err(RecordError::InvalidAmount(other.to_string())),
    };

    if text.is_empty() {
        return Err(RecordError::InvalidAmount(value.to_string()));
    }

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| RecordError::InvalidAmount(value.to_string()))
}

const NAIVE_DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and naive ISO date-times.
///
/// For timestamps with an offset, the calendar date in that offset is used.
pub fn parse_date(raw: &str) -> Result<NaiveDate, RecordError> {
    let text = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.date_naive());
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.date())
        .ok_or_else(|| RecordError::InvalidDate(raw.to_string()))
}
