// Ledger aggregation and money formatting
//
// Totals are a pure function of the transaction list. `Ledger` bundles the
// two so a list can never be displayed next to totals computed from some
// other list.

use crate::model::{Transaction, TransactionKind};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

// ============================================================================
// TOTALS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedgerTotals {
    /// Sum of absolute charge amounts, never negative
    pub total_charges: Decimal,
    /// Signed sum of payment amounts
    pub total_payments: Decimal,
    /// `total_payments - total_charges`
    pub balance: Decimal,
    /// Transactions excluded from both sums because their type is unrecognized
    pub unclassified: usize,
}

/// Reduce a transaction list to its charge/payment totals.
///
/// Charges contribute their absolute value, payments their signed value,
/// and any other type is skipped (but counted in `unclassified`). Sums that
/// leave the `Decimal` range saturate; use [`try_aggregate`] to detect that.
pub fn aggregate(transactions: &[Transaction]) -> LedgerTotals {
    let mut charges = Decimal::ZERO;
    let mut payments = Decimal::ZERO;
    let mut unclassified = 0;

    for tx in transactions {
        match tx.kind {
            TransactionKind::Charge => charges = charges.saturating_add(tx.amount.abs()),
            TransactionKind::Payment => payments = payments.saturating_add(tx.amount),
            TransactionKind::Other(_) => unclassified += 1,
        }
    }

    LedgerTotals {
        total_charges: charges,
        total_payments: payments,
        balance: payments.saturating_sub(charges),
        unclassified,
    }
}

/// Totals that do not fit in a `Decimal`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("ledger totals exceed the supported range")]
pub struct TotalsOverflow;

/// Same as [`aggregate`], but fails instead of saturating.
pub fn try_aggregate(transactions: &[Transaction]) -> Result<LedgerTotals, TotalsOverflow> {
    let mut charges = Decimal::ZERO;
    let mut payments = Decimal::ZERO;
    let mut unclassified = 0;

    for tx in transactions {
        match tx.kind {
            TransactionKind::Charge => {
                charges = charges.checked_add(tx.amount.abs()).ok_or(TotalsOverflow)?
            }
            TransactionKind::Payment => {
                payments = payments.checked_add(tx.amount).ok_or(TotalsOverflow)?
            }
            TransactionKind::Other(_) => unclassified += 1,
        }
    }

    Ok(LedgerTotals {
        total_charges: charges,
        total_payments: payments,
        balance: payments.checked_sub(charges).ok_or(TotalsOverflow)?,
        unclassified,
    })
}

// ============================================================================
// LEDGER
// ============================================================================

/// A tenant's transactions together with the totals derived from them.
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    transactions: Vec<Transaction>,
    totals: LedgerTotals,
}

impl Ledger {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        let totals = aggregate(&transactions);
        Self {
            transactions,
            totals,
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn totals(&self) -> &LedgerTotals {
        &self.totals
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }
}

// ============================================================================
// FORMATTING
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatOptions {
    /// Prefix `-` when the value is negative
    pub show_sign: bool,
}

impl FormatOptions {
    pub fn signed() -> Self {
        Self { show_sign: true }
    }
}

/// Format as US dollars: magnitude only, cents precision, comma grouping.
///
/// ```
/// use rust_decimal::Decimal;
/// use tenant_ledger::ledger::{format_currency, FormatOptions};
///
/// let amount = Decimal::new(-12345, 1);
/// assert_eq!(format_currency(amount, FormatOptions::default()), "$1,234.50");
/// assert_eq!(format_currency(amount, FormatOptions::signed()), "-$1,234.50");
/// ```
pub fn format_currency(amount: Decimal, options: FormatOptions) -> String {
    let mut magnitude = amount
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    magnitude.rescale(2);

    let text = magnitude.to_string();
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let formatted = format!("${}.{}", group_thousands(whole), cents);
    if options.show_sign && amount.is_sign_negative() && !magnitude.is_zero() {
        format!("-{}", formatted)
    } else {
        formatted
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// US short date, e.g. `1/15/2024`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

/// Colour family for a money value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Negative values (warning colour)
    Negative,
    /// Zero and positive values (success colour)
    Positive,
}

pub fn amount_tone(amount: Decimal) -> Tone {
    if amount.is_sign_negative() && !amount.is_zero() {
        Tone::Negative
    } else {
        Tone::Positive
    }
}
