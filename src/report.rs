// Plain-text renderings for the non-interactive subcommands

use crate::ledger::{format_currency, format_date, FormatOptions, Ledger};
use crate::model::Tenant;
use std::fmt::Write;

pub fn tenant_table(tenants: &[Tenant]) -> String {
    if tenants.is_empty() {
        return "No tenants found.\n".to_string();
    }

    let name_width = column_width(tenants.iter().map(|t| t.name.as_str()), "Name");
    let unit_width = column_width(tenants.iter().map(|t| t.unit.as_str()), "Unit");

    let mut out = String::new();
    let _ = writeln!(out, "{:<8} {:<name_width$} {:<unit_width$}", "ID", "Name", "Unit");
    for tenant in tenants {
        let _ = writeln!(
            out,
            "{:<8} {:<name_width$} {:<unit_width$}",
            format!("#{}", tenant.id),
            tenant.name,
            tenant.unit
        );
    }
    out
}

pub fn ledger_report(tenant: &Tenant, ledger: &Ledger) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Ledger for {} (Unit {})", tenant.name, tenant.unit);
    let _ = writeln!(out);

    if ledger.is_empty() {
        out.push_str("No transactions found for this tenant.\n");
        return out;
    }

    let desc_width = column_width(
        ledger.transactions().iter().map(|t| t.description.as_str()),
        "Description",
    );

    let _ = writeln!(
        out,
        "{:<10}  {:<desc_width$}  {:<8}  {:>14}",
        "Date", "Description", "Type", "Amount"
    );
    for tx in ledger.transactions() {
        let _ = writeln!(
            out,
            "{:<10}  {:<desc_width$}  {:<8}  {:>14}",
            format_date(tx.date),
            tx.description,
            tx.badge(),
            format_currency(tx.amount, FormatOptions::default())
        );
    }

    let totals = ledger.totals();
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Total Payments:  {}",
        format_currency(totals.total_payments, FormatOptions::default())
    );
    let _ = writeln!(
        out,
        "Total Charges:   {}",
        format_currency(totals.total_charges, FormatOptions::default())
    );
    let _ = writeln!(
        out,
        "Current Balance: {}",
        format_currency(totals.balance, FormatOptions::signed())
    );
    if totals.unclassified > 0 {
        let _ = writeln!(out, "{}", unclassified_note(totals.unclassified));
    }
    out
}

/// Note shown when some lines were left out of the totals
pub fn unclassified_note(count: usize) -> String {
    if count == 1 {
        "1 transaction with an unrecognized type is not included in the totals.".to_string()
    } else {
        format!(
            "{} transactions with unrecognized types are not included in the totals.",
            count
        )
    }
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>, header: &str) -> usize {
    values
        .map(|v| v.chars().count())
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(header.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Transaction, TransactionKind};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn tenant() -> Tenant {
        Tenant {
            id: 12,
            name: "Dana Whitfield".to_string(),
            unit: "4B".to_string(),
        }
    }

    fn line(id: i64, kind: &str, cents: i64) -> Transaction {
        Transaction {
            id,
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            description: "June".to_string(),
            kind: TransactionKind::parse(kind),
            type_label: kind.to_string(),
            amount: Decimal::new(cents, 2),
        }
    }

    #[test]
    fn test_empty_tenant_table() {
        assert_eq!(tenant_table(&[]), "No tenants found.\n");
    }

    #[test]
    fn test_tenant_table_rows() {
        let table = tenant_table(&[tenant()]);
        assert!(table.starts_with("ID"));
        assert!(table.contains("#12"));
        assert!(table.contains("Dana Whitfield"));
        assert!(table.contains("4B"));
    }

    #[test]
    fn test_ledger_report_totals() {
        let ledger = Ledger::new(vec![line(1, "charge", 123450), line(2, "payment", 50000)]);
        let report = ledger_report(&tenant(), &ledger);

        assert!(report.contains("Ledger for Dana Whitfield (Unit 4B)"));
        assert!(report.contains("6/1/2024"));
        assert!(report.contains("Total Payments:  $500.00"));
        assert!(report.contains("Total Charges:   $1,234.50"));
        assert!(report.contains("Current Balance: -$734.50"));
    }

    #[test]
    fn test_ledger_report_empty() {
        let report = ledger_report(&tenant(), &Ledger::new(Vec::new()));
        assert!(report.contains("No transactions found for this tenant."));
        assert!(!report.contains("Total"));
    }

    #[test]
    fn test_ledger_report_mentions_unclassified() {
        let ledger = Ledger::new(vec![line(1, "refund", 100), line(2, "payment", 100)]);
        let report = ledger_report(&tenant(), &ledger);
        assert!(report.contains("1 transaction with an unrecognized type"));
        assert!(report.contains("Refund"));
    }
}
