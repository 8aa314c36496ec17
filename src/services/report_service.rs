use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::database::models::{Client, Court, Payment, ReceiptWithClient};
use crate::database::{ClientStore, CourtStore, PaymentStore, ReceiptStore, Store, StoreError};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{0} total is too large to report")]
    Overflow(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Inclusive date window applied to receipts (by received date) and
/// payments (by creation date)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ReportRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ReportRange {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let day = at.date_naive();
        self.from.map_or(true, |from| day >= from) && self.to.map_or(true, |to| day <= to)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveCount {
    pub total: usize,
    pub active: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotal {
    /// `YYYY-MM`
    pub month: String,
    pub currency: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptReport {
    pub count: usize,
    pub by_status: BTreeMap<String, usize>,
    pub totals: BTreeMap<String, Decimal>,
    pub monthly: Vec<MonthlyTotal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReport {
    pub count: usize,
    pub by_status: BTreeMap<String, usize>,
    pub totals: BTreeMap<String, Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub range: ReportRange,
    pub clients: ActiveCount,
    pub courts: ActiveCount,
    pub receipts: ReceiptReport,
    pub payments: PaymentReport,
}

/// Load the caller's rows and aggregate them
pub async fn summarize(
    store: &dyn Store,
    user_id: i64,
    range: ReportRange,
) -> Result<ReportSummary, ReportError> {
    let clients = store.list_clients(user_id).await?;
    let courts = store.list_courts(user_id).await?;
    let receipts = store.list_receipts(user_id).await?;
    let payments = store.list_payments(user_id).await?;

    tracing::debug!(
        "Summarizing {} receipts and {} payments for user {}",
        receipts.len(),
        payments.len(),
        user_id
    );

    build_summary(&clients, &courts, &receipts, &payments, range)
}

pub fn build_summary(
    clients: &[Client],
    courts: &[Court],
    receipts: &[ReceiptWithClient],
    payments: &[Payment],
    range: ReportRange,
) -> Result<ReportSummary, ReportError> {
    let clients = ActiveCount {
        total: clients.len(),
        active: clients.iter().filter(|c| c.is_active).count(),
    };
    let courts = ActiveCount {
        total: courts.len(),
        active: courts.iter().filter(|c| c.is_active).count(),
    };

    let mut receipt_report = ReceiptReport::default();
    let mut monthly: BTreeMap<(String, String), Decimal> = BTreeMap::new();

    for receipt in receipts.iter().map(|r| &r.receipt) {
        if !range.contains(receipt.received_date) {
            continue;
        }
        receipt_report.count += 1;
        *receipt_report.by_status.entry(receipt.status.clone()).or_default() += 1;
        let total = receipt_report.totals.entry(receipt.currency.clone()).or_default();
        add_to(total, receipt.amount, &receipt.currency)?;

        let month = receipt.received_date.format("%Y-%m").to_string();
        let total = monthly.entry((month, receipt.currency.clone())).or_default();
        add_to(total, receipt.amount, &receipt.currency)?;
    }

    receipt_report.monthly = monthly
        .into_iter()
        .map(|((month, currency), total)| MonthlyTotal { month, currency, total })
        .collect();

    let mut payment_report = PaymentReport::default();
    for payment in payments.iter().filter(|p| range.contains(p.created_at)) {
        payment_report.count += 1;
        *payment_report.by_status.entry(payment.status.clone()).or_default() += 1;
        let total = payment_report.totals.entry(payment.currency.clone()).or_default();
        add_to(total, payment.amount, &payment.currency)?;
    }

    Ok(ReportSummary {
        range,
        clients,
        courts,
        receipts: receipt_report,
        payments: payment_report,
    })
}

fn add_to(total: &mut Decimal, amount: Decimal, currency: &str) -> Result<(), ReportError> {
    *total = total
        .checked_add(amount)
        .ok_or_else(|| ReportError::Overflow(currency.to_string()))?;
    Ok(())
}
