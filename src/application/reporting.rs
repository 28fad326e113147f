use chrono::{DateTime, Datelike, Days, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Cents, CustomerBalance, Transaction, TransactionKind, total_receivable};

/// Dashboard figures: this week's movement plus the outstanding credit.
/// The week starts on Sunday, matching how shop owners count "the week".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub week_start: DateTime<Utc>,
    pub weekly_sales: Cents,
    pub weekly_payments: Cents,
    /// Share of this week's sales already covered by payments, in percent.
    /// Capped at 999 so a payment-heavy week doesn't print absurd numbers.
    pub coverage_pct: f64,
    pub total_receivable: Cents,
    pub customer_count: usize,
    /// Customers with a strictly positive balance.
    pub debtor_count: usize,
}

/// Start of the current week (Sunday, midnight UTC).
pub fn start_of_week(now: DateTime<Utc>) -> DateTime<Utc> {
    let days_from_sunday = now.weekday().num_days_from_sunday();
    now.date_naive()
        .checked_sub_days(Days::new(days_from_sunday as u64))
        .expect("week start is representable")
        .and_hms_opt(0, 0, 0)
        .expect("midnight is valid")
        .and_utc()
}

/// Build the dashboard from already-loaded data. Pure: safe to recompute on
/// any thread, no I/O.
pub fn build_dashboard_stats(
    entries: &[CustomerBalance],
    transactions: &[Transaction],
    now: DateTime<Utc>,
) -> DashboardStats {
    let week_start = start_of_week(now);

    let mut weekly_sales: Cents = 0;
    let mut weekly_payments: Cents = 0;
    for tx in transactions {
        if tx.created_at >= week_start {
            match tx.kind {
                TransactionKind::Sale => weekly_sales += tx.amount_cents,
                TransactionKind::Payment => weekly_payments += tx.amount_cents,
            }
        }
    }

    let coverage_pct = if weekly_sales > 0 {
        (weekly_payments as f64 / weekly_sales as f64 * 100.0).min(999.0)
    } else {
        0.0
    };

    DashboardStats {
        week_start,
        weekly_sales,
        weekly_payments,
        coverage_pct,
        total_receivable: total_receivable(entries),
        customer_count: entries.len(),
        debtor_count: entries.iter().filter(|e| e.balance > 0).count(),
    }
}
