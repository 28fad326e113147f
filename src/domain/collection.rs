use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::CustomerBalance;

/// Customers with a scheduled collection date, bucketed relative to "today".
/// The buckets are disjoint and each preserves the relative order of the
/// input. Fully paid customers (balance <= 0) never appear, regardless of
/// their scheduled date.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionSchedule {
    pub overdue: Vec<CustomerBalance>,
    pub due_today: Vec<CustomerBalance>,
    pub upcoming: Vec<CustomerBalance>,
}

impl CollectionSchedule {
    pub fn is_empty(&self) -> bool {
        self.overdue.is_empty() && self.due_today.is_empty() && self.upcoming.is_empty()
    }

    pub fn len(&self) -> usize {
        self.overdue.len() + self.due_today.len() + self.upcoming.len()
    }
}

/// True when the entry participates in collections at all: it must have a
/// scheduled date and an open (positive) balance.
fn is_collectible(entry: &CustomerBalance) -> bool {
    entry.customer.next_payment_date.is_some() && entry.balance > 0
}

/// Partition customers into overdue / due-today / upcoming buckets.
///
/// `today` is a calendar date; callers normalize to the UTC calendar day
/// before calling so a customer cannot flip buckets with the time of day.
pub fn classify_collections(today: NaiveDate, entries: Vec<CustomerBalance>) -> CollectionSchedule {
    let mut schedule = CollectionSchedule::default();

    for entry in entries {
        let Some(date) = entry.customer.next_payment_date else {
            continue;
        };
        if entry.balance <= 0 {
            continue;
        }

        match date.cmp(&today) {
            std::cmp::Ordering::Less => schedule.overdue.push(entry),
            std::cmp::Ordering::Equal => schedule.due_today.push(entry),
            std::cmp::Ordering::Greater => schedule.upcoming.push(entry),
        }
    }

    schedule
}

/// Exact-date mode: the flat list of customers whose collection date equals
/// `date` and who still owe money. Same predicate as the buckets, no split.
pub fn collections_due_on(date: NaiveDate, entries: Vec<CustomerBalance>) -> Vec<CustomerBalance> {
    entries
        .into_iter()
        .filter(|e| is_collectible(e) && e.customer.next_payment_date == Some(date))
        .collect()
}
