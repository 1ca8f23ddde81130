//! Windowed revenue report.
//!
//! Windows are inclusive calendar-day ranges ending today:
//! current = [today-30, today], prior = [today-60, today-31] with the default
//! 30/30 policy. Window sums and the per-service breakdown count income only;
//! `provider_income` and `client_spending` are all-time totals per side.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

use crate::domain::conversation::Thread;
use crate::domain::foundation::{DomainError, ListingId, Money, ThreadId};
use crate::domain::listing::ServiceListing;

use super::{Candidate, CandidateKind, Ledger, LedgerEntry};

/// Label for revenue that cannot be tied to a listing.
pub const UNKNOWN_SERVICE: &str = "Unknown Service";

/// Tunables for report windows and breakdown size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationPolicy {
    pub current_window_days: u32,
    pub prior_window_days: u32,
    pub top_services: usize,
}

impl Default for ReconciliationPolicy {
    fn default() -> Self {
        Self {
            current_window_days: 30,
            prior_window_days: 30,
            top_services: 5,
        }
    }
}

/// Inclusive calendar-day range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Current and prior comparison windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RevenueWindows {
    pub current: DateWindow,
    pub prior: DateWindow,
}

impl RevenueWindows {
    pub fn ending(today: NaiveDate, policy: &ReconciliationPolicy) -> Self {
        let current_start = today - Duration::days(i64::from(policy.current_window_days));
        let prior_end = current_start - Duration::days(1);
        let prior_start =
            prior_end - Duration::days(i64::from(policy.prior_window_days.saturating_sub(1)));
        Self {
            current: DateWindow {
                start: current_start,
                end: today,
            },
            prior: DateWindow {
                start: prior_start,
                end: prior_end,
            },
        }
    }
}

/// Maps candidates to listings and listings to display labels.
#[derive(Debug, Clone, Default)]
pub struct ServiceDirectory {
    thread_services: HashMap<ThreadId, ListingId>,
    titles: HashMap<ListingId, String>,
}

impl ServiceDirectory {
    /// A listing's own title wins; services the user does not own, or no
    /// longer lists, take the title recorded on their threads.
    pub fn new(threads: &[Thread], listings: &[ServiceListing]) -> Self {
        let mut thread_services = HashMap::new();
        let mut thread_titles: HashMap<ListingId, (&ThreadId, &str)> = HashMap::new();
        for thread in threads {
            let Some(service_id) = &thread.service_id else {
                continue;
            };
            thread_services.insert(thread.id.clone(), service_id.clone());

            let Some(title) = thread.service_title.as_deref().filter(|t| !t.trim().is_empty())
            else {
                continue;
            };
            // Smallest thread id wins so the label does not depend on read order.
            thread_titles
                .entry(service_id.clone())
                .and_modify(|held| {
                    if &thread.id < held.0 {
                        *held = (&thread.id, title);
                    }
                })
                .or_insert((&thread.id, title));
        }

        let mut titles: HashMap<ListingId, String> = thread_titles
            .into_iter()
            .map(|(id, (_, title))| (id, title.to_string()))
            .collect();
        titles.extend(
            listings
                .iter()
                .filter(|l| !l.title.trim().is_empty())
                .map(|l| (l.id.clone(), l.title.clone())),
        );

        Self {
            thread_services,
            titles,
        }
    }

    /// The candidate's listing: its own `service_id`, else the service of
    /// the thread it was posted in.
    pub fn resolve(&self, candidate: &Candidate) -> Option<ListingId> {
        candidate.service_id.clone().or_else(|| {
            candidate
                .conversation_id
                .as_ref()
                .and_then(|thread| self.thread_services.get(thread).cloned())
        })
    }

    /// Known title, else the listing id, else [`UNKNOWN_SERVICE`].
    pub fn label(&self, service_id: Option<&ListingId>) -> String {
        match service_id {
            Some(id) => self
                .titles
                .get(id)
                .cloned()
                .unwrap_or_else(|| id.to_string()),
            None => UNKNOWN_SERVICE.to_string(),
        }
    }
}

/// Revenue attributed to one service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRevenue {
    pub service_id: Option<ListingId>,
    pub label: String,
    pub amount: Money,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueReport {
    pub current_revenue: Money,
    pub previous_revenue: Money,
    /// Percent change from prior to current window, two decimal places.
    pub revenue_change_pct: Decimal,
    pub per_service_breakdown: Vec<ServiceRevenue>,
    pub provider_income: Money,
    pub client_spending: Money,
    /// Deduplicated candidates, including zero-amount ones.
    pub total_transaction_count: usize,
    pub windows: RevenueWindows,
    /// True when current revenue came from all accepted transactions because
    /// the current window was empty.
    pub used_fallback: bool,
    /// Candidate ids whose date could not be read.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub estimated_dates: Vec<String>,
}

/// Builds the report for one ledger as of `today`.
///
/// # Errors
///
/// `InternalError` if a total is out of range.
pub fn reconcile(
    ledger: &Ledger,
    directory: &ServiceDirectory,
    today: NaiveDate,
    policy: &ReconciliationPolicy,
) -> Result<RevenueReport, DomainError> {
    let windows = RevenueWindows::ending(today, policy);

    let in_window = |window: DateWindow| -> Vec<&LedgerEntry> {
        ledger
            .income()
            .filter(|e| window.contains(e.candidate.date.date()))
            .collect()
    };
    let current_entries = in_window(windows.current);
    let prior_entries = in_window(windows.prior);

    let mut current_revenue = sum(&current_entries)?;
    let previous_revenue = sum(&prior_entries)?;

    let accepted_transactions: Vec<&LedgerEntry> = ledger
        .income()
        .filter(|e| e.candidate.kind == CandidateKind::Transaction)
        .collect();
    let used_fallback = current_revenue.is_zero() && !accepted_transactions.is_empty();
    let attributed = if used_fallback {
        current_revenue = sum(&accepted_transactions)?;
        accepted_transactions
    } else {
        current_entries
    };

    Ok(RevenueReport {
        current_revenue,
        previous_revenue,
        revenue_change_pct: change_pct(current_revenue, previous_revenue),
        per_service_breakdown: breakdown(&attributed, directory, policy.top_services)?,
        provider_income: ledger.total_income()?,
        client_spending: ledger.total_spending()?,
        total_transaction_count: ledger.len(),
        windows,
        used_fallback,
        estimated_dates: ledger.estimated_dates(),
    })
}

/// `(current - prior) / prior * 100`; 100 when only current is non-zero and 0
/// when both are zero.
pub fn change_pct(current: Money, prior: Money) -> Decimal {
    if prior.is_zero() {
        return if current.is_positive() {
            Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };
    }
    ((current - prior) / prior.value() * Decimal::ONE_HUNDRED).round_dp(2)
}

fn sum(entries: &[&LedgerEntry]) -> Result<Money, DomainError> {
    Money::try_sum(entries.iter().map(|e| e.candidate.amount))
}

fn breakdown(
    entries: &[&LedgerEntry],
    directory: &ServiceDirectory,
    top: usize,
) -> Result<Vec<ServiceRevenue>, DomainError> {
    let mut order: Vec<Option<ListingId>> = Vec::new();
    let mut buckets: HashMap<Option<ListingId>, (Money, usize)> = HashMap::new();

    for entry in entries {
        if entry.candidate.amount.is_zero() {
            continue;
        }
        let key = directory.resolve(&entry.candidate);
        let bucket = buckets.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            (Money::ZERO, 0)
        });
        bucket.0 = bucket.0.try_add(entry.candidate.amount)?;
        bucket.1 += 1;
    }

    let mut rows: Vec<ServiceRevenue> = order
        .into_iter()
        .filter_map(|key| {
            let (amount, count) = buckets.remove(&key)?;
            Some(ServiceRevenue {
                label: directory.label(key.as_ref()),
                service_id: key,
                amount,
                count,
            })
        })
        .collect();

    rows.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.label.cmp(&b.label)));
    rows.truncate(top);
    Ok(rows)
}
