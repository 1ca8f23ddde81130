//! Calendar heatmap over ledger entries, bucketed by exact UTC date.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::foundation::{DomainError, Money};

use super::Ledger;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapDay {
    pub date: NaiveDate,
    pub income: Money,
    pub spending: Money,
    pub count: usize,
}

impl HeatmapDay {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            income: Money::ZERO,
            spending: Money::ZERO,
            count: 0,
        }
    }
}

/// Days with at least one entry, oldest first.
pub fn heatmap(ledger: &Ledger) -> Result<Vec<HeatmapDay>, DomainError> {
    let mut days: BTreeMap<NaiveDate, HeatmapDay> = BTreeMap::new();
    for entry in ledger.entries() {
        let date = entry.candidate.date.date();
        let day = days.entry(date).or_insert_with(|| HeatmapDay::empty(date));
        if entry.is_income() {
            day.income = day.income.try_add(entry.candidate.amount)?;
        } else {
            day.spending = day.spending.try_add(entry.candidate.amount)?;
        }
        day.count += 1;
    }
    Ok(days.into_values().collect())
}
