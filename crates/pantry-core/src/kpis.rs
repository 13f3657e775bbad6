use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::RecordSet;

/// Scalar headline metrics computed over one record set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiSet {
    /// Sum of `total_value` across all records (nulls count as 0).
    pub total_spend: f64,
    /// Number of records in the set.
    pub item_count: usize,
    /// Mean, over the distinct purchase dates present, of each date's spend.
    pub avg_daily_spend: f64,
    /// Spend of the reference month versus the immediately preceding
    /// calendar month, as a percentage.
    pub month_over_month_variance_pct: f64,
    /// Number of distinct housing sites present.
    pub distinct_site_count: usize,
}

/// Stateless collection of the KPI computations.
///
/// Every function is pure and returns neutral values (0, never NaN) for an
/// empty record set.
pub struct KpiCalculator;

impl KpiCalculator {
    /// Compute the full KPI set for `records`, using `as_of` as the
    /// reference date for the month-over-month comparison.
    pub fn compute(records: &RecordSet, as_of: NaiveDate) -> KpiSet {
        KpiSet {
            total_spend: Self::total_spend(records),
            item_count: records.len(),
            avg_daily_spend: Self::avg_daily_spend(records),
            month_over_month_variance_pct: Self::month_over_month_variance_pct(records, as_of),
            distinct_site_count: Self::distinct_site_count(records),
        }
    }

    /// Sum of `total_value`, treating null as 0.
    pub fn total_spend(records: &RecordSet) -> f64 {
        records
            .iter()
            .map(|r| r.total_value.unwrap_or(0.0))
            .sum()
    }

    /// Mean of the per-date spend sums over the distinct purchase dates
    /// present. 0 for an empty set.
    pub fn avg_daily_spend(records: &RecordSet) -> f64 {
        let mut per_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for record in records {
            *per_date.entry(record.purchase_date).or_insert(0.0) +=
                record.total_value.unwrap_or(0.0);
        }

        if per_date.is_empty() {
            return 0.0;
        }
        per_date.values().sum::<f64>() / per_date.len() as f64
    }

    /// Percentage change of the `as_of` month's spend against the preceding
    /// calendar month's spend.
    ///
    /// Months are compared by month-of-year across all years present, and
    /// the arithmetic wraps December→January. A prior month summing to 0
    /// reports a variance of 0 — a documented discontinuity: the first
    /// nonzero month after a zero month shows a 0% baseline rather than an
    /// infinite jump.
    pub fn month_over_month_variance_pct(records: &RecordSet, as_of: NaiveDate) -> f64 {
        let current_month = as_of.month();
        let previous_month = if current_month > 1 {
            current_month - 1
        } else {
            12
        };

        let spend_for_month = |month: u32| -> f64 {
            records
                .iter()
                .filter(|r| r.purchase_date.month() == month)
                .map(|r| r.total_value.unwrap_or(0.0))
                .sum()
        };

        let current = spend_for_month(current_month);
        let previous = spend_for_month(previous_month);

        if previous == 0.0 {
            return 0.0;
        }
        (current - previous) / previous * 100.0
    }

    /// Number of distinct `site` values present.
    pub fn distinct_site_count(records: &RecordSet) -> usize {
        records
            .iter()
            .map(|r| r.site.as_str())
            .collect::<HashSet<_>>()
            .len()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
