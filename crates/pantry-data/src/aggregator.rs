//! Group-by reductions, pivots, rankings and time-series projections.
//!
//! Every function here is a pure reduction over a [`RecordSet`]: null
//! numeric fields count as 0 in sums and are excluded from mean
//! denominators, and an empty input yields an empty structure, never an
//! error.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Datelike, NaiveDate};
use pantry_core::models::{MonthPeriod, Record, RecordSet, Weekday};
use serde::{Deserialize, Serialize};

// ── Result rows ───────────────────────────────────────────────────────────────

/// Spend total for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpend {
    pub category: String,
    pub total_spend: f64,
}

/// Spend total for one housing site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteSpend {
    pub site: String,
    pub total_spend: f64,
}

/// One point of the daily spend trend line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub total_spend: f64,
}

/// One row of the category × weekday pivot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotRow {
    pub category: String,
    /// Spend per weekday, aligned with the pivot's `weekdays` column list.
    pub cells: Vec<f64>,
}

/// 2-D spend table: rows are categories, columns the weekdays present.
///
/// Weekdays with no records at all are omitted from the column set entirely
/// rather than zero-filled; a (category, weekday) pair with no records inside
/// the column set is 0.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WeekdayPivot {
    /// Columns, in canonical Monday-first order, restricted to weekdays
    /// present in the data.
    pub weekdays: Vec<Weekday>,
    /// Rows, categories in ascending order.
    pub rows: Vec<PivotRow>,
}

/// Ranking row for the most-purchased items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemQuantityRank {
    pub item: String,
    pub total_quantity: f64,
    pub total_spend: f64,
}

/// Ranking row for the priciest items by mean unit value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemPriceRank {
    pub item: String,
    pub mean_unit_value: f64,
}

/// Per-site summary statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteStatistics {
    pub site: String,
    pub total_spend: f64,
    /// Mean spend per transaction (null totals excluded from the mean).
    pub mean_spend: f64,
    pub transaction_count: usize,
    pub total_quantity: f64,
}

/// Spend total for one year+month period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySpend {
    pub period: MonthPeriod,
    pub total_spend: f64,
}

/// Mean transaction spend for one weekday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayMean {
    pub weekday: Weekday,
    pub mean_spend: f64,
}

/// Mean transaction spend for one calendar month (1–12), across all years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthMean {
    pub month: u32,
    pub mean_spend: f64,
}

// ── SpendAggregator ───────────────────────────────────────────────────────────

/// Stateless helper grouping procurement records along one or two dimensions.
pub struct SpendAggregator;

impl SpendAggregator {
    /// Sum of `total_value` per category, descending by value
    /// (ties broken alphabetically).
    pub fn by_category(records: &RecordSet) -> Vec<CategorySpend> {
        let grouped = Self::sum_by_key(records, |r| r.category.clone());
        let mut out: Vec<CategorySpend> = grouped
            .into_iter()
            .map(|(category, total_spend)| CategorySpend {
                category,
                total_spend,
            })
            .collect();
        out.sort_by(|a, b| b.total_spend.total_cmp(&a.total_spend));
        out
    }

    /// Sum of `total_value` per site, ascending by value
    /// (ties broken alphabetically).
    pub fn by_site(records: &RecordSet) -> Vec<SiteSpend> {
        let grouped = Self::sum_by_key(records, |r| r.site.clone());
        let mut out: Vec<SiteSpend> = grouped
            .into_iter()
            .map(|(site, total_spend)| SiteSpend { site, total_spend })
            .collect();
        out.sort_by(|a, b| a.total_spend.total_cmp(&b.total_spend));
        out
    }

    /// Sum of `total_value` per purchase date, ascending by date.
    ///
    /// One point per distinct date present; missing dates are not gap-filled.
    pub fn daily_time_series(records: &RecordSet) -> Vec<DailyPoint> {
        let mut per_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for record in records {
            *per_date.entry(record.purchase_date).or_insert(0.0) +=
                record.total_value.unwrap_or(0.0);
        }
        per_date
            .into_iter()
            .map(|(date, total_spend)| DailyPoint { date, total_spend })
            .collect()
    }

    /// Category × weekday spend pivot.
    ///
    /// Columns are the canonical Monday..Sunday sequence restricted to the
    /// weekdays actually present; rows are the distinct categories in
    /// ascending order; a cell with no records is 0.
    pub fn category_weekday_pivot(records: &RecordSet) -> WeekdayPivot {
        let mut cells: HashMap<(String, Weekday), f64> = HashMap::new();
        let mut categories: BTreeSet<String> = BTreeSet::new();
        let mut present: BTreeSet<Weekday> = BTreeSet::new();

        for record in records {
            categories.insert(record.category.clone());
            present.insert(record.weekday);
            *cells
                .entry((record.category.clone(), record.weekday))
                .or_insert(0.0) += record.total_value.unwrap_or(0.0);
        }

        let weekdays: Vec<Weekday> = Weekday::ALL
            .into_iter()
            .filter(|d| present.contains(d))
            .collect();

        let rows = categories
            .into_iter()
            .map(|category| {
                let row_cells = weekdays
                    .iter()
                    .map(|d| {
                        cells
                            .get(&(category.clone(), *d))
                            .copied()
                            .unwrap_or(0.0)
                    })
                    .collect();
                PivotRow {
                    category,
                    cells: row_cells,
                }
            })
            .collect();

        WeekdayPivot { weekdays, rows }
    }

    /// Top `n` items by summed quantity, descending.
    ///
    /// Ties keep the order in which the items first appear in the record set
    /// (the sort is stable over first-seen grouping order).
    pub fn top_items_by_quantity(records: &RecordSet, n: usize) -> Vec<ItemQuantityRank> {
        let mut order: Vec<String> = Vec::new();
        let mut totals: HashMap<String, (f64, f64)> = HashMap::new();

        for record in records {
            if !totals.contains_key(&record.item_name) {
                order.push(record.item_name.clone());
            }
            let entry = totals.entry(record.item_name.clone()).or_insert((0.0, 0.0));
            entry.0 += record.quantity.unwrap_or(0.0);
            entry.1 += record.total_value.unwrap_or(0.0);
        }

        let mut ranked: Vec<ItemQuantityRank> = order
            .into_iter()
            .map(|item| {
                let (total_quantity, total_spend) = totals[&item];
                ItemQuantityRank {
                    item,
                    total_quantity,
                    total_spend,
                }
            })
            .collect();
        ranked.sort_by(|a, b| b.total_quantity.total_cmp(&a.total_quantity));
        ranked.truncate(n);
        ranked
    }

    /// Top `n` items by mean unit value, descending.
    ///
    /// Null unit values are excluded from the mean; an item whose unit value
    /// is null on every record has no defined mean and is skipped.
    pub fn top_items_by_unit_price(records: &RecordSet, n: usize) -> Vec<ItemPriceRank> {
        let mut order: Vec<String> = Vec::new();
        let mut sums: HashMap<String, (f64, usize)> = HashMap::new();

        for record in records {
            if !sums.contains_key(&record.item_name) {
                order.push(record.item_name.clone());
            }
            let entry = sums.entry(record.item_name.clone()).or_insert((0.0, 0));
            if let Some(unit) = record.unit_value {
                entry.0 += unit;
                entry.1 += 1;
            }
        }

        let mut ranked: Vec<ItemPriceRank> = order
            .into_iter()
            .filter_map(|item| {
                let (sum, count) = sums[&item];
                if count == 0 {
                    return None;
                }
                Some(ItemPriceRank {
                    item,
                    mean_unit_value: sum / count as f64,
                })
            })
            .collect();
        ranked.sort_by(|a, b| b.mean_unit_value.total_cmp(&a.mean_unit_value));
        ranked.truncate(n);
        ranked
    }

    /// Per-site summary table, descending by total spend
    /// (ties broken alphabetically).
    pub fn site_statistics(records: &RecordSet) -> Vec<SiteStatistics> {
        #[derive(Default)]
        struct Acc {
            spend: f64,
            spend_count: usize,
            transactions: usize,
            quantity: f64,
        }

        let mut per_site: BTreeMap<String, Acc> = BTreeMap::new();
        for record in records {
            let acc = per_site.entry(record.site.clone()).or_default();
            acc.transactions += 1;
            acc.quantity += record.quantity.unwrap_or(0.0);
            if let Some(total) = record.total_value {
                acc.spend += total;
                acc.spend_count += 1;
            }
        }

        let mut out: Vec<SiteStatistics> = per_site
            .into_iter()
            .map(|(site, acc)| SiteStatistics {
                site,
                total_spend: acc.spend,
                mean_spend: if acc.spend_count > 0 {
                    acc.spend / acc.spend_count as f64
                } else {
                    0.0
                },
                transaction_count: acc.transactions,
                total_quantity: acc.quantity,
            })
            .collect();
        out.sort_by(|a, b| b.total_spend.total_cmp(&a.total_spend));
        out
    }

    /// Sum of `total_value` per year+month, in chronological order.
    pub fn monthly_aggregate(records: &RecordSet) -> Vec<MonthlySpend> {
        let mut per_month: BTreeMap<MonthPeriod, f64> = BTreeMap::new();
        for record in records {
            *per_month.entry(record.month_period).or_insert(0.0) +=
                record.total_value.unwrap_or(0.0);
        }
        per_month
            .into_iter()
            .map(|(period, total_spend)| MonthlySpend {
                period,
                total_spend,
            })
            .collect()
    }

    /// Mean transaction spend per weekday, in canonical Monday..Sunday order,
    /// restricted to the weekdays present in the data.
    pub fn weekday_average(records: &RecordSet) -> Vec<WeekdayMean> {
        let mut sums: BTreeMap<Weekday, (f64, usize)> = BTreeMap::new();
        for record in records {
            let entry = sums.entry(record.weekday).or_insert((0.0, 0));
            if let Some(total) = record.total_value {
                entry.0 += total;
                entry.1 += 1;
            }
        }

        Weekday::ALL
            .into_iter()
            .filter_map(|weekday| {
                let (sum, count) = sums.get(&weekday)?;
                Some(WeekdayMean {
                    weekday,
                    mean_spend: if *count > 0 { sum / *count as f64 } else { 0.0 },
                })
            })
            .collect()
    }

    /// Mean transaction spend per calendar month (1–12) across all years
    /// present, in January..December order, restricted to the months present.
    pub fn monthly_seasonality(records: &RecordSet) -> Vec<MonthMean> {
        let mut sums: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
        for record in records {
            let entry = sums.entry(record.purchase_date.month()).or_insert((0.0, 0));
            if let Some(total) = record.total_value {
                entry.0 += total;
                entry.1 += 1;
            }
        }

        sums.into_iter()
            .map(|(month, (sum, count))| MonthMean {
                month,
                mean_spend: if count > 0 { sum / count as f64 } else { 0.0 },
            })
            .collect()
    }

    // ── Private ───────────────────────────────────────────────────────────────

    /// Generic single-dimension spend summation.
    ///
    /// Uses a BTreeMap so equal-valued groups fall back to key order after
    /// the caller's value sort.
    fn sum_by_key(
        records: &RecordSet,
        key_fn: impl Fn(&Record) -> String,
    ) -> BTreeMap<String, f64> {
        let mut map: BTreeMap<String, f64> = BTreeMap::new();
        for record in records {
            *map.entry(key_fn(record)).or_insert(0.0) += record.total_value.unwrap_or(0.0);
        }
        map
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
