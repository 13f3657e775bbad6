//! Top-level analysis pipeline for the pantry monitor.
//!
//! Orchestrates normalization, filtering, KPI computation and the full
//! aggregation bundle, returning an [`AnalysisResult`] ready for the
//! reporting layer.

use chrono::{NaiveDate, Utc};
use pantry_core::error::Result;
use pantry_core::kpis::{KpiCalculator, KpiSet};
use pantry_core::models::RecordSet;
use serde::{Deserialize, Serialize};

use crate::aggregator::{
    CategorySpend, DailyPoint, ItemPriceRank, ItemQuantityRank, MonthMean, MonthlySpend,
    SiteSpend, SiteStatistics, SpendAggregator, WeekdayMean, WeekdayPivot,
};
use crate::filter::{FilterEngine, FilterSpec};
use crate::normalizer::normalize_with_stats;

// ── Public types ──────────────────────────────────────────────────────────────

/// Parameters for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Inclusive window start; `None` falls back to the earliest purchase
    /// date in the data.
    pub date_from: Option<NaiveDate>,
    /// Inclusive window end; `None` falls back to the latest purchase date.
    pub date_to: Option<NaiveDate>,
    /// Site equality filter (`None` = all sites).
    pub site: Option<String>,
    /// Category equality filter (`None` = all categories).
    pub category: Option<String>,
    /// Reference date for the month-over-month KPI.
    pub as_of: NaiveDate,
    /// Length of the item rankings.
    pub top_n: usize,
}

impl AnalysisOptions {
    /// Unfiltered options over the full data range.
    pub fn new(as_of: NaiveDate) -> Self {
        Self {
            date_from: None,
            date_to: None,
            site: None,
            category: None,
            as_of,
            top_n: 10,
        }
    }
}

/// The complete aggregation bundle: a pure data payload with no rendering
/// concerns, consumable by any presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsPayload {
    pub kpis: KpiSet,
    pub by_category: Vec<CategorySpend>,
    pub by_site: Vec<SiteSpend>,
    pub daily_series: Vec<DailyPoint>,
    pub weekday_pivot: WeekdayPivot,
    pub top_by_quantity: Vec<ItemQuantityRank>,
    pub top_by_unit_price: Vec<ItemPriceRank>,
    pub site_statistics: Vec<SiteStatistics>,
    pub monthly: Vec<MonthlySpend>,
    pub weekday_average: Vec<WeekdayMean>,
    pub seasonality: Vec<MonthMean>,
}

/// Metadata produced alongside the analysis result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    /// Data rows read from the raw table (header excluded).
    pub rows_read: usize,
    /// Rows dropped for an unparsable purchase date.
    pub rows_dropped: usize,
    /// Records remaining after the filters.
    pub rows_after_filter: usize,
    /// Wall-clock seconds spent decoding and normalizing the table.
    pub normalize_time_seconds: f64,
    /// Wall-clock seconds spent on filtering and all reductions.
    pub reduce_time_seconds: f64,
}

/// The complete output of [`analyze_table`].
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// The filtered record set the payload was computed from.
    pub records: RecordSet,
    /// KPIs plus every aggregation.
    pub payload: AnalyticsPayload,
    /// Metadata about this analysis run.
    pub metadata: AnalysisMetadata,
}

// ── Public function ───────────────────────────────────────────────────────────

/// Run the full analysis pipeline over raw table bytes.
///
/// 1. Normalize the table into typed records.
/// 2. Resolve absent window bounds to the data's own date range.
/// 3. Apply the date/site/category filters.
/// 4. Compute the KPI set and every aggregation.
///
/// Recomputes everything from scratch on each call; the record sets involved
/// are immutable snapshots.
pub fn analyze_table(raw: &[u8], options: &AnalysisOptions) -> Result<AnalysisResult> {
    // ── Step 1: Normalize ─────────────────────────────────────────────────────
    let normalize_start = std::time::Instant::now();
    let (all_records, stats) = normalize_with_stats(raw)?;
    let normalize_time = normalize_start.elapsed().as_secs_f64();

    // ── Step 2: Resolve the window ────────────────────────────────────────────
    let reduce_start = std::time::Instant::now();
    let (data_min, data_max) = all_records
        .date_range()
        .unwrap_or((options.as_of, options.as_of));
    let spec = FilterSpec {
        date_from: options.date_from.unwrap_or(data_min),
        date_to: options.date_to.unwrap_or(data_max),
        site: options.site.clone(),
        category: options.category.clone(),
    };

    // ── Step 3: Filter ────────────────────────────────────────────────────────
    let records = FilterEngine::apply(&all_records, &spec)?;

    // ── Step 4: KPIs and aggregations ─────────────────────────────────────────
    let payload = AnalyticsPayload {
        kpis: KpiCalculator::compute(&records, options.as_of),
        by_category: SpendAggregator::by_category(&records),
        by_site: SpendAggregator::by_site(&records),
        daily_series: SpendAggregator::daily_time_series(&records),
        weekday_pivot: SpendAggregator::category_weekday_pivot(&records),
        top_by_quantity: SpendAggregator::top_items_by_quantity(&records, options.top_n),
        top_by_unit_price: SpendAggregator::top_items_by_unit_price(&records, options.top_n),
        site_statistics: SpendAggregator::site_statistics(&records),
        monthly: SpendAggregator::monthly_aggregate(&records),
        weekday_average: SpendAggregator::weekday_average(&records),
        seasonality: SpendAggregator::monthly_seasonality(&records),
    };
    let reduce_time = reduce_start.elapsed().as_secs_f64();

    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        rows_read: stats.rows_read,
        rows_dropped: stats.rows_dropped,
        rows_after_filter: records.len(),
        normalize_time_seconds: normalize_time,
        reduce_time_seconds: reduce_time,
    };

    Ok(AnalysisResult {
        records,
        payload,
        metadata,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
