//! Record filtering: date window plus optional site/category equality.

use chrono::NaiveDate;
use pantry_core::error::{PantryError, Result};
use pantry_core::models::RecordSet;

/// The user-selected filters for one pipeline run.
///
/// `site` and `category` are equality filters; `None` means the dimension is
/// not filtered. The `"all"` sentinel of the configuration surface is mapped
/// to `None` before a spec is built, so it can never collide with a literal
/// data value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    /// Inclusive lower bound on the purchase date.
    pub date_from: NaiveDate,
    /// Inclusive upper bound on the purchase date.
    pub date_to: NaiveDate,
    pub site: Option<String>,
    pub category: Option<String>,
}

impl FilterSpec {
    /// A spec covering `[date_from, date_to]` with no dimension filters.
    pub fn for_window(date_from: NaiveDate, date_to: NaiveDate) -> Self {
        Self {
            date_from,
            date_to,
            site: None,
            category: None,
        }
    }
}

/// Stateless engine producing an immutable filtered view of a record set.
pub struct FilterEngine;

impl FilterEngine {
    /// Apply `spec` to `records`, returning a new set.
    ///
    /// A spec whose `date_from` is after `date_to` is rejected rather than
    /// silently swapped. No matching records is not an error — the result is
    /// simply empty.
    pub fn apply(records: &RecordSet, spec: &FilterSpec) -> Result<RecordSet> {
        if spec.date_from > spec.date_to {
            return Err(PantryError::InvalidDateRange {
                from: spec.date_from,
                to: spec.date_to,
            });
        }

        let filtered = records
            .iter()
            .filter(|r| r.purchase_date >= spec.date_from && r.purchase_date <= spec.date_to)
            .filter(|r| spec.site.as_deref().map_or(true, |s| r.site == s))
            .filter(|r| spec.category.as_deref().map_or(true, |c| r.category == c))
            .cloned()
            .collect();

        Ok(RecordSet::new(filtered))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_core::models::Record;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_record(d: NaiveDate, item: &str, category: &str, site: &str, total: f64) -> Record {
        Record::new(
            d,
            item.to_string(),
            "kg".to_string(),
            Some(1.0),
            Some(1.0),
            Some(total),
            category.to_string(),
            site.to_string(),
        )
    }

    fn sample_set() -> RecordSet {
        RecordSet::new(vec![
            make_record(date(2024, 1, 5), "ItemA", "Food", "S1", 20.0),
            make_record(date(2024, 1, 5), "ItemB", "Drink", "S1", 5.0),
            make_record(date(2024, 2, 10), "ItemA", "Food", "S2", 30.0),
        ])
    }

    // ── date window ───────────────────────────────────────────────────────────

    #[test]
    fn test_filter_date_window_inclusive() {
        let set = sample_set();
        let spec = FilterSpec::for_window(date(2024, 1, 5), date(2024, 1, 5));
        let out = FilterEngine::apply(&set, &spec).unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_filter_full_window_keeps_everything() {
        let set = sample_set();
        let spec = FilterSpec::for_window(date(2024, 1, 1), date(2024, 12, 31));
        let out = FilterEngine::apply(&set, &spec).unwrap();
        assert_eq!(out.len(), set.len());
    }

    #[test]
    fn test_filter_rejects_inverted_window() {
        let set = sample_set();
        let spec = FilterSpec::for_window(date(2024, 2, 1), date(2024, 1, 1));
        assert!(matches!(
            FilterEngine::apply(&set, &spec),
            Err(PantryError::InvalidDateRange { .. })
        ));
    }

    // ── dimension filters ─────────────────────────────────────────────────────

    #[test]
    fn test_filter_by_site() {
        let set = sample_set();
        let spec = FilterSpec {
            site: Some("S1".to_string()),
            ..FilterSpec::for_window(date(2024, 1, 1), date(2024, 12, 31))
        };
        let out = FilterEngine::apply(&set, &spec).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|r| r.site == "S1"));
    }

    #[test]
    fn test_filter_by_category() {
        let set = sample_set();
        let spec = FilterSpec {
            category: Some("Food".to_string()),
            ..FilterSpec::for_window(date(2024, 1, 1), date(2024, 12, 31))
        };
        let out = FilterEngine::apply(&set, &spec).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|r| r.category == "Food"));
    }

    #[test]
    fn test_filter_combined_predicates() {
        let set = sample_set();
        let spec = FilterSpec {
            site: Some("S1".to_string()),
            category: Some("Food".to_string()),
            ..FilterSpec::for_window(date(2024, 1, 1), date(2024, 12, 31))
        };
        let out = FilterEngine::apply(&set, &spec).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.records()[0].item_name, "ItemA");
    }

    #[test]
    fn test_filter_no_match_is_empty_not_error() {
        let set = sample_set();
        let spec = FilterSpec {
            site: Some("S9".to_string()),
            ..FilterSpec::for_window(date(2024, 1, 1), date(2024, 12, 31))
        };
        let out = FilterEngine::apply(&set, &spec).unwrap();
        assert!(out.is_empty());
    }

    // ── immutability and monotonicity ─────────────────────────────────────────

    #[test]
    fn test_filter_does_not_mutate_source() {
        let set = sample_set();
        let before = set.clone();
        let spec = FilterSpec {
            site: Some("S1".to_string()),
            ..FilterSpec::for_window(date(2024, 1, 1), date(2024, 12, 31))
        };
        let _ = FilterEngine::apply(&set, &spec).unwrap();
        assert_eq!(set, before);
    }

    #[test]
    fn test_filter_result_is_subset() {
        let set = sample_set();
        let spec = FilterSpec {
            category: Some("Drink".to_string()),
            ..FilterSpec::for_window(date(2024, 1, 1), date(2024, 12, 31))
        };
        let out = FilterEngine::apply(&set, &spec).unwrap();
        assert!(out.len() <= set.len());
        for record in &out {
            assert!(set.records().contains(record));
        }
    }

    #[test]
    fn test_filter_empty_input_yields_empty() {
        let spec = FilterSpec::for_window(date(2024, 1, 1), date(2024, 12, 31));
        let out = FilterEngine::apply(&RecordSet::default(), &spec).unwrap();
        assert!(out.is_empty());
    }
}
