use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Day of week used as a grouping key.
///
/// Stored as an ordinal enum so the core stays locale-independent; display
/// names (e.g. the Portuguese abbreviations of the report) are mapped at the
/// presentation boundary only.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// Canonical Monday-first ordering used by every weekday-keyed reduction.
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Zero-based position in the canonical Monday-first week.
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Canonical English name, for serialized payloads and logs.
    pub fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Year + month grouping key, distinct from the raw purchase date.
///
/// Orders chronologically via the derived `Ord` (year first, then month).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct MonthPeriod {
    pub year: i32,
    pub month: u32,
}

impl MonthPeriod {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for MonthPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// One normalized procurement line item.
///
/// `unit_value`, `quantity` and `total_value` are independently nullable:
/// a cell that fails numeric coercion becomes `None` without invalidating
/// the row. `total_value` is a stored field and is never recomputed from
/// `unit_value * quantity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub purchase_date: NaiveDate,
    pub item_name: String,
    pub unit_of_measure: String,
    pub unit_value: Option<f64>,
    pub quantity: Option<f64>,
    pub total_value: Option<f64>,
    pub category: String,
    pub site: String,
    /// Derived: year+month of `purchase_date`.
    pub month_period: MonthPeriod,
    /// Derived: day of week of `purchase_date`.
    pub weekday: Weekday,
    /// Derived: ISO week number of `purchase_date`.
    pub iso_week: u32,
}

impl Record {
    /// Build a record, computing the derived temporal fields once from
    /// `purchase_date`.
    pub fn new(
        purchase_date: NaiveDate,
        item_name: String,
        unit_of_measure: String,
        unit_value: Option<f64>,
        quantity: Option<f64>,
        total_value: Option<f64>,
        category: String,
        site: String,
    ) -> Self {
        Self {
            purchase_date,
            item_name,
            unit_of_measure,
            unit_value,
            quantity,
            total_value,
            category,
            site,
            month_period: MonthPeriod::from_date(purchase_date),
            weekday: Weekday::from(purchase_date.weekday()),
            iso_week: purchase_date.iso_week().week(),
        }
    }
}

/// Immutable ordered collection of records.
///
/// Produced fresh by normalization on every pipeline run; filtering builds a
/// new set and never mutates the source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest purchase date present, or `None` for an empty set.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.purchase_date).min()?;
        let max = self.records.iter().map(|r| r.purchase_date).max()?;
        Some((min, max))
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
