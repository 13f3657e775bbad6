use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

// ── DateProcessor ─────────────────────────────────────────────────────────────

/// Parses purchase dates from the variety of formats found in spreadsheet
/// exports.
pub struct DateProcessor;

impl DateProcessor {
    /// Attempt to parse a raw cell into a calendar date.
    ///
    /// Handles ISO 8601 dates and datetimes plus the day-first and
    /// month-first slash conventions; datetime values contribute only their
    /// date component. Returns `None` for anything unrecognised — the caller
    /// decides whether that drops the row.
    pub fn parse(cell: &str) -> Option<NaiveDate> {
        let s = cell.trim();
        if s.is_empty() {
            return None;
        }

        const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y"];
        const DATETIME_FORMATS: &[&str] = &[
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S",
            "%d/%m/%Y %H:%M:%S",
            "%m/%d/%Y %H:%M:%S",
        ];

        for fmt in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
                return Some(date);
            }
        }

        for fmt in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(dt.date());
            }
        }

        debug!("DateProcessor: could not parse date cell \"{}\"", s);
        None
    }
}

// ── NumericProcessor ──────────────────────────────────────────────────────────

/// Coerces raw numeric cells with error tolerance: a cell that cannot be
/// parsed becomes `None` rather than failing the row.
pub struct NumericProcessor;

impl NumericProcessor {
    /// Parse a raw cell into a decimal value.
    ///
    /// Strips a leading `R$` currency marker and interior spaces, then
    /// accepts plain decimals as well as both digit-grouping conventions
    /// (`1.234,56` and `1,234.56`). Empty or unparsable cells yield `None`.
    pub fn parse(cell: &str) -> Option<f64> {
        let mut s = cell.trim();
        if s.is_empty() {
            return None;
        }

        if let Some(stripped) = s.strip_prefix("R$") {
            s = stripped.trim_start();
        }

        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return None;
        }

        if let Ok(v) = compact.parse::<f64>() {
            return Some(v);
        }

        let normalised = Self::normalise_separators(&compact);
        match normalised.parse::<f64>() {
            Ok(v) => Some(v),
            Err(_) => {
                debug!("NumericProcessor: could not parse numeric cell \"{}\"", cell);
                None
            }
        }
    }

    /// Rewrite locale digit grouping into the `.`-decimal form `f64::parse`
    /// accepts. The rightmost of `,`/`.` is taken as the decimal separator;
    /// the other character is treated as grouping and removed.
    fn normalise_separators(s: &str) -> String {
        let last_comma = s.rfind(',');
        let last_dot = s.rfind('.');

        match (last_comma, last_dot) {
            (Some(c), Some(d)) if c > d => {
                // "1.234,56" — dot groups, comma is the decimal point.
                s.replace('.', "").replace(',', ".")
            }
            (Some(_), Some(_)) => {
                // "1,234.56" — comma groups, dot already decimal.
                s.replace(',', "")
            }
            (Some(_), None) => {
                // "1234,56" — lone comma as decimal point.
                s.replace(',', ".")
            }
            _ => s.to_string(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
