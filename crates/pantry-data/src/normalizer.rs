//! Raw-table decoding for the pantry monitor.
//!
//! Turns the fetched byte stream into a typed [`RecordSet`], applying the
//! tolerant cell coercion rules and computing the derived temporal fields
//! once per row.

use pantry_core::coercion::{DateProcessor, NumericProcessor};
use pantry_core::error::{PantryError, Result};
use pantry_core::models::{Record, RecordSet};
use tracing::{debug, warn};

/// Number of positional columns the raw table must carry, in the fixed order
/// `[purchase_date, item, unit_of_measure, unit_value, quantity, total_value,
/// category, site]`.
pub const TABLE_COLUMNS: usize = 8;

/// Row-level counters for one normalization run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    /// Data rows read from the table (header excluded).
    pub rows_read: usize,
    /// Rows dropped because their purchase date failed to parse.
    pub rows_dropped: usize,
}

/// Parse raw table bytes into a normalized [`RecordSet`].
///
/// The first row is treated as a header; its content is ignored, only column
/// position matters. A row whose column count differs from
/// [`TABLE_COLUMNS`] fails the whole run with a schema error — there is no
/// partial normalization. Rows whose purchase date cannot be parsed are
/// dropped; numeric cells that cannot be parsed become null fields.
///
/// Duplicate rows are preserved and an empty table yields an empty set.
pub fn normalize(raw: &[u8]) -> Result<RecordSet> {
    normalize_with_stats(raw).map(|(records, _)| records)
}

/// Same as [`normalize`], also returning the row-level counters.
pub fn normalize_with_stats(raw: &[u8]) -> Result<(RecordSet, NormalizeStats)> {
    // A fully empty byte stream has no header row to validate.
    if raw.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok((RecordSet::default(), NormalizeStats::default()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(raw);

    let header_len = reader.headers()?.len();
    if header_len != TABLE_COLUMNS {
        return Err(PantryError::Schema {
            row: 0,
            expected: TABLE_COLUMNS,
            found: header_len,
        });
    }

    let mut records = Vec::new();
    let mut stats = NormalizeStats::default();

    for (index, row) in reader.records().enumerate() {
        let row = row?;
        // Row numbering counts the header as row 0.
        let row_number = index + 1;

        if row.len() != TABLE_COLUMNS {
            return Err(PantryError::Schema {
                row: row_number,
                expected: TABLE_COLUMNS,
                found: row.len(),
            });
        }

        stats.rows_read += 1;

        let Some(purchase_date) = DateProcessor::parse(&row[0]) else {
            warn!(
                "dropping row {}: unparsable purchase date \"{}\"",
                row_number, &row[0]
            );
            stats.rows_dropped += 1;
            continue;
        };

        records.push(Record::new(
            purchase_date,
            row[1].trim().to_string(),
            row[2].trim().to_string(),
            NumericProcessor::parse(&row[3]),
            NumericProcessor::parse(&row[4]),
            NumericProcessor::parse(&row[5]),
            row[6].trim().to_string(),
            row[7].trim().to_string(),
        ));
    }

    debug!(
        "normalized {} rows ({} read, {} dropped)",
        records.len(),
        stats.rows_read,
        stats.rows_dropped,
    );

    Ok((RecordSet::new(records), stats))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
