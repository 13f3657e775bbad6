//! CSV export of the filtered record set, for downstream consumption.

use std::path::Path;

use pantry_core::error::Result;
use pantry_core::models::RecordSet;

/// Column labels written to the export header, matching the raw table's
/// positional order.
const EXPORT_HEADER: [&str; 8] = [
    "purchase_date",
    "item",
    "unit_of_measure",
    "unit_value",
    "quantity",
    "total_value",
    "category",
    "site",
];

/// Write `records` to `path` as CSV with the eight raw columns.
///
/// Derived fields are not exported; null numeric fields become empty cells.
pub fn write_records_csv(path: &Path, records: &RecordSet) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(EXPORT_HEADER)?;

    for record in records {
        writer.write_record([
            record.purchase_date.to_string(),
            record.item_name.clone(),
            record.unit_of_measure.clone(),
            optional_cell(record.unit_value),
            optional_cell(record.quantity),
            optional_cell(record.total_value),
            record.category.clone(),
            record.site.clone(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn optional_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pantry_core::models::Record;
    use tempfile::TempDir;

    fn make_record(total: Option<f64>) -> Record {
        Record::new(
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            "Rice".to_string(),
            "kg".to_string(),
            Some(10.0),
            Some(2.0),
            total,
            "Food".to_string(),
            "Site A".to_string(),
        )
    }

    #[test]
    fn test_export_writes_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.csv");
        let records = RecordSet::new(vec![make_record(Some(20.0))]);

        write_records_csv(&path, &records).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "purchase_date,item,unit_of_measure,unit_value,quantity,total_value,category,site"
        );
        assert_eq!(lines.next().unwrap(), "2024-01-05,Rice,kg,10,2,20,Food,Site A");
    }

    #[test]
    fn test_export_null_fields_are_empty_cells() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.csv");
        let records = RecordSet::new(vec![make_record(None)]);

        write_records_csv(&path, &records).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let data_line = content.lines().nth(1).unwrap();
        assert_eq!(data_line, "2024-01-05,Rice,kg,10,2,,Food,Site A");
    }

    #[test]
    fn test_export_empty_set_writes_header_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.csv");

        write_records_csv(&path, &RecordSet::default()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
    }
}
