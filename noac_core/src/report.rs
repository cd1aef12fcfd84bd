//! CSV export of the outcome log.

use crate::outcome_log::{read_records, OutcomeRecord};
use crate::Result;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: String,
    recorded_at: String,
    sex: String,
    age_years: f64,
    weight_kg: f64,
    crcl_ml_min: f64,
    indication: String,
    drug: Option<String>,
    dose_result: String,
}

impl From<&OutcomeRecord> for CsvRow {
    fn from(record: &OutcomeRecord) -> Self {
        CsvRow {
            id: record.id.to_string(),
            recorded_at: record.recorded_at.to_rfc3339(),
            sex: record.sex.to_string(),
            age_years: record.age_years,
            weight_kg: record.weight_kg,
            crcl_ml_min: record.crcl_ml_min,
            indication: record.indication.to_string(),
            drug: record.drug.map(|d| d.to_string()),
            dose_result: record.dose_result.clone(),
        }
    }
}

/// Export every logged outcome to a CSV file, replacing it.
///
/// Returns the number of rows written. A missing log exports nothing and
/// leaves `csv_path` untouched.
pub fn export_csv(log_path: &Path, csv_path: &Path) -> Result<usize> {
    let records = read_records(log_path)?;

    if records.is_empty() {
        tracing::info!("No outcomes in {:?} to export", log_path);
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(csv_path)?;
    for record in &records {
        writer.serialize(CsvRow::from(record))?;
    }
    writer.flush()?;

    tracing::info!("Exported {} outcomes to {:?}", records.len(), csv_path);
    Ok(records.len())
}
