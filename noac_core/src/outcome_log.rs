//! Outcome log for completed assessments.
//!
//! Outcomes are appended to a JSONL (JSON Lines) file with file locking so
//! concurrent CLI runs do not interleave records. Recording happens after an
//! assessment is complete and never feeds back into it.

use crate::engine::Assessment;
use crate::{Drug, Indication, PatientMetrics, Result, Sex};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One logged assessment
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct OutcomeRecord {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub sex: Sex,
    pub age_years: f64,
    pub weight_kg: f64,
    pub crcl_ml_min: f64,
    pub indication: Indication,
    /// None when the valve override bypassed drug selection
    pub drug: Option<Drug>,
    pub dose_result: String,
}

impl OutcomeRecord {
    pub fn new(metrics: &PatientMetrics, indication: Indication, assessment: &Assessment) -> Self {
        let drug = match assessment {
            Assessment::Evaluated { drug, .. } => Some(*drug),
            Assessment::VitaminKAntagonistRequired { .. } => None,
        };

        Self {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            sex: metrics.sex(),
            age_years: metrics.age_years(),
            weight_kg: metrics.weight_kg(),
            crcl_ml_min: metrics.crcl(),
            indication,
            drug,
            dose_result: assessment.summary(),
        }
    }
}

/// Destination for outcome records
pub trait OutcomeSink {
    fn append(&mut self, record: &OutcomeRecord) -> Result<()>;
}

/// JSONL-based outcome sink with file locking
pub struct JsonlOutcomeSink {
    path: PathBuf,
}

impl JsonlOutcomeSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl OutcomeSink for JsonlOutcomeSink {
    fn append(&mut self, record: &OutcomeRecord) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(record)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!("Appended outcome {} to {:?}", record.id, self.path);
        Ok(())
    }
}

/// Record an outcome without letting a failure reach the caller.
///
/// Returns whether the record was written.
pub fn record_outcome(sink: &mut dyn OutcomeSink, record: &OutcomeRecord) -> bool {
    match sink.append(record) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Failed to record outcome {}: {}", record.id, e);
            false
        }
    }
}

/// Read all outcome records, skipping lines that do not parse
pub fn read_records(path: &Path) -> Result<Vec<OutcomeRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut records = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<OutcomeRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("Failed to parse outcome at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} outcomes from {:?}", records.len(), path);
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assess;
    use crate::{ClinicalContext, CoMedication, Error};

    fn sample_record(valve: bool) -> OutcomeRecord {
        let metrics = PatientMetrics::new(Sex::Male, 65.0, 70.0, 1.2).unwrap();
        let ctx = ClinicalContext::new(
            Indication::AtrialFibrillation,
            valve,
            Drug::Dabigatran,
            CoMedication::default(),
        );
        OutcomeRecord::new(&metrics, ctx.indication, &assess(&metrics, &ctx))
    }

    struct FailingSink;

    impl OutcomeSink for FailingSink {
        fn append(&mut self, _record: &OutcomeRecord) -> Result<()> {
            Err(Error::Config("datastore unavailable".into()))
        }
    }

    #[test]
    fn test_record_fields() {
        let record = sample_record(false);
        assert_eq!(record.drug, Some(Drug::Dabigatran));
        assert_eq!(record.dose_result, "150 mg twice daily");
        assert_eq!(record.crcl_ml_min, 60.76);

        let valve = sample_record(true);
        assert_eq!(valve.drug, None);
        assert_eq!(valve.dose_result, "Warfarin Recommended (Valve Issue)");
    }

    #[test]
    fn test_append_and_read() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("nested").join("outcomes.jsonl");

        let mut sink = JsonlOutcomeSink::new(&log_path);
        let first = sample_record(false);
        let second = sample_record(true);
        sink.append(&first).unwrap();
        sink.append(&second).unwrap();

        let records = read_records(&log_path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, first.id);
        assert_eq!(records[1].id, second.id);
        assert_eq!(records[1].drug, None);
        assert_eq!(records[0].dose_result, first.dose_result);
    }

    #[test]
    fn test_read_skips_corrupt_lines() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("outcomes.jsonl");

        let mut sink = JsonlOutcomeSink::new(&log_path);
        sink.append(&sample_record(false)).unwrap();
        {
            let mut file = OpenOptions::new().append(true).open(&log_path).unwrap();
            writeln!(file, "{{not json").unwrap();
            writeln!(file).unwrap();
        }
        sink.append(&sample_record(false)).unwrap();

        assert_eq!(read_records(&log_path).unwrap().len(), 2);
    }

    #[test]
    fn test_read_missing_log() {
        let temp_dir = tempfile::tempdir().unwrap();
        let records = read_records(&temp_dir.path().join("missing.jsonl")).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_record_outcome_swallows_failure() {
        assert!(!record_outcome(&mut FailingSink, &sample_record(false)));
    }
}
