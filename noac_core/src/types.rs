//! Core domain types for NOAC selection and dosing.
//!
//! This module defines the fundamental types used throughout the system:
//! - Patient biometrics and derived renal function
//! - Clinical context (indication, selected drug, co-medication)
//! - Dose verdicts and alternatives

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Enumerations
// ============================================================================

/// Biological sex used by the Cockcroft-Gault estimate
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

/// Indication for anticoagulation
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Indication {
    AtrialFibrillation,
    VenousThromboembolism,
}

/// Non-vitamin-K oral anticoagulants known to the rule set
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Drug {
    Dabigatran,
    Rivaroxaban,
    Edoxaban,
    Apixaban,
}

impl Drug {
    /// Every drug, in the fixed order alternatives are presented
    pub const ALL: [Drug; 4] = [
        Drug::Dabigatran,
        Drug::Rivaroxaban,
        Drug::Edoxaban,
        Drug::Apixaban,
    ];
}

/// Appropriateness classification of a drug for a patient
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DoseStatus {
    Appropriate,
    Warning,
    Contraindicated,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => f.write_str("Male"),
            Sex::Female => f.write_str("Female"),
        }
    }
}

impl fmt::Display for Indication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Indication::AtrialFibrillation => f.write_str("Atrial Fibrillation (AF)"),
            Indication::VenousThromboembolism => f.write_str("Venous Thromboembolism (VTE)"),
        }
    }
}

impl fmt::Display for Drug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(crate::catalog::drug_info(*self).generic_name)
    }
}

impl fmt::Display for DoseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoseStatus::Appropriate => f.write_str("Appropriate"),
            DoseStatus::Warning => f.write_str("Warning"),
            DoseStatus::Contraindicated => f.write_str("Contraindicated"),
        }
    }
}

impl FromStr for Sex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "m" | "male" => Ok(Sex::Male),
            "f" | "female" => Ok(Sex::Female),
            other => Err(Error::InvalidInput(format!("unknown sex: {}", other))),
        }
    }
}

impl FromStr for Indication {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "af" | "atrial_fibrillation" | "atrial-fibrillation" => {
                Ok(Indication::AtrialFibrillation)
            }
            "vte" | "venous_thromboembolism" | "venous-thromboembolism" => {
                Ok(Indication::VenousThromboembolism)
            }
            other => Err(Error::InvalidInput(format!("unknown indication: {}", other))),
        }
    }
}

impl FromStr for Drug {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        crate::catalog::lookup_drug(s)
            .ok_or_else(|| Error::InvalidInput(format!("unknown drug: {}", s.trim())))
    }
}

// ============================================================================
// Patient Metrics
// ============================================================================

/// Patient biometrics with the creatinine clearance derived from them.
///
/// Creatinine clearance is never set directly: it is always produced by
/// [`crate::renal::estimate_crcl`] from the other four fields.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawPatientMetrics")]
pub struct PatientMetrics {
    sex: Sex,
    age_years: f64,
    weight_kg: f64,
    serum_creatinine_mg_dl: f64,
    creatinine_clearance_ml_min: f64,
}

impl PatientMetrics {
    /// Validate biometrics and compute creatinine clearance.
    ///
    /// Age, weight and serum creatinine must be finite and strictly positive;
    /// the estimator is only defined over that domain.
    pub fn new(
        sex: Sex,
        age_years: f64,
        weight_kg: f64,
        serum_creatinine_mg_dl: f64,
    ) -> Result<Self> {
        require_positive("age", age_years)?;
        require_positive("weight", weight_kg)?;
        require_positive("serum creatinine", serum_creatinine_mg_dl)?;

        let creatinine_clearance_ml_min =
            crate::renal::estimate_crcl(sex, age_years, weight_kg, serum_creatinine_mg_dl);

        Ok(Self {
            sex,
            age_years,
            weight_kg,
            serum_creatinine_mg_dl,
            creatinine_clearance_ml_min,
        })
    }

    /// Build metrics with a fixed clearance, for pinning rule boundaries in tests.
    #[cfg(test)]
    pub(crate) fn with_crcl(
        sex: Sex,
        age_years: f64,
        weight_kg: f64,
        serum_creatinine_mg_dl: f64,
        creatinine_clearance_ml_min: f64,
    ) -> Self {
        Self {
            sex,
            age_years,
            weight_kg,
            serum_creatinine_mg_dl,
            creatinine_clearance_ml_min,
        }
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    pub fn age_years(&self) -> f64 {
        self.age_years
    }

    pub fn weight_kg(&self) -> f64 {
        self.weight_kg
    }

    pub fn serum_creatinine_mg_dl(&self) -> f64 {
        self.serum_creatinine_mg_dl
    }

    /// Estimated creatinine clearance in ml/min, rounded to 2 decimals
    pub fn crcl(&self) -> f64 {
        self.creatinine_clearance_ml_min
    }
}

/// Serialized form of [`PatientMetrics`]; any stored clearance is ignored
/// and recomputed on the way in.
#[derive(Deserialize)]
struct RawPatientMetrics {
    sex: Sex,
    age_years: f64,
    weight_kg: f64,
    serum_creatinine_mg_dl: f64,
}

impl TryFrom<RawPatientMetrics> for PatientMetrics {
    type Error = Error;

    fn try_from(raw: RawPatientMetrics) -> Result<Self> {
        PatientMetrics::new(
            raw.sex,
            raw.age_years,
            raw.weight_kg,
            raw.serum_creatinine_mg_dl,
        )
    }
}

fn require_positive(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "{} must be a positive number, got {}",
            field, value
        )))
    }
}

// ============================================================================
// Clinical Context
// ============================================================================

/// Co-medication and administration-route factors
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CoMedication {
    pub strong_pgp_inhibitor: bool,
    pub enteral_tube_feeding: bool,
    pub antiplatelet: bool,
}

/// Clinical context gathered after the patient metrics
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClinicalContext {
    pub indication: Indication,
    /// Mechanical heart valve or severe (rheumatic) mitral stenosis; AF only
    pub has_mechanical_valve_or_severe_mitral_stenosis: bool,
    pub selected_drug: Drug,
    pub co_medication: CoMedication,
}

impl ClinicalContext {
    /// Build a context, discarding the valve flag for VTE
    pub fn new(
        indication: Indication,
        has_mechanical_valve_or_severe_mitral_stenosis: bool,
        selected_drug: Drug,
        co_medication: CoMedication,
    ) -> Self {
        let valve = indication == Indication::AtrialFibrillation
            && has_mechanical_valve_or_severe_mitral_stenosis;

        Self {
            indication,
            has_mechanical_valve_or_severe_mitral_stenosis: valve,
            selected_drug,
            co_medication,
        }
    }

    /// Same context with a different drug selected
    pub fn with_drug(&self, drug: Drug) -> Self {
        Self {
            selected_drug: drug,
            ..self.clone()
        }
    }

    /// True when the valve override bars every NOAC
    pub fn requires_vitamin_k_antagonist(&self) -> bool {
        self.indication == Indication::AtrialFibrillation
            && self.has_mechanical_valve_or_severe_mitral_stenosis
    }
}

// ============================================================================
// Verdicts
// ============================================================================

/// Recommended dose and frequency, or a sentinel
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "label", rename_all = "snake_case")]
pub enum RecommendedDose {
    Regimen(String),
    NotApplicable,
    /// The drug could not be evaluated at all
    Unknown,
}

impl RecommendedDose {
    pub fn regimen(label: impl Into<String>) -> Self {
        RecommendedDose::Regimen(label.into())
    }

    pub fn label(&self) -> &str {
        match self {
            RecommendedDose::Regimen(label) => label,
            RecommendedDose::NotApplicable => "N/A",
            RecommendedDose::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for RecommendedDose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of evaluating one drug for one patient
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DoseVerdict {
    /// Evaluated drug; None when no drug was evaluated
    pub drug: Option<Drug>,
    pub status: DoseStatus,
    pub recommended_dose: RecommendedDose,
    /// Caveats in the order the rules emitted them
    pub advisory_notes: Vec<String>,
    /// Parenteral lead-in guidance, VTE only
    pub initial_treatment_note: Option<String>,
}

/// A drug that evaluated as Appropriate for the same patient and context
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Alternative {
    pub drug: Drug,
    pub status: DoseStatus,
    pub recommended_dose: RecommendedDose,
    pub initial_treatment_note: Option<String>,
}
