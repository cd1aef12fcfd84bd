//! Dosing rule evaluator.
//!
//! Evaluation is an ordered cascade where the first matching rule wins:
//!
//! 1. **Global renal floor**: CrCl < 15 ml/min contraindicates every NOAC
//! 2. **Initial treatment**: VTE patients on dabigatran or edoxaban get a
//!    parenteral lead-in note on whatever verdict follows
//! 3. **Per-drug rules**: one handler per drug
//!
//! The mechanical valve / mitral stenosis override sits one level above,
//! in [`assess`], and stops any drug from being evaluated at all.

use crate::{
    Alternative, ClinicalContext, DoseStatus, DoseVerdict, Drug, Indication, PatientMetrics,
    RecommendedDose,
};
use serde::Serialize;

/// Below this clearance no NOAC is dosed
pub const GLOBAL_CRCL_FLOOR: f64 = 15.0;

const DABIGATRAN_CRCL_FLOOR: f64 = 30.0;
const ELDERLY_AGE_YEARS: f64 = 80.0;
const LOW_WEIGHT_KG: f64 = 60.0;
const APIXABAN_SCR_THRESHOLD: f64 = 1.5;

const BRIDGING_NOTE: &str = "LMWH (enoxaparin) or UFH for 5-10 days prior to initiation.";

/// Result of running the full assessment for a completed intake
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Assessment {
    /// AF with a mechanical valve or severe mitral stenosis: no NOAC was evaluated
    VitaminKAntagonistRequired { verdict: DoseVerdict },
    /// The selected drug was evaluated, along with every safe alternative
    Evaluated {
        drug: Drug,
        verdict: DoseVerdict,
        alternatives: Vec<Alternative>,
    },
}

impl Assessment {
    /// The verdict shown as the primary result
    pub fn verdict(&self) -> &DoseVerdict {
        match self {
            Assessment::VitaminKAntagonistRequired { verdict } => verdict,
            Assessment::Evaluated { verdict, .. } => verdict,
        }
    }

    /// Short description of the outcome, as recorded in the outcome log
    pub fn summary(&self) -> String {
        match self {
            Assessment::VitaminKAntagonistRequired { .. } => {
                "Warfarin Recommended (Valve Issue)".to_string()
            }
            Assessment::Evaluated { verdict, .. } => verdict.recommended_dose.label().to_string(),
        }
    }
}

/// Assess a completed intake.
///
/// Applies the valve override before any drug is evaluated, then evaluates
/// the selected drug and derives the alternatives.
pub fn assess(metrics: &PatientMetrics, context: &ClinicalContext) -> Assessment {
    if context.requires_vitamin_k_antagonist() {
        tracing::info!("Valve override: NOACs contraindicated, vitamin K antagonist required");
        return Assessment::VitaminKAntagonistRequired {
            verdict: valve_contraindication(),
        };
    }

    let drug = context.selected_drug;
    let verdict = evaluate(drug, metrics, context);
    let alternatives = alternatives(metrics, context);

    tracing::info!(
        %drug,
        status = %verdict.status,
        dose = %verdict.recommended_dose,
        alternatives = alternatives.len(),
        "Assessment complete"
    );

    Assessment::Evaluated {
        drug,
        verdict,
        alternatives,
    }
}

/// Fixed verdict for AF with a mechanical valve or severe mitral stenosis
pub fn valve_contraindication() -> DoseVerdict {
    DoseVerdict {
        drug: None,
        status: DoseStatus::Contraindicated,
        recommended_dose: RecommendedDose::NotApplicable,
        advisory_notes: vec![
            "NOACs are not recommended with a mechanical heart valve or severe mitral stenosis. \
             Consider warfarin (vitamin K antagonist) instead."
                .to_string(),
        ],
        initial_treatment_note: None,
    }
}

/// Evaluate one drug for a patient.
///
/// Total over every drug and context; never fails. The drug is passed
/// separately so the same context can be reused for every alternative.
pub fn evaluate(drug: Drug, metrics: &PatientMetrics, context: &ClinicalContext) -> DoseVerdict {
    let crcl = metrics.crcl();

    if crcl < GLOBAL_CRCL_FLOOR {
        tracing::debug!(%drug, crcl, "Global CrCl floor");
        return DoseVerdict {
            drug: Some(drug),
            status: DoseStatus::Contraindicated,
            recommended_dose: RecommendedDose::NotApplicable,
            advisory_notes: vec![
                "CrCl < 15 ml/min: NOACs are generally contraindicated. \
                 Consider warfarin (vitamin K antagonist) or clinician discretion."
                    .to_string(),
            ],
            initial_treatment_note: None,
        };
    }

    let initial_treatment_note = match (context.indication, drug) {
        (Indication::VenousThromboembolism, Drug::Dabigatran | Drug::Edoxaban) => {
            Some(BRIDGING_NOTE.to_string())
        }
        _ => None,
    };

    let mut verdict = match drug {
        Drug::Dabigatran => dabigatran(metrics, context),
        Drug::Rivaroxaban => rivaroxaban(metrics, context),
        Drug::Edoxaban => edoxaban(metrics, context),
        Drug::Apixaban => apixaban(metrics, context),
    };
    verdict.initial_treatment_note = initial_treatment_note;

    tracing::debug!(
        %drug,
        crcl,
        status = %verdict.status,
        dose = %verdict.recommended_dose,
        "Evaluated drug"
    );
    verdict
}

/// Evaluate a drug given by name (generic or brand).
///
/// Names outside the catalog get a Warning verdict with an "Unknown" dose
/// rather than an error.
pub fn evaluate_by_name(
    name: &str,
    metrics: &PatientMetrics,
    context: &ClinicalContext,
) -> DoseVerdict {
    match crate::catalog::lookup_drug(name) {
        Some(drug) => evaluate(drug, metrics, context),
        None => {
            tracing::warn!("Unable to evaluate unrecognised drug {:?}", name);
            unable_to_evaluate()
        }
    }
}

fn unable_to_evaluate() -> DoseVerdict {
    DoseVerdict {
        drug: None,
        status: DoseStatus::Warning,
        recommended_dose: RecommendedDose::Unknown,
        advisory_notes: vec!["Unable to evaluate.".to_string()],
        initial_treatment_note: None,
    }
}

/// Every other drug that is Appropriate for the same patient and context,
/// in [`Drug::ALL`] order
pub fn alternatives(metrics: &PatientMetrics, context: &ClinicalContext) -> Vec<Alternative> {
    Drug::ALL
        .iter()
        .copied()
        .filter(|&drug| drug != context.selected_drug)
        .map(|drug| (drug, evaluate(drug, metrics, &context.with_drug(drug))))
        .filter(|(_, verdict)| verdict.status == DoseStatus::Appropriate)
        .map(|(drug, verdict)| Alternative {
            drug,
            status: verdict.status,
            recommended_dose: verdict.recommended_dose,
            initial_treatment_note: verdict.initial_treatment_note,
        })
        .collect()
}

// ============================================================================
// Per-drug rules
// ============================================================================

fn appropriate(drug: Drug, dose: &str) -> DoseVerdict {
    DoseVerdict {
        drug: Some(drug),
        status: DoseStatus::Appropriate,
        recommended_dose: RecommendedDose::regimen(dose),
        advisory_notes: Vec::new(),
        initial_treatment_note: None,
    }
}

fn dabigatran(metrics: &PatientMetrics, context: &ClinicalContext) -> DoseVerdict {
    if metrics.crcl() < DABIGATRAN_CRCL_FLOOR {
        return DoseVerdict {
            drug: Some(Drug::Dabigatran),
            status: DoseStatus::Contraindicated,
            recommended_dose: RecommendedDose::NotApplicable,
            advisory_notes: vec![
                "Dabigatran is not recommended for CrCl < 30 ml/min.".to_string(),
            ],
            initial_treatment_note: None,
        };
    }

    if context.co_medication.enteral_tube_feeding {
        return DoseVerdict {
            drug: Some(Drug::Dabigatran),
            status: DoseStatus::Warning,
            recommended_dose: RecommendedDose::NotApplicable,
            advisory_notes: vec![
                "Dabigatran must not be administered via enteral (NG) tube: \
                 the capsule must not be opened."
                    .to_string(),
            ],
            initial_treatment_note: None,
        };
    }

    let risk_factors = [
        metrics.age_years() >= ELDERLY_AGE_YEARS,
        context.co_medication.strong_pgp_inhibitor,
        context.co_medication.antiplatelet,
    ]
    .iter()
    .filter(|&&present| present)
    .count();

    if risk_factors >= 1 {
        appropriate(Drug::Dabigatran, "110 mg twice daily")
    } else {
        appropriate(Drug::Dabigatran, "150 mg twice daily")
    }
}

fn rivaroxaban(metrics: &PatientMetrics, context: &ClinicalContext) -> DoseVerdict {
    if context.indication == Indication::VenousThromboembolism {
        return appropriate(
            Drug::Rivaroxaban,
            "15 mg twice daily for 21 days, then 20 mg once daily",
        );
    }

    if metrics.crcl() > 50.0 {
        appropriate(Drug::Rivaroxaban, "20 mg once daily")
    } else {
        appropriate(Drug::Rivaroxaban, "15 mg once daily")
    }
}

fn edoxaban(metrics: &PatientMetrics, context: &ClinicalContext) -> DoseVerdict {
    let crcl = metrics.crcl();
    let reduction_factors = [
        metrics.weight_kg() <= LOW_WEIGHT_KG,
        (15.0..=49.0).contains(&crcl),
        context.co_medication.strong_pgp_inhibitor,
    ]
    .iter()
    .filter(|&&present| present)
    .count();

    if reduction_factors >= 1 {
        return appropriate(Drug::Edoxaban, "30 mg once daily");
    }

    if crcl > 50.0 {
        return appropriate(Drug::Edoxaban, "60 mg once daily");
    }

    // CrCl in (49, 50] with no other factor falls between the two bands
    DoseVerdict {
        drug: Some(Drug::Edoxaban),
        status: DoseStatus::Appropriate,
        recommended_dose: RecommendedDose::NotApplicable,
        advisory_notes: vec!["Consider clinician discretion for CrCl 15-50 range.".to_string()],
        initial_treatment_note: None,
    }
}

fn apixaban(metrics: &PatientMetrics, context: &ClinicalContext) -> DoseVerdict {
    if context.indication == Indication::VenousThromboembolism {
        let mut verdict = appropriate(
            Drug::Apixaban,
            "10 mg twice daily for 7 days, then 5 mg twice daily",
        );
        verdict
            .advisory_notes
            .push("No dose reduction needed for VTE if CrCl > 15 ml/min.".to_string());
        return verdict;
    }

    if (15.0..=29.0).contains(&metrics.crcl()) {
        return appropriate(Drug::Apixaban, "2.5 mg twice daily");
    }

    let reduction_factors = [
        metrics.age_years() >= ELDERLY_AGE_YEARS,
        metrics.weight_kg() <= LOW_WEIGHT_KG,
        metrics.serum_creatinine_mg_dl() >= APIXABAN_SCR_THRESHOLD,
    ]
    .iter()
    .filter(|&&present| present)
    .count();

    if reduction_factors >= 2 {
        appropriate(Drug::Apixaban, "2.5 mg twice daily")
    } else {
        appropriate(Drug::Apixaban, "5 mg twice daily")
    }
}
