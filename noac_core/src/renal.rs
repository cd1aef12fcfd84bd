//! Renal function estimation (Cockcroft-Gault).

use crate::Sex;

const FEMALE_MULTIPLIER: f64 = 0.85;

/// Estimate creatinine clearance in ml/min.
///
/// `((140 - age) * weight) / (72 * scr)`, times 0.85 for women, rounded to
/// two decimals with halves going away from zero.
///
/// Inputs must be positive; [`crate::PatientMetrics::new`] enforces that before
/// calling here. Results are not clamped, so extreme ages give zero or
/// negative clearances.
pub fn estimate_crcl(
    sex: Sex,
    age_years: f64,
    weight_kg: f64,
    serum_creatinine_mg_dl: f64,
) -> f64 {
    let mut crcl = ((140.0 - age_years) * weight_kg) / (72.0 * serum_creatinine_mg_dl);
    if sex == Sex::Female {
        crcl *= FEMALE_MULTIPLIER;
    }

    let rounded = round_to_hundredths(crcl);
    tracing::debug!(
        ?sex,
        age_years,
        weight_kg,
        serum_creatinine_mg_dl,
        crcl = rounded,
        "Estimated CrCl"
    );
    rounded
}

/// Round half away from zero at the second decimal
fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
