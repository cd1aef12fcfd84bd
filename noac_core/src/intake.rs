//! Linear intake workflow.
//!
//! Steps run in a fixed order:
//! patient metrics → indication → drug selection → co-medication → complete.
//! AF with a mechanical valve or severe mitral stenosis jumps straight to
//! complete, since no drug will be evaluated.

use crate::engine::{assess, Assessment};
use crate::{ClinicalContext, CoMedication, Drug, Error, Indication, PatientMetrics, Result, Sex};

/// Where the intake currently stands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntakeStep {
    PatientMetrics,
    Indication,
    DrugSelection,
    CoMedication,
    Complete,
}

/// Intake state, filled in one step at a time
#[derive(Clone, Debug)]
pub struct Intake {
    step: IntakeStep,
    metrics: Option<PatientMetrics>,
    indication: Option<Indication>,
    valve_disease: bool,
    drug: Option<Drug>,
    co_medication: CoMedication,
}

impl Default for Intake {
    fn default() -> Self {
        Self::new()
    }
}

impl Intake {
    pub fn new() -> Self {
        Self {
            step: IntakeStep::PatientMetrics,
            metrics: None,
            indication: None,
            valve_disease: false,
            drug: None,
            co_medication: CoMedication::default(),
        }
    }

    pub fn step(&self) -> IntakeStep {
        self.step
    }

    pub fn metrics(&self) -> Option<&PatientMetrics> {
        self.metrics.as_ref()
    }

    /// Start over from the first step
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Record biometrics and return the estimated CrCl
    pub fn submit_patient(
        &mut self,
        sex: Sex,
        age_years: f64,
        weight_kg: f64,
        serum_creatinine_mg_dl: f64,
    ) -> Result<f64> {
        self.expect_step(IntakeStep::PatientMetrics)?;

        let metrics = PatientMetrics::new(sex, age_years, weight_kg, serum_creatinine_mg_dl)?;
        let crcl = metrics.crcl();
        tracing::info!(crcl, "Patient metrics recorded");

        self.metrics = Some(metrics);
        self.step = IntakeStep::Indication;
        Ok(crcl)
    }

    /// Record the indication; returns the next step.
    ///
    /// The valve answer only counts for AF.
    pub fn submit_indication(
        &mut self,
        indication: Indication,
        valve_disease: bool,
    ) -> Result<IntakeStep> {
        self.expect_step(IntakeStep::Indication)?;

        self.indication = Some(indication);
        self.valve_disease = indication == Indication::AtrialFibrillation && valve_disease;

        self.step = if self.valve_disease {
            tracing::info!("Valve disease with AF, skipping drug selection");
            IntakeStep::Complete
        } else {
            IntakeStep::DrugSelection
        };
        Ok(self.step)
    }

    pub fn submit_drug(&mut self, drug: Drug) -> Result<()> {
        self.expect_step(IntakeStep::DrugSelection)?;
        self.drug = Some(drug);
        self.step = IntakeStep::CoMedication;
        Ok(())
    }

    pub fn submit_co_medication(&mut self, co_medication: CoMedication) -> Result<()> {
        self.expect_step(IntakeStep::CoMedication)?;
        self.co_medication = co_medication;
        self.step = IntakeStep::Complete;
        Ok(())
    }

    /// Finalized clinical context, once the intake is complete.
    ///
    /// After the valve short-circuit no drug was chosen; the first drug in
    /// the catalog stands in and is never evaluated.
    pub fn context(&self) -> Result<ClinicalContext> {
        self.expect_step(IntakeStep::Complete)?;
        let indication = self
            .indication
            .ok_or_else(|| Error::Intake("indication missing".into()))?;
        let drug = match self.drug {
            Some(drug) => drug,
            None if self.valve_disease => Drug::ALL[0],
            None => return Err(Error::Intake("drug selection missing".into())),
        };

        Ok(ClinicalContext::new(
            indication,
            self.valve_disease,
            drug,
            self.co_medication,
        ))
    }

    /// Run the assessment for a completed intake
    pub fn finish(&self) -> Result<Assessment> {
        let context = self.context()?;
        let metrics = self
            .metrics
            .as_ref()
            .ok_or_else(|| Error::Intake("patient metrics missing".into()))?;
        Ok(assess(metrics, &context))
    }

    fn expect_step(&self, expected: IntakeStep) -> Result<()> {
        if self.step == expected {
            Ok(())
        } else {
            Err(Error::Intake(format!(
                "expected {:?} step, intake is at {:?}",
                expected, self.step
            )))
        }
    }
}
