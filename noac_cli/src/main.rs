use clap::{Parser, Subcommand};
use noac_core::catalog::{all_drugs, lookup_drug, STRONG_PGP_INHIBITORS};
use noac_core::outcome_log::record_outcome;
use noac_core::*;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "noac")]
#[command(about = "NOAC selection and dosing decision support", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate creatinine clearance (Cockcroft-Gault)
    Crcl {
        #[command(flatten)]
        patient: PatientArgs,
    },

    /// Evaluate a NOAC for a patient and list safe alternatives
    Assess {
        #[command(flatten)]
        patient: PatientArgs,

        /// Indication (af, vte)
        #[arg(long)]
        indication: Indication,

        /// Mechanical heart valve or severe mitral stenosis (AF only)
        #[arg(long)]
        valve: bool,

        /// Selected drug, generic or brand name
        #[arg(long)]
        drug: Option<String>,

        /// Strong P-gp inhibitor co-medication
        #[arg(long)]
        pgp_inhibitor: bool,

        /// Enteral (NG) tube feeding
        #[arg(long)]
        ng_tube: bool,

        /// Antiplatelet co-medication
        #[arg(long)]
        antiplatelet: bool,

        /// Print the assessment as JSON
        #[arg(long)]
        json: bool,

        /// Do not record the outcome
        #[arg(long)]
        no_log: bool,
    },

    /// Walk through the intake interactively
    Intake {
        /// Do not record the outcome
        #[arg(long)]
        no_log: bool,
    },

    /// List the drugs covered by the dosing rules
    Drugs,

    /// Export the outcome log to CSV
    Export {
        /// CSV destination (defaults to outcomes.csv in the data directory)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct PatientArgs {
    /// Sex (male, female)
    #[arg(long)]
    sex: Sex,

    /// Age in years
    #[arg(long)]
    age: f64,

    /// Weight in kg
    #[arg(long)]
    weight: f64,

    /// Serum creatinine in mg/dL
    #[arg(long)]
    scr: f64,
}

fn main() -> Result<()> {
    noac_core::logging::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data.data_dir.clone());

    match cli.command {
        Commands::Crcl { patient } => cmd_crcl(&patient),
        Commands::Assess {
            patient,
            indication,
            valve,
            drug,
            pgp_inhibitor,
            ng_tube,
            antiplatelet,
            json,
            no_log,
        } => {
            let co_medication = CoMedication {
                strong_pgp_inhibitor: pgp_inhibitor,
                enteral_tube_feeding: ng_tube,
                antiplatelet,
            };
            cmd_assess(
                &patient,
                indication,
                valve,
                drug,
                co_medication,
                json,
                log_target(&config, &data_dir, no_log),
            )
        }
        Commands::Intake { no_log } => cmd_intake(log_target(&config, &data_dir, no_log)),
        Commands::Drugs => {
            cmd_drugs();
            Ok(())
        }
        Commands::Export { output } => {
            let csv_path = output.unwrap_or_else(|| data_dir.join("outcomes.csv"));
            cmd_export(&config.outcome_log_path(&data_dir), &csv_path)
        }
    }
}

/// Outcome log path, unless logging is switched off
fn log_target(config: &Config, data_dir: &Path, no_log: bool) -> Option<PathBuf> {
    if no_log || !config.outcome_log.enabled {
        None
    } else {
        Some(config.outcome_log_path(data_dir))
    }
}

fn cmd_crcl(patient: &PatientArgs) -> Result<()> {
    let metrics = PatientMetrics::new(patient.sex, patient.age, patient.weight, patient.scr)?;
    println!("CrCl: {:.2} ml/min", metrics.crcl());
    Ok(())
}

fn cmd_assess(
    patient: &PatientArgs,
    indication: Indication,
    valve: bool,
    drug: Option<String>,
    co_medication: CoMedication,
    json: bool,
    log_path: Option<PathBuf>,
) -> Result<()> {
    let mut intake = Intake::new();
    intake.submit_patient(patient.sex, patient.age, patient.weight, patient.scr)?;

    if intake.submit_indication(indication, valve)? == IntakeStep::DrugSelection {
        let name = drug.ok_or_else(|| {
            Error::InvalidInput("--drug is required unless the valve override applies".into())
        })?;
        match lookup_drug(&name) {
            Some(drug) => {
                intake.submit_drug(drug)?;
                intake.submit_co_medication(co_medication)?;
            }
            None => {
                return show_unrecognised_drug(&intake, &name, indication, co_medication, json);
            }
        }
    }

    finish_intake(&intake, json, log_path)
}

/// Show the fallback verdict for a drug name outside the catalog.
///
/// Nothing is recorded: no drug was assessed.
fn show_unrecognised_drug(
    intake: &Intake,
    name: &str,
    indication: Indication,
    co_medication: CoMedication,
    json: bool,
) -> Result<()> {
    let metrics = intake
        .metrics()
        .ok_or_else(|| Error::Intake("patient metrics missing".into()))?;
    // The name matched no drug, so the selection here is never consulted
    let context = ClinicalContext::new(indication, false, Drug::ALL[0], co_medication);
    let verdict = evaluate_by_name(name, metrics, &context);

    if json {
        let report = serde_json::json!({
            "crcl_ml_min": metrics.crcl(),
            "drug": name,
            "verdict": &verdict,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        display_verdict(&name.to_uppercase(), metrics, &verdict);
        println!();
    }
    Ok(())
}

fn cmd_intake(log_path: Option<PathBuf>) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut intake = Intake::new();

    println!("Patient metrics");
    loop {
        let sex: Sex = prompt_parsed(&mut input, "  Sex (male/female):")?;
        let age = prompt_number(&mut input, "  Age (years):")?;
        let weight = prompt_number(&mut input, "  Weight (kg):")?;
        let scr = prompt_number(&mut input, "  Serum creatinine (mg/dL):")?;

        match intake.submit_patient(sex, age, weight, scr) {
            Ok(crcl) => {
                println!("  → CrCl: {:.2} ml/min", crcl);
                break;
            }
            Err(e) => println!("  {}", e),
        }
    }

    println!();
    let indication: Indication = prompt_parsed(&mut input, "Indication (af/vte):")?;
    let valve = indication == Indication::AtrialFibrillation
        && prompt_yes_no(
            &mut input,
            "Mechanical heart valve or severe mitral stenosis? (y/n):",
        )?;

    if intake.submit_indication(indication, valve)? == IntakeStep::DrugSelection {
        println!();
        for info in all_drugs() {
            println!("  - {} ({})", info.generic_name, info.brand_name);
        }
        let drug: Drug = prompt_parsed(&mut input, "Drug:")?;
        intake.submit_drug(drug)?;

        println!();
        println!("Strong P-gp inhibitors: {}", STRONG_PGP_INHIBITORS.join(", "));
        let co_medication = CoMedication {
            strong_pgp_inhibitor: prompt_yes_no(&mut input, "Strong P-gp inhibitor? (y/n):")?,
            enteral_tube_feeding: prompt_yes_no(&mut input, "Enteral (NG) tube feeding? (y/n):")?,
            antiplatelet: prompt_yes_no(&mut input, "Antiplatelet co-medication? (y/n):")?,
        };
        intake.submit_co_medication(co_medication)?;
    }

    finish_intake(&intake, false, log_path)
}

/// Assess a completed intake, show it, then record the outcome
fn finish_intake(intake: &Intake, json: bool, log_path: Option<PathBuf>) -> Result<()> {
    let assessment = intake.finish()?;
    let context = intake.context()?;
    let metrics = intake
        .metrics()
        .ok_or_else(|| Error::Intake("patient metrics missing".into()))?;

    if json {
        let report = serde_json::json!({
            "crcl_ml_min": metrics.crcl(),
            "assessment": &assessment,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        display_assessment(metrics, &assessment);
    }

    // Recording must not change or block what was shown
    if let Some(path) = log_path {
        let mut sink = JsonlOutcomeSink::new(path);
        let record = OutcomeRecord::new(metrics, context.indication, &assessment);
        if record_outcome(&mut sink, &record) {
            tracing::info!("Recorded outcome {} to {:?}", record.id, sink.path());
        }
    }

    Ok(())
}

fn cmd_drugs() {
    for info in all_drugs() {
        println!("{:<12} {}", info.generic_name, info.brand_name);
    }
    println!();
    println!("Strong P-gp inhibitors: {}", STRONG_PGP_INHIBITORS.join(", "));
}

fn cmd_export(log_path: &Path, csv_path: &Path) -> Result<()> {
    if !log_path.exists() {
        println!("No outcome log found - nothing to export.");
        return Ok(());
    }

    let count = noac_core::report::export_csv(log_path, csv_path)?;
    println!("✓ Exported {} outcomes to CSV", count);
    println!("  CSV: {}", csv_path.display());
    Ok(())
}

fn display_assessment(metrics: &PatientMetrics, assessment: &Assessment) {
    let header = match assessment {
        Assessment::VitaminKAntagonistRequired { .. } => "NOAC CONTRAINDICATED".to_string(),
        Assessment::Evaluated { drug, .. } => drug.to_string().to_uppercase(),
    };
    display_verdict(&header, metrics, assessment.verdict());

    if let Assessment::Evaluated { alternatives, .. } = assessment {
        println!();
        if alternatives.is_empty() {
            println!("  No safe alternatives.");
        } else {
            println!("  Alternatives:");
            for alt in alternatives {
                println!("    {:<12} {}", alt.drug.to_string(), alt.recommended_dose);
                if let Some(ref note) = alt.initial_treatment_note {
                    println!("    {:<12} *{}", "", note);
                }
            }
        }
    }

    println!();
}

fn display_verdict(header: &str, metrics: &PatientMetrics, verdict: &DoseVerdict) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", header);
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  CrCl: {:.2} ml/min", metrics.crcl());

    println!("  Status: {}", verdict.status);
    println!("  Dose: {}", verdict.recommended_dose);
    for note in &verdict.advisory_notes {
        println!("  → {}", note);
    }
    if let Some(ref note) = verdict.initial_treatment_note {
        println!("  Initial treatment: {}", note);
    }
}

fn prompt<R: BufRead>(input: &mut R, question: &str) -> Result<String> {
    print!("{} ", question);
    io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(Error::Intake("input ended before the intake was complete".into()));
    }
    Ok(line.trim().to_string())
}

fn prompt_parsed<R, T>(input: &mut R, question: &str) -> Result<T>
where
    R: BufRead,
    T: FromStr<Err = Error>,
{
    loop {
        match prompt(input, question)?.parse::<T>() {
            Ok(value) => return Ok(value),
            Err(e) => println!("  {}", e),
        }
    }
}

fn prompt_number<R: BufRead>(input: &mut R, question: &str) -> Result<f64> {
    loop {
        let answer = prompt(input, question)?;
        match answer.parse::<f64>() {
            Ok(value) => return Ok(value),
            Err(_) => println!("  Not a number: {}", answer),
        }
    }
}

fn prompt_yes_no<R: BufRead>(input: &mut R, question: &str) -> Result<bool> {
    loop {
        match prompt(input, question)?.to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => println!("  Please answer y or n"),
        }
    }
}
