#![forbid(unsafe_code)]

//! Clinical decision engine for selecting and dosing NOACs
//! (non-vitamin-K oral anticoagulants).
//!
//! This crate provides:
//! - Domain types (patient metrics, clinical context, dose verdicts)
//! - Renal function estimation
//! - Per-drug dosing rules and alternatives
//! - The linear intake workflow
//! - Outcome logging and CSV export

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod renal;
pub mod engine;
pub mod intake;
pub mod outcome_log;
pub mod report;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use renal::estimate_crcl;
pub use engine::{alternatives, assess, evaluate, evaluate_by_name, Assessment};
pub use intake::{Intake, IntakeStep};
pub use outcome_log::{JsonlOutcomeSink, OutcomeRecord, OutcomeSink};
