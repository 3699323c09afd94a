//! Verdicts on loan applications

use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::AssessmentConfig;
use crate::error::{ErrorCode, FisError, FisResult};
use crate::fuzzy::{InferenceEngine, InferenceReport};
use super::applicant::LoanApplication;
use super::knowledge::ELIGIBILITY;

/// Decision band of an eligibility score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Approve,
    Review,
    Reject,
}

impl Verdict {
    /// Band a score with the configured thresholds (both inclusive lower bounds)
    pub fn from_score(score: f64, config: &AssessmentConfig) -> Self {
        if score >= config.approve_threshold {
            Verdict::Approve
        } else if score >= config.review_threshold {
            Verdict::Review
        } else {
            Verdict::Reject
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Approve => "approve",
            Verdict::Review => "review",
            Verdict::Reject => "reject",
        }
    }

    /// Advice shown next to the verdict
    pub fn advice(&self) -> &'static str {
        match self {
            Verdict::Approve => "Low risk profile, the loan can be approved.",
            Verdict::Review => "Needs further consideration: verify details or ask for extra collateral.",
            Verdict::Reject => "Risk profile too high, consider rejecting.",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of assessing one application
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub application: LoanApplication,
    pub installment: f64,
    pub total_installment: f64,
    pub dbr: f64,
    /// DBR above the configured warning threshold
    pub dbr_warning: bool,
    /// `None` when no rule activated and that was mapped to a reject
    pub score: Option<f64>,
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<InferenceReport>,
}

impl Assessment {
    /// Drop the inference trace
    pub fn without_report(mut self) -> Self {
        self.report = None;
        self
    }
}

/// Validate, derive the DBR, run the engine and band the score
pub fn assess(
    engine: &InferenceEngine,
    application: &LoanApplication,
    config: &AssessmentConfig,
) -> FisResult<Assessment> {
    application.validate()?;

    let installment = application.installment();
    let total_installment = application.total_installment();
    let dbr = application.dbr();
    let dbr_warning = dbr > config.dbr_warning_threshold;
    if dbr_warning {
        warn!(dbr, threshold = config.dbr_warning_threshold, "debt-burden ratio above warning threshold");
    }

    let (score, report) = match engine.run(&application.to_crisp_inputs()) {
        Ok(report) => {
            let score = report
                .output(ELIGIBILITY)
                .ok_or_else(|| FisError::unknown_variable(ELIGIBILITY))?;
            (Some(score), Some(report))
        }
        Err(err) if err.code == ErrorCode::NoRuleActivated && config.no_activation_as_reject => {
            warn!("no rule activated, rejecting conservatively");
            (None, None)
        }
        Err(err) => return Err(err),
    };

    let verdict = match score {
        Some(score) => Verdict::from_score(score, config),
        None => Verdict::Reject,
    };
    info!(?score, dbr, verdict = verdict.as_str(), "application assessed");

    Ok(Assessment {
        application: application.clone(),
        installment,
        total_installment,
        dbr,
        dbr_warning,
        score,
        verdict,
        report,
    })
}

/// Assess every application independently; one failure never stops the rest
pub fn assess_batch(
    engine: &InferenceEngine,
    applications: &[LoanApplication],
    config: &AssessmentConfig,
) -> Vec<FisResult<Assessment>> {
    applications
        .iter()
        .map(|application| assess(engine, application, config))
        .collect()
}
