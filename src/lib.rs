//! credit-fis - Mamdani fuzzy inference for loan eligibility
//!
//! A small fuzzy inference system plus the knowledge base an employee
//! savings-and-loan cooperative uses to score loan applications.
//!
//! # Architecture
//!
//! - [`fuzzy`] - membership functions, linguistic variables, rule
//!   expressions and the immutable [`InferenceEngine`]
//! - [`credit`] - the loan-eligibility knowledge base, applicant model and
//!   verdicts
//! - [`config`] - TOML configuration with environment overrides
//! - [`error`] - structured errors with codes and exit-code mapping
//!
//! # Features
//!
//! - Triangular membership functions over discretized universes
//! - AND/OR/NOT rule expressions with Zadeh min/max/complement
//! - Min implication, max aggregation, centroid defuzzification
//! - Build-time validation of every variable, term and rule reference
//! - An explicit error when no rule activates, instead of a silent default
//!
//! # Example
//!
//! ```rust,ignore
//! use credit_fis::{build_engine, CrispInputs};
//!
//! let engine = build_engine(1.0)?;
//! let inputs = CrispInputs::new()
//!     .with("status", 8.0)
//!     .with("lama", 10.0)
//!     .with("gaji", 20.0)
//!     .with("jaminan", 8.0)
//!     .with("pinjaman", 10.0)
//!     .with("dbr", 1.4);
//!
//! let outputs = engine.compute(&inputs)?;
//! println!("kelayakan = {:.1}", outputs["kelayakan"]);
//! ```

pub mod config;
pub mod credit;
pub mod error;
pub mod fuzzy;

// Re-export fuzzy inference types
pub use fuzzy::{
    AggregatedDistribution, Consequent, CrispInputs, EngineBuilder, InferenceEngine,
    InferenceReport, LinguisticVariable, MembershipFunction, Outputs, Rule, RuleActivation,
    RuleExpression, Simulation, Universe, VariableRole, FuzzyValue,
};

// Re-export credit domain types
pub use credit::{
    assess, assess_batch, build_engine, ApplicationError, Assessment, Collateral,
    EmploymentStatus, LoanApplication, Tenor, Verdict,
};

// Re-export configuration types
pub use config::{
    AssessmentConfig, ConfigError, EngineConfig, FisConfig, GeneralConfig, LogLevel, OutputFormat,
};

// Re-export error types
pub use error::{ErrorCode, ErrorContext, FisError, FisResult};
