//! Loan-eligibility knowledge base
//!
//! Six antecedents describe the applicant, one consequent carries the
//! eligibility score. Term names follow the cooperative's own vocabulary.

use crate::error::FisResult;
use crate::fuzzy::{InferenceEngine, LinguisticVariable, Rule, RuleExpression as E};

/// Employment status code
pub const STATUS: &str = "status";
/// Years of service
pub const TENURE: &str = "lama";
/// Monthly income, millions
pub const INCOME: &str = "gaji";
/// Collateral quality code
pub const COLLATERAL: &str = "jaminan";
/// Requested loan, millions
pub const LOAN: &str = "pinjaman";
/// Debt-burden ratio, percent
pub const DBR: &str = "dbr";
/// Eligibility score in [0, 100]
pub const ELIGIBILITY: &str = "kelayakan";

pub const NOT_ELIGIBLE: &str = "tidak_layak";
pub const CONSIDER: &str = "dipertimbangkan";
pub const ELIGIBLE: &str = "layak";

/// Bounds of the eligibility universe
pub const ELIGIBILITY_RANGE: (f64, f64) = (0.0, 100.0);

/// Sampling step of the eligibility universe used when nothing else is configured
pub const DEFAULT_OUTPUT_STEP: f64 = 1.0;

fn antecedents() -> FisResult<Vec<LinguisticVariable>> {
    Ok(vec![
        LinguisticVariable::antecedent(STATUS, 0.0, 10.0, 1.0)?
            .with_term("rendah", 0.0, 0.0, 5.0)?
            .with_term("sedang", 3.0, 5.0, 7.0)?
            .with_term("tinggi", 5.0, 10.0, 10.0)?,
        LinguisticVariable::antecedent(TENURE, 0.0, 10.0, 1.0)?
            .with_term("rendah", 0.0, 0.0, 4.0)?
            .with_term("sedang", 3.0, 5.0, 7.0)?
            .with_term("tinggi", 6.0, 10.0, 10.0)?,
        LinguisticVariable::antecedent(INCOME, 0.0, 20.0, 0.1)?
            .with_term("rendah", 0.0, 3.0, 5.0)?
            .with_term("sedang", 4.0, 7.0, 10.0)?
            .with_term("tinggi", 9.0, 20.0, 20.0)?,
        LinguisticVariable::antecedent(COLLATERAL, 0.0, 10.0, 1.0)?
            .with_term("buruk", 0.0, 0.0, 4.0)?
            .with_term("sedang", 3.0, 5.0, 7.0)?
            .with_term("baik", 6.0, 10.0, 10.0)?,
        LinguisticVariable::antecedent(LOAN, 0.0, 50.0, 1.0)?
            .with_term("rendah", 0.0, 10.0, 20.0)?
            .with_term("sedang", 15.0, 25.0, 35.0)?
            .with_term("tinggi", 30.0, 50.0, 50.0)?,
        LinguisticVariable::antecedent(DBR, 0.0, 100.0, 1.0)?
            .with_term("rendah", 0.0, 20.0, 30.0)?
            .with_term("sedang", 30.0, 40.0, 50.0)?
            .with_term("tinggi", 50.0, 70.0, 100.0)?,
    ])
}

fn eligibility(step: f64) -> FisResult<LinguisticVariable> {
    LinguisticVariable::consequent(ELIGIBILITY, ELIGIBILITY_RANGE.0, ELIGIBILITY_RANGE.1, step)?
        .with_term(NOT_ELIGIBLE, 0.0, 0.0, 50.0)?
        .with_term(CONSIDER, 30.0, 50.0, 70.0)?
        .with_term(ELIGIBLE, 60.0, 100.0, 100.0)
}

/// The nine rules, in the order the credit committee wrote them
pub fn rules() -> Vec<Rule> {
    vec![
        // any single weak signal rejects
        Rule::new(E::is(STATUS, "rendah"), ELIGIBILITY, NOT_ELIGIBLE).with_name("R1 status rendah"),
        Rule::new(E::is(COLLATERAL, "buruk"), ELIGIBILITY, NOT_ELIGIBLE).with_name("R2 jaminan buruk"),
        Rule::new(E::is(TENURE, "rendah"), ELIGIBILITY, NOT_ELIGIBLE).with_name("R3 lama rendah"),
        Rule::new(E::is(INCOME, "rendah"), ELIGIBILITY, NOT_ELIGIBLE).with_name("R4 gaji rendah"),
        Rule::new(E::is(DBR, "tinggi"), ELIGIBILITY, NOT_ELIGIBLE).with_name("R5 dbr tinggi"),
        Rule::new(
            E::is(STATUS, "tinggi")
                & E::is(TENURE, "tinggi")
                & E::is(INCOME, "tinggi")
                & E::is(COLLATERAL, "baik")
                & E::is(LOAN, "rendah"),
            ELIGIBILITY,
            ELIGIBLE,
        )
        .with_name("R6 strong profile, small loan"),
        Rule::new(
            E::is(INCOME, "tinggi") & E::is(COLLATERAL, "baik") & E::is(DBR, "rendah"),
            ELIGIBILITY,
            ELIGIBLE,
        )
        .with_name("R7 high income, good collateral, low dbr"),
        Rule::new(
            (E::is(STATUS, "sedang") | E::is(STATUS, "tinggi"))
                & (E::is(INCOME, "sedang") | E::is(INCOME, "tinggi"))
                & (E::is(COLLATERAL, "sedang") | E::is(COLLATERAL, "baik"))
                & (E::is(DBR, "sedang") | E::is(DBR, "rendah")),
            ELIGIBILITY,
            CONSIDER,
        )
        .with_name("R8 moderate or better, manageable dbr"),
        Rule::new(
            E::is(STATUS, "sedang")
                & E::is(TENURE, "sedang")
                & E::is(INCOME, "sedang")
                & E::is(COLLATERAL, "sedang"),
            ELIGIBILITY,
            CONSIDER,
        )
        .with_name("R9 all moderate"),
    ]
}

/// Build the validated loan-eligibility engine
///
/// `output_step` is the sampling step of the eligibility universe.
pub fn build_engine(output_step: f64) -> FisResult<InferenceEngine> {
    let mut builder = InferenceEngine::builder();
    for var in antecedents()? {
        builder = builder.antecedent(var);
    }
    builder
        .consequent(eligibility(output_step)?)
        .rules(rules())
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::fuzzy::CrispInputs;

    fn inputs(status: f64, lama: f64, gaji: f64, jaminan: f64, pinjaman: f64, dbr: f64) -> CrispInputs {
        CrispInputs::new()
            .with(STATUS, status)
            .with(TENURE, lama)
            .with(INCOME, gaji)
            .with(COLLATERAL, jaminan)
            .with(LOAN, pinjaman)
            .with(DBR, dbr)
    }

    #[test]
    fn test_engine_shape() {
        let engine = build_engine(DEFAULT_OUTPUT_STEP).unwrap();
        assert_eq!(engine.antecedents().len(), 6);
        assert_eq!(engine.consequents().len(), 1);
        assert_eq!(engine.rules().len(), 9);
        assert_eq!(engine.antecedent(INCOME).unwrap().universe().len(), 201);
        assert_eq!(engine.consequent(ELIGIBILITY).unwrap().universe().len(), 101);
    }

    #[test]
    fn test_reject_scenario() {
        // part-time-ish status 8, 3 years, 5.0 income, no collateral, 20 over 6 months
        let dbr = (20.0 / 6.0) / 5.0 * 100.0;
        let engine = build_engine(DEFAULT_OUTPUT_STEP).unwrap();
        let report = engine.run(&inputs(8.0, 3.0, 5.0, 2.0, 20.0, dbr)).unwrap();
        let score = report.output(ELIGIBILITY).unwrap();

        assert!(score < 40.0, "score = {}", score);
        // jaminan buruk and dbr tinggi dominate
        assert!((report.activations[1].strength.value() - 0.5).abs() < 1e-9);
        assert!(report.activations[4].strength.value() > 0.8);
    }

    #[test]
    fn test_approve_scenario() {
        let dbr = (10.0 / 36.0) / 20.0 * 100.0;
        let engine = build_engine(DEFAULT_OUTPUT_STEP).unwrap();
        let report = engine.run(&inputs(8.0, 10.0, 20.0, 8.0, 10.0, dbr)).unwrap();
        let score = report.output(ELIGIBILITY).unwrap();

        assert!(score >= 60.0, "score = {}", score);
        assert!(score > 75.0 && score < 100.0, "score = {}", score);
        // no rejecting rule fires
        assert!(report.activations[..5].iter().all(|a| a.strength.is_zero()));
        assert!((report.activations[5].strength.value() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_all_moderate_is_considered() {
        let engine = build_engine(DEFAULT_OUTPUT_STEP).unwrap();
        let out = engine.compute(&inputs(5.0, 5.0, 7.0, 5.0, 25.0, 40.0)).unwrap();
        assert!((out[ELIGIBILITY] - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_rule_activated() {
        let engine = build_engine(DEFAULT_OUTPUT_STEP).unwrap();
        let err = engine
            .compute(&inputs(20.0, 20.0, 30.0, 20.0, 80.0, 150.0))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NoRuleActivated);
        assert_eq!(err.context_field("variable"), Some(ELIGIBILITY));
    }

    #[test]
    fn test_missing_input_names_variable() {
        let engine = build_engine(DEFAULT_OUTPUT_STEP).unwrap();
        let partial = CrispInputs::new().with(STATUS, 8.0).with(TENURE, 3.0);
        let err = engine.compute(&partial).unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingInput);
        assert_eq!(err.context_field("variable"), Some(INCOME));
    }

    #[test]
    fn test_deterministic_across_sessions() {
        let engine = build_engine(DEFAULT_OUTPUT_STEP).unwrap();
        let x = inputs(5.0, 6.0, 8.3, 6.0, 17.5, 33.3);
        let a = engine.compute(&x).unwrap()[ELIGIBILITY];
        let b = engine.compute(&x).unwrap()[ELIGIBILITY];
        let other = build_engine(DEFAULT_OUTPUT_STEP).unwrap().compute(&x).unwrap()[ELIGIBILITY];
        assert_eq!(a.to_bits(), b.to_bits());
        assert_eq!(a.to_bits(), other.to_bits());
    }

    #[test]
    fn test_finer_output_step() {
        let coarse = build_engine(1.0).unwrap();
        let fine = build_engine(0.1).unwrap();
        let x = inputs(8.0, 10.0, 20.0, 8.0, 10.0, 1.4);
        let a = coarse.compute(&x).unwrap()[ELIGIBILITY];
        let b = fine.compute(&x).unwrap()[ELIGIBILITY];
        assert!((a - b).abs() < 1.0);
        assert!(build_engine(0.0).is_err());
        assert!(build_engine(7.0).is_err());
        assert!(build_engine(1e-300).is_err());
    }
}
