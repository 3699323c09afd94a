//! Mamdani Fuzzy Inference
//!
//! This module provides the approximate-reasoning core:
//! - Fuzzy truth values and the Zadeh operators
//! - Triangular membership functions
//! - Discretized universes of discourse
//! - Linguistic variables
//! - Rule expressions and rules
//! - Max-min inference with centroid defuzzification
//!
//! Everything here except [`Simulation`] is immutable once built, so an
//! [`InferenceEngine`] can be shared across threads and evaluated from many
//! requests at once. Each request gets its own scratch state.

pub mod defuzz;
pub mod engine;
pub mod expression;
pub mod membership;
pub mod rule;
pub mod session;
pub mod universe;
pub mod variable;

pub use defuzz::{centroid, AggregatedDistribution};
pub use engine::{EngineBuilder, InferenceEngine};
pub use expression::RuleExpression;
pub use membership::MembershipFunction;
pub use rule::{Consequent, Rule};
pub use session::{CrispInputs, InferenceReport, Outputs, RuleActivation, Simulation};
pub use universe::Universe;
pub use variable::{Fuzzified, FuzzifiedInputs, LinguisticVariable, VariableRole};

use serde::{Deserialize, Serialize};

/// A fuzzy truth value in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FuzzyValue(f64);

impl FuzzyValue {
    pub const FALSE: FuzzyValue = FuzzyValue(0.0);
    pub const TRUE: FuzzyValue = FuzzyValue(1.0);

    /// Clamp into [0, 1]; NaN maps to 0
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::FALSE;
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Fuzzy NOT (complement)
    pub fn not(&self) -> Self {
        Self::new(1.0 - self.0)
    }

    /// Fuzzy AND (t-norm) - minimum
    pub fn and(&self, other: &Self) -> Self {
        Self::new(self.0.min(other.0))
    }

    /// Fuzzy OR (t-conorm) - maximum
    pub fn or(&self, other: &Self) -> Self {
        Self::new(self.0.max(other.0))
    }

    /// Fuzzy implication (Mamdani: min)
    pub fn implies_mamdani(&self, other: &Self) -> Self {
        self.and(other)
    }

    /// Scale by a rule weight, clamped back into [0, 1]
    pub fn weighted(&self, weight: f64) -> Self {
        Self::new(self.0 * weight)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

impl From<f64> for FuzzyValue {
    fn from(v: f64) -> Self {
        Self::new(v)
    }
}

impl From<bool> for FuzzyValue {
    fn from(b: bool) -> Self {
        if b {
            Self::TRUE
        } else {
            Self::FALSE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuzzy_value_operations() {
        let a = FuzzyValue::new(0.6);
        let b = FuzzyValue::new(0.4);

        assert!((a.and(&b).value() - 0.4).abs() < 1e-12);
        assert!((a.or(&b).value() - 0.6).abs() < 1e-12);
        assert!((a.not().value() - 0.4).abs() < 1e-12);
        assert!((a.implies_mamdani(&b).value() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_clamping() {
        assert_eq!(FuzzyValue::new(1.7).value(), 1.0);
        assert_eq!(FuzzyValue::new(-0.2).value(), 0.0);
        assert_eq!(FuzzyValue::new(f64::NAN).value(), 0.0);
        assert_eq!(FuzzyValue::new(0.8).weighted(2.0).value(), 1.0);
    }

    #[test]
    fn test_and_or_laws() {
        let samples = [0.0, 0.1, 0.35, 0.5, 0.77, 1.0];
        for &x in &samples {
            for &y in &samples {
                for &z in &samples {
                    let (a, b, c) = (FuzzyValue::new(x), FuzzyValue::new(y), FuzzyValue::new(z));
                    assert_eq!(a.and(&b), b.and(&a));
                    assert_eq!(a.or(&b), b.or(&a));
                    assert_eq!(a.and(&b).and(&c), a.and(&b.and(&c)));
                    assert_eq!(a.or(&b).or(&c), a.or(&b.or(&c)));
                }
                assert_eq!(FuzzyValue::new(x).and(&FuzzyValue::new(y)).value(), x.min(y));
                assert_eq!(FuzzyValue::new(x).or(&FuzzyValue::new(y)).value(), x.max(y));
            }
            assert!((FuzzyValue::new(x).not().value() - (1.0 - x)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_from_bool() {
        assert_eq!(FuzzyValue::from(true), FuzzyValue::TRUE);
        assert_eq!(FuzzyValue::from(false), FuzzyValue::FALSE);
    }
}
