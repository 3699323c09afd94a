//! Aggregation and centroid defuzzification

use serde::Serialize;

use crate::error::{FisError, FisResult};
use super::{FuzzyValue, LinguisticVariable, MembershipFunction};

/// Aggregated output distribution of one consequent over its universe
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedDistribution {
    variable: String,
    points: Vec<f64>,
    degrees: Vec<f64>,
}

impl AggregatedDistribution {
    /// All-zero distribution over the variable's universe
    pub fn empty(var: &LinguisticVariable) -> Self {
        let points = var.universe().points().to_vec();
        let degrees = vec![0.0; points.len()];
        Self {
            variable: var.name().to_string(),
            points,
            degrees,
        }
    }

    /// Clip `mf` at `strength` (Mamdani min) and merge by pointwise max
    pub fn absorb(&mut self, strength: FuzzyValue, mf: &MembershipFunction) {
        if strength.is_zero() {
            return;
        }
        for (y, current) in self.points.iter().zip(self.degrees.iter_mut()) {
            let clipped = strength.implies_mamdani(&mf.evaluate(*y));
            *current = current.max(clipped.value());
        }
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn degrees(&self) -> &[f64] {
        &self.degrees
    }

    /// Highest degree anywhere in the distribution
    pub fn height(&self) -> f64 {
        self.degrees.iter().copied().fold(0.0, f64::max)
    }

    /// Centre of gravity, or `NoRuleActivated` when the distribution is empty
    pub fn centroid(&self) -> FisResult<f64> {
        centroid(&self.points, &self.degrees)
            .ok_or_else(|| FisError::no_rule_activated(&self.variable))
    }
}

/// Discrete centre of gravity `sum(y * mu(y)) / sum(mu(y))`
///
/// Returns `None` when the total membership is zero.
pub fn centroid(points: &[f64], degrees: &[f64]) -> Option<f64> {
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (x, m) in points.iter().zip(degrees) {
        numerator += x * m;
        denominator += m;
    }
    if denominator > 0.0 {
        Some(numerator / denominator)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn output() -> LinguisticVariable {
        LinguisticVariable::consequent("kelayakan", 0.0, 100.0, 1.0)
            .and_then(|v| v.with_term("tidak_layak", 0.0, 0.0, 50.0))
            .and_then(|v| v.with_term("dipertimbangkan", 30.0, 50.0, 70.0))
            .and_then(|v| v.with_term("layak", 60.0, 100.0, 100.0))
            .unwrap()
    }

    #[test]
    fn test_symmetric_triangle_centroid_is_apex() {
        let var = output();
        let mut agg = AggregatedDistribution::empty(&var);
        agg.absorb(FuzzyValue::TRUE, var.term("dipertimbangkan").unwrap());
        assert!((agg.centroid().unwrap() - 50.0).abs() < 1e-9);

        // clipping keeps the shape symmetric
        let mut agg = AggregatedDistribution::empty(&var);
        agg.absorb(FuzzyValue::new(0.3), var.term("dipertimbangkan").unwrap());
        assert!((agg.centroid().unwrap() - 50.0).abs() < 1e-9);
        assert!((agg.height() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_clip_is_min() {
        let var = output();
        let mut agg = AggregatedDistribution::empty(&var);
        agg.absorb(FuzzyValue::new(0.5), var.term("layak").unwrap());

        // y = 70 -> mu = 0.25, y = 90 -> mu = 0.75 clipped to 0.5
        assert!((agg.degrees()[70] - 0.25).abs() < 1e-12);
        assert!((agg.degrees()[90] - 0.5).abs() < 1e-12);
        assert_eq!(agg.degrees()[50], 0.0);
    }

    #[test]
    fn test_aggregation_is_pointwise_max_and_idempotent() {
        let var = output();
        let mut agg = AggregatedDistribution::empty(&var);
        agg.absorb(FuzzyValue::new(0.8), var.term("tidak_layak").unwrap());
        agg.absorb(FuzzyValue::new(0.4), var.term("layak").unwrap());
        let once = agg.clone();

        agg.absorb(FuzzyValue::new(0.4), var.term("layak").unwrap());
        assert_eq!(agg, once);

        assert!((agg.degrees()[10] - 0.8).abs() < 1e-12);
        assert!((agg.degrees()[100] - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_zero_strength_contributes_nothing() {
        let var = output();
        let mut agg = AggregatedDistribution::empty(&var);
        agg.absorb(FuzzyValue::FALSE, var.term("layak").unwrap());
        assert!(agg.degrees().iter().all(|d| *d == 0.0));
    }

    #[test]
    fn test_empty_distribution_has_no_centroid() {
        let agg = AggregatedDistribution::empty(&output());
        let err = agg.centroid().unwrap_err();
        assert_eq!(err.code, ErrorCode::NoRuleActivated);
        assert_eq!(err.context_field("variable"), Some("kelayakan"));

        assert_eq!(centroid(&[1.0, 2.0], &[0.0, 0.0]), None);
        assert_eq!(centroid(&[], &[]), None);
    }

    #[test]
    fn test_centroid_weighted_mean() {
        let c = centroid(&[0.0, 10.0, 20.0], &[1.0, 0.0, 1.0]).unwrap();
        assert!((c - 10.0).abs() < 1e-12);
        let c = centroid(&[0.0, 10.0], &[1.0, 3.0]).unwrap();
        assert!((c - 7.5).abs() < 1e-12);
    }
}
