//! Per-request inference sessions
//!
//! A [`Simulation`] borrows an immutable [`InferenceEngine`], collects one
//! crisp value per antecedent and is consumed by [`Simulation::compute`].
//! Because `compute` takes the session by value, a session can never be fed
//! new inputs after it has produced a result, and no scratch state outlives
//! the request.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{ErrorCode, FisError, FisResult};
use crate::fis_ensure;
use super::{AggregatedDistribution, FuzzifiedInputs, FuzzyValue, InferenceEngine};

/// Crisp output value per consequent variable
pub type Outputs = IndexMap<String, f64>;

/// Crisp input values keyed by antecedent name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CrispInputs(IndexMap<String, f64>);

impl CrispInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, variable: impl Into<String>, value: f64) -> Self {
        self.set(variable, value);
        self
    }

    /// Insert or replace a value, returning the previous one
    pub fn set(&mut self, variable: impl Into<String>, value: f64) -> Option<f64> {
        self.0.insert(variable.into(), value)
    }

    pub fn get(&self, variable: &str) -> Option<f64> {
        self.0.get(variable).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for CrispInputs {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Firing strength of one rule in one session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleActivation {
    /// Position in the rule base
    pub index: usize,
    pub label: String,
    pub strength: FuzzyValue,
}

/// Everything one session computed
#[derive(Debug, Clone, Serialize)]
pub struct InferenceReport {
    pub inputs: CrispInputs,
    pub fuzzified: FuzzifiedInputs,
    pub activations: Vec<RuleActivation>,
    pub distributions: IndexMap<String, AggregatedDistribution>,
    pub outputs: Outputs,
}

impl InferenceReport {
    /// Crisp value of a consequent
    pub fn output(&self, variable: &str) -> Option<f64> {
        self.outputs.get(variable).copied()
    }

    /// Rules with a non-zero firing strength, strongest first
    pub fn fired_rules(&self) -> Vec<&RuleActivation> {
        let mut fired: Vec<&RuleActivation> = self
            .activations
            .iter()
            .filter(|a| !a.strength.is_zero())
            .collect();
        fired.sort_by(|a, b| b.strength.value().total_cmp(&a.strength.value()));
        fired
    }
}

/// Mutable scratch state for one computation
#[derive(Debug)]
pub struct Simulation<'e> {
    engine: &'e InferenceEngine,
    inputs: CrispInputs,
}

impl<'e> Simulation<'e> {
    pub(crate) fn new(engine: &'e InferenceEngine) -> Self {
        Self {
            engine,
            inputs: CrispInputs::new(),
        }
    }

    /// Supply the crisp value of one antecedent
    ///
    /// Unknown variables and non-finite values are rejected immediately.
    /// Supplying the same variable twice keeps the last value.
    pub fn input(&mut self, variable: &str, value: f64) -> FisResult<&mut Self> {
        if self.engine.antecedent(variable).is_none() {
            return Err(FisError::unknown_input(variable));
        }
        fis_ensure!(
            value.is_finite(),
            ErrorCode::NonFiniteInput,
            "Input '{}' is not a finite number: {}",
            variable,
            value
        );
        if let Some(previous) = self.inputs.set(variable, value) {
            debug!(variable, previous, value, "replacing crisp input");
        }
        Ok(self)
    }

    /// Supply several crisp values at once
    pub fn inputs(&mut self, inputs: &CrispInputs) -> FisResult<&mut Self> {
        for (variable, value) in inputs.iter() {
            self.input(variable, value)?;
        }
        Ok(self)
    }

    /// Run fuzzification, rule firing, aggregation and defuzzification
    pub fn compute(self) -> FisResult<InferenceReport> {
        let engine = self.engine;

        let mut fuzzified = FuzzifiedInputs::with_capacity(engine.antecedents().len());
        for var in engine.antecedents() {
            let value = self
                .inputs
                .get(var.name())
                .ok_or_else(|| FisError::missing_input(var.name()))?;
            let degrees = var.fuzzify(value);
            trace!(variable = var.name(), value, ?degrees, "fuzzified");
            fuzzified.insert(var.name().to_string(), degrees);
        }

        let mut distributions: IndexMap<String, AggregatedDistribution> = engine
            .consequents()
            .map(|var| (var.name().to_string(), AggregatedDistribution::empty(var)))
            .collect();

        let mut activations = Vec::with_capacity(engine.rules().len());
        for (index, rule) in engine.rules().iter().enumerate() {
            let strength = rule.firing_strength(&fuzzified)?;
            debug!(rule = index + 1, strength = strength.value(), "rule fired");

            for consequent in &rule.consequents {
                let mf = engine
                    .consequent(&consequent.variable)
                    .and_then(|var| var.term(&consequent.term))
                    .ok_or_else(|| FisError::unknown_term(&consequent.variable, &consequent.term))?;
                let agg = distributions
                    .get_mut(&consequent.variable)
                    .ok_or_else(|| FisError::unknown_variable(&consequent.variable))?;
                agg.absorb(strength, mf);
            }

            activations.push(RuleActivation {
                index,
                label: rule.label(),
                strength,
            });
        }

        let mut outputs = Outputs::with_capacity(distributions.len());
        for (name, agg) in &distributions {
            let crisp = agg.centroid()?;
            debug!(variable = name.as_str(), height = agg.height(), crisp, "defuzzified");
            outputs.insert(name.clone(), crisp);
        }

        Ok(InferenceReport {
            inputs: self.inputs,
            fuzzified,
            activations,
            distributions,
            outputs,
        })
    }
}
