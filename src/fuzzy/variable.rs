//! Linguistic variables

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, FisError, FisResult};
use super::{FuzzyValue, MembershipFunction, Universe};

/// Degrees of every term of one variable for one crisp value
pub type Fuzzified = IndexMap<String, FuzzyValue>;

/// Fuzzified degrees of every antecedent, keyed by variable name
pub type FuzzifiedInputs = IndexMap<String, Fuzzified>;

/// Whether a variable consumes a crisp input or produces an output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableRole {
    Antecedent,
    Consequent,
}

impl VariableRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableRole::Antecedent => "antecedent",
            VariableRole::Consequent => "consequent",
        }
    }
}

/// A linguistic variable with associated fuzzy terms
#[derive(Debug, Clone, Serialize)]
pub struct LinguisticVariable {
    /// Variable name (e.g., "gaji")
    name: String,
    role: VariableRole,
    /// Universe of discourse
    universe: Universe,
    /// Terms in declaration order
    terms: IndexMap<String, MembershipFunction>,
}

impl LinguisticVariable {
    /// Declare an input variable over `[min, max]` sampled every `step`
    pub fn antecedent(name: impl Into<String>, min: f64, max: f64, step: f64) -> FisResult<Self> {
        Self::new(name, VariableRole::Antecedent, min, max, step)
    }

    /// Declare an output variable over `[min, max]` sampled every `step`
    pub fn consequent(name: impl Into<String>, min: f64, max: f64, step: f64) -> FisResult<Self> {
        Self::new(name, VariableRole::Consequent, min, max, step)
    }

    pub fn new(
        name: impl Into<String>,
        role: VariableRole,
        min: f64,
        max: f64,
        step: f64,
    ) -> FisResult<Self> {
        let name = name.into();
        let universe = Universe::for_variable(&name, min, max, step)?;
        Ok(Self {
            name,
            role,
            universe,
            terms: IndexMap::new(),
        })
    }

    /// Add a triangular term, builder style
    pub fn with_term(mut self, term: impl Into<String>, a: f64, b: f64, c: f64) -> FisResult<Self> {
        self.add_term(term, a, b, c)?;
        Ok(self)
    }

    /// Add a triangular term (fuzzy set) to this variable
    pub fn add_term(&mut self, term: impl Into<String>, a: f64, b: f64, c: f64) -> FisResult<()> {
        let term = term.into();
        if self.terms.contains_key(&term) {
            return Err(FisError::new(
                ErrorCode::DuplicateTerm,
                format!("Variable '{}' already has a term '{}'", self.name, term),
            )
            .with_context("variable", self.name.as_str())
            .with_context("term", term.as_str()));
        }
        let mf = MembershipFunction::named(&term, a, b, c)
            .map_err(|e| e.with_context("variable", self.name.as_str()))?;
        self.terms.insert(term, mf);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> VariableRole {
        self.role
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    pub fn term(&self, name: &str) -> Option<&MembershipFunction> {
        self.terms.get(name)
    }

    pub fn has_term(&self, name: &str) -> bool {
        self.terms.contains_key(name)
    }

    pub fn terms(&self) -> impl Iterator<Item = (&str, &MembershipFunction)> {
        self.terms.iter().map(|(name, mf)| (name.as_str(), mf))
    }

    /// Fuzzify a crisp value - get membership for all terms
    ///
    /// Values outside the universe are accepted and simply score low on
    /// every term.
    pub fn fuzzify(&self, value: f64) -> Fuzzified {
        self.terms
            .iter()
            .map(|(name, mf)| (name.clone(), mf.evaluate(value)))
            .collect()
    }

    /// Get the term with highest membership for a value (first wins on ties)
    pub fn dominant_term(&self, value: f64) -> Option<(&str, FuzzyValue)> {
        let mut best: Option<(&str, FuzzyValue)> = None;
        for (name, mf) in &self.terms {
            let degree = mf.evaluate(value);
            match best {
                Some((_, current)) if current >= degree => {}
                _ => best = Some((name.as_str(), degree)),
            }
        }
        best
    }
}
