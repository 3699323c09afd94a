//! Fuzzy rules

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, FisResult};
use crate::fis_ensure;
use super::{FuzzifiedInputs, FuzzyValue, RuleExpression};

/// A rule consequent: `variable IS term`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consequent {
    /// Output variable name
    pub variable: String,
    /// Term name (fuzzy set) clipped by the firing strength
    pub term: String,
}

impl Consequent {
    pub fn new(variable: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            term: term.into(),
        }
    }
}

/// A fuzzy rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Rule name/label
    pub name: Option<String>,
    /// Condition tree
    pub antecedent: RuleExpression,
    /// Conclusions, at least one
    pub consequents: Vec<Consequent>,
    /// Rule weight in [0, 1]
    pub weight: f64,
}

impl Rule {
    /// Rule with a single consequent and weight 1
    pub fn new(antecedent: RuleExpression, variable: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            name: None,
            antecedent,
            consequents: vec![Consequent::new(variable, term)],
            weight: 1.0,
        }
    }

    /// Add another consequent assignment
    pub fn also(mut self, variable: impl Into<String>, term: impl Into<String>) -> Self {
        self.consequents.push(Consequent::new(variable, term));
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Check the parts of a rule that do not depend on any variable
    pub fn validate(&self) -> FisResult<()> {
        fis_ensure!(
            self.weight.is_finite() && (0.0..=1.0).contains(&self.weight),
            ErrorCode::InvalidWeight,
            "Rule '{}' has weight {} outside [0, 1]",
            self.label(),
            self.weight
        );
        fis_ensure!(
            !self.consequents.is_empty(),
            ErrorCode::EmptyConsequent,
            "Rule '{}' has no consequent",
            self.label()
        );
        Ok(())
    }

    /// Firing strength: antecedent degree scaled by weight, clamped to [0, 1]
    pub fn firing_strength(&self, fuzzified: &FuzzifiedInputs) -> FisResult<FuzzyValue> {
        Ok(self.antecedent.evaluate(fuzzified)?.weighted(self.weight))
    }

    /// Name if set, otherwise the rendered rule
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.to_string(),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IF {} THEN ", self.antecedent)?;
        for (i, c) in self.consequents.iter().enumerate() {
            if i > 0 {
                write!(f, " AND ")?;
            }
            write!(f, "{} IS {}", c.variable, c.term)?;
        }
        if self.weight != 1.0 {
            write!(f, " WITH {}", self.weight)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fuzzy::Fuzzified;

    fn inputs(degree: f64) -> FuzzifiedInputs {
        let mut dbr = Fuzzified::new();
        dbr.insert("tinggi".into(), FuzzyValue::new(degree));
        let mut fuzzified = FuzzifiedInputs::new();
        fuzzified.insert("dbr".into(), dbr);
        fuzzified
    }

    #[test]
    fn test_firing_strength_with_weight() {
        let rule = Rule::new(RuleExpression::is("dbr", "tinggi"), "kelayakan", "tidak_layak");
        assert!((rule.firing_strength(&inputs(0.8)).unwrap().value() - 0.8).abs() < 1e-12);

        let rule = rule.with_weight(0.5);
        assert!((rule.firing_strength(&inputs(0.8)).unwrap().value() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_validate() {
        let rule = Rule::new(RuleExpression::is("dbr", "tinggi"), "kelayakan", "tidak_layak");
        assert!(rule.validate().is_ok());

        let err = rule.clone().with_weight(1.5).validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidWeight);

        let err = rule.clone().with_weight(f64::NAN).validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidWeight);

        let mut empty = rule;
        empty.consequents.clear();
        assert_eq!(empty.validate().unwrap_err().code, ErrorCode::EmptyConsequent);
    }

    #[test]
    fn test_display_and_label() {
        let rule = Rule::new(RuleExpression::is("dbr", "tinggi"), "kelayakan", "tidak_layak")
            .also("risiko", "tinggi")
            .with_weight(0.5);
        assert_eq!(
            rule.to_string(),
            "IF dbr IS tinggi THEN kelayakan IS tidak_layak AND risiko IS tinggi WITH 0.5"
        );
        assert_eq!(rule.label(), rule.to_string());
        assert_eq!(rule.with_name("R5").label(), "R5");
    }
}
