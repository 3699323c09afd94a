//! Immutable Mamdani inference engine
//!
//! An engine is assembled once with [`EngineBuilder`], which checks that every
//! rule only mentions declared variables and terms in the right role. After
//! that the engine is read-only and `Send + Sync`; share it by reference or
//! behind an `Arc` and open one [`Simulation`] per request.

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{ErrorCode, FisError, FisResult};
use super::{CrispInputs, InferenceReport, LinguisticVariable, Outputs, Rule, Simulation, VariableRole};

/// Fuzzy inference system: variables plus an ordered rule base
#[derive(Debug, Clone)]
pub struct InferenceEngine {
    antecedents: IndexMap<String, LinguisticVariable>,
    consequents: IndexMap<String, LinguisticVariable>,
    rules: Vec<Rule>,
}

impl InferenceEngine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn antecedents(&self) -> impl ExactSizeIterator<Item = &LinguisticVariable> {
        self.antecedents.values()
    }

    pub fn consequents(&self) -> impl ExactSizeIterator<Item = &LinguisticVariable> {
        self.consequents.values()
    }

    pub fn antecedent(&self, name: &str) -> Option<&LinguisticVariable> {
        self.antecedents.get(name)
    }

    pub fn consequent(&self, name: &str) -> Option<&LinguisticVariable> {
        self.consequents.get(name)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Open a fresh session
    pub fn simulation(&self) -> Simulation<'_> {
        Simulation::new(self)
    }

    /// Evaluate one set of crisp inputs and keep every intermediate result
    pub fn run(&self, inputs: &CrispInputs) -> FisResult<InferenceReport> {
        let mut sim = self.simulation();
        sim.inputs(inputs)?;
        sim.compute()
    }

    /// Evaluate one set of crisp inputs into one crisp value per consequent
    pub fn compute(&self, inputs: &CrispInputs) -> FisResult<Outputs> {
        self.run(inputs).map(|report| report.outputs)
    }
}

/// Collects variables and rules, validated by [`build`](EngineBuilder::build)
#[derive(Debug, Default)]
pub struct EngineBuilder {
    variables: Vec<(Option<VariableRole>, LinguisticVariable)>,
    rules: Vec<Rule>,
}

impl EngineBuilder {
    /// Declare a variable; its role decides whether it is an input or output
    pub fn variable(mut self, var: LinguisticVariable) -> Self {
        self.variables.push((None, var));
        self
    }

    /// Declare an input; `build` fails if `var` is not an antecedent
    pub fn antecedent(mut self, var: LinguisticVariable) -> Self {
        self.variables.push((Some(VariableRole::Antecedent), var));
        self
    }

    /// Declare an output; `build` fails if `var` is not a consequent
    pub fn consequent(mut self, var: LinguisticVariable) -> Self {
        self.variables.push((Some(VariableRole::Consequent), var));
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn build(self) -> FisResult<InferenceEngine> {
        let mut antecedents = IndexMap::new();
        let mut consequents = IndexMap::new();

        for (expected, var) in self.variables {
            let name = var.name().to_string();
            if let Some(expected) = expected {
                if var.role() != expected {
                    return Err(FisError::new(
                        ErrorCode::RoleMismatch,
                        format!(
                            "Variable '{}' is a {} but was declared as a {}",
                            name,
                            var.role().as_str(),
                            expected.as_str()
                        ),
                    )
                    .with_context("variable", name));
                }
            }
            if antecedents.contains_key(&name) || consequents.contains_key(&name) {
                return Err(FisError::new(
                    ErrorCode::DuplicateVariable,
                    format!("Variable '{}' is declared more than once", name),
                )
                .with_context("variable", name));
            }
            match var.role() {
                VariableRole::Antecedent => antecedents.insert(name, var),
                VariableRole::Consequent => consequents.insert(name, var),
            };
        }

        if self.rules.is_empty() {
            return Err(FisError::new(ErrorCode::EmptyRuleBase, "Rule base has no rules"));
        }

        let engine = InferenceEngine {
            antecedents,
            consequents,
            rules: self.rules,
        };

        for (index, rule) in engine.rules.iter().enumerate() {
            engine
                .check_rule(rule)
                .map_err(|e| e.with_context("rule", (index + 1).to_string()))?;
        }

        debug!(
            antecedents = engine.antecedents.len(),
            consequents = engine.consequents.len(),
            rules = engine.rules.len(),
            "inference engine built"
        );
        Ok(engine)
    }
}

impl InferenceEngine {
    fn check_rule(&self, rule: &Rule) -> FisResult<()> {
        rule.validate()?;

        for (variable, term) in rule.antecedent.references() {
            let var = self.lookup(variable, VariableRole::Antecedent)?;
            if !var.has_term(term) {
                return Err(FisError::unknown_term(variable, term));
            }
        }

        for consequent in &rule.consequents {
            let var = self.lookup(&consequent.variable, VariableRole::Consequent)?;
            if !var.has_term(&consequent.term) {
                return Err(FisError::unknown_term(&consequent.variable, &consequent.term));
            }
        }

        Ok(())
    }

    fn lookup(&self, name: &str, role: VariableRole) -> FisResult<&LinguisticVariable> {
        let (wanted, other) = match role {
            VariableRole::Antecedent => (&self.antecedents, &self.consequents),
            VariableRole::Consequent => (&self.consequents, &self.antecedents),
        };
        if let Some(var) = wanted.get(name) {
            return Ok(var);
        }
        if other.contains_key(name) {
            return Err(FisError::new(
                ErrorCode::RoleMismatch,
                format!("Variable '{}' cannot be used as {}", name, role.as_str()),
            )
            .with_context("variable", name));
        }
        Err(FisError::unknown_variable(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fuzzy::RuleExpression;

    fn quality() -> LinguisticVariable {
        LinguisticVariable::antecedent("quality", 0.0, 10.0, 1.0)
            .and_then(|v| v.with_term("bad", 0.0, 0.0, 5.0))
            .and_then(|v| v.with_term("fine", 0.0, 5.0, 10.0))
            .and_then(|v| v.with_term("great", 5.0, 10.0, 10.0))
            .unwrap()
    }

    fn score() -> LinguisticVariable {
        LinguisticVariable::consequent("score", 0.0, 100.0, 1.0)
            .and_then(|v| v.with_term("low", 0.0, 0.0, 50.0))
            .and_then(|v| v.with_term("mid", 25.0, 50.0, 75.0))
            .and_then(|v| v.with_term("high", 50.0, 100.0, 100.0))
            .unwrap()
    }

    fn builder() -> EngineBuilder {
        InferenceEngine::builder().variable(quality()).variable(score())
    }

    fn engine(rules: Vec<Rule>) -> InferenceEngine {
        builder().rules(rules).build().unwrap()
    }

    #[test]
    fn test_single_symmetric_rule_returns_apex() {
        let engine = engine(vec![Rule::new(RuleExpression::is("quality", "fine"), "score", "mid")]);
        let out = engine.compute(&CrispInputs::new().with("quality", 5.0)).unwrap();
        assert!((out["score"] - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_rule_is_idempotent() {
        let rules = vec![
            Rule::new(RuleExpression::is("quality", "bad"), "score", "low"),
            Rule::new(RuleExpression::is("quality", "fine"), "score", "mid"),
            Rule::new(RuleExpression::is("quality", "great"), "score", "high"),
        ];
        let mut doubled = rules.clone();
        doubled.push(rules[1].clone());
        doubled.push(rules[2].clone());

        let inputs = CrispInputs::new().with("quality", 6.5);
        let single = engine(rules).run(&inputs).unwrap();
        let double = engine(doubled).run(&inputs).unwrap();

        assert_eq!(single.distributions["score"], double.distributions["score"]);
        assert_eq!(single.outputs["score"], double.outputs["score"]);
    }

    #[test]
    fn test_no_rule_activated() {
        let engine = engine(vec![Rule::new(RuleExpression::is("quality", "great"), "score", "high")]);
        let err = engine.compute(&CrispInputs::new().with("quality", 2.0)).unwrap_err();
        assert_eq!(err.code, ErrorCode::NoRuleActivated);
    }

    #[test]
    fn test_weight_scales_strength() {
        let engine = engine(vec![
            Rule::new(RuleExpression::is("quality", "fine"), "score", "mid").with_weight(0.25),
        ]);
        let report = engine.run(&CrispInputs::new().with("quality", 5.0)).unwrap();
        assert!((report.activations[0].strength.value() - 0.25).abs() < 1e-12);
        assert!((report.distributions["score"].height() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_not_operator_in_engine() {
        let engine = engine(vec![
            Rule::new(!RuleExpression::is("quality", "bad"), "score", "high"),
        ]);
        let err = engine.run(&CrispInputs::new().with("quality", 0.0)).unwrap_err();
        assert_eq!(err.code, ErrorCode::NoRuleActivated);

        let out = engine.compute(&CrispInputs::new().with("quality", 10.0)).unwrap();
        assert!(out["score"] > 50.0);
    }

    #[test]
    fn test_multiple_consequents() {
        let level = LinguisticVariable::consequent("level", 0.0, 10.0, 1.0)
            .and_then(|v| v.with_term("up", 0.0, 10.0, 10.0))
            .unwrap();
        let engine = builder()
            .variable(level)
            .rule(Rule::new(RuleExpression::is("quality", "great"), "score", "high").also("level", "up"))
            .build()
            .unwrap();
        let out = engine.compute(&CrispInputs::new().with("quality", 10.0)).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out["level"] > 5.0);
        assert!(out["score"] > 50.0);
    }

    #[test]
    fn test_build_rejects_bad_rule_bases() {
        let err = builder().build().unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyRuleBase);

        let err = builder()
            .variable(quality())
            .rule(Rule::new(RuleExpression::is("quality", "bad"), "score", "low"))
            .build()
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateVariable);

        let err = builder()
            .rule(Rule::new(RuleExpression::is("price", "bad"), "score", "low"))
            .build()
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownVariable);
        assert_eq!(err.context_field("rule"), Some("1"));

        let err = builder()
            .rule(Rule::new(RuleExpression::is("quality", "awful"), "score", "low"))
            .build()
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownTerm);

        let err = builder()
            .rule(Rule::new(RuleExpression::is("quality", "bad"), "score", "zero"))
            .build()
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownTerm);

        let err = builder()
            .rule(Rule::new(RuleExpression::is("score", "low"), "score", "low"))
            .build()
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RoleMismatch);

        let err = builder()
            .rule(Rule::new(RuleExpression::is("quality", "bad"), "quality", "bad"))
            .build()
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RoleMismatch);

        let err = builder()
            .rule(Rule::new(RuleExpression::is("quality", "bad"), "score", "low").with_weight(2.0))
            .build()
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidWeight);
    }

    #[test]
    fn test_declared_roles() {
        let rule = Rule::new(RuleExpression::is("quality", "bad"), "score", "low");
        let engine = InferenceEngine::builder()
            .antecedent(quality())
            .consequent(score())
            .rule(rule.clone())
            .build()
            .unwrap();
        assert_eq!(engine.antecedents().len(), 1);

        let err = InferenceEngine::builder()
            .antecedent(score())
            .consequent(quality())
            .rule(rule)
            .build()
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RoleMismatch);
        assert_eq!(err.context_field("variable"), Some("score"));
    }

    #[test]
    fn test_engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<InferenceEngine>();

        let engine = std::sync::Arc::new(engine(vec![
            Rule::new(RuleExpression::is("quality", "bad"), "score", "low"),
            Rule::new(RuleExpression::is("quality", "great"), "score", "high"),
        ]));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let engine = std::sync::Arc::clone(&engine);
                std::thread::spawn(move || {
                    engine
                        .compute(&CrispInputs::new().with("quality", 1.0 + i as f64))
                        .unwrap()["score"]
                })
            })
            .collect();
        let results: Vec<f64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for (i, r) in results.iter().enumerate() {
            let again = engine
                .compute(&CrispInputs::new().with("quality", 1.0 + i as f64))
                .unwrap()["score"];
            assert_eq!(r.to_bits(), again.to_bits());
        }
    }
}
