//! Rule antecedent expressions
//!
//! Antecedents are plain data: a tree of `(variable, term)` leaves joined by
//! fuzzy AND (min), OR (max) and NOT (complement), walked by one interpreter.
//!
//! ```rust,ignore
//! use credit_fis::fuzzy::RuleExpression as E;
//!
//! let rich_and_secured = E::is("gaji", "tinggi") & E::is("jaminan", "baik");
//! let moderate_status = E::is("status", "sedang") | E::is("status", "tinggi");
//! let not_risky = !E::is("dbr", "tinggi");
//! ```

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

use serde::{Deserialize, Serialize};

use crate::error::{FisError, FisResult};
use super::{FuzzifiedInputs, FuzzyValue};

/// Antecedent tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleExpression {
    /// Leaf: degree of `term` for the fuzzified input of `variable`
    Term { variable: String, term: String },
    And(Box<RuleExpression>, Box<RuleExpression>),
    Or(Box<RuleExpression>, Box<RuleExpression>),
    Not(Box<RuleExpression>),
}

impl RuleExpression {
    /// Leaf expression: `variable IS term`
    pub fn is(variable: impl Into<String>, term: impl Into<String>) -> Self {
        RuleExpression::Term {
            variable: variable.into(),
            term: term.into(),
        }
    }

    pub fn and(self, other: RuleExpression) -> Self {
        RuleExpression::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: RuleExpression) -> Self {
        RuleExpression::Or(Box::new(self), Box::new(other))
    }

    pub fn negate(self) -> Self {
        RuleExpression::Not(Box::new(self))
    }

    /// Left fold of `parts` with AND; `None` when `parts` is empty
    pub fn all(parts: impl IntoIterator<Item = RuleExpression>) -> Option<Self> {
        parts.into_iter().reduce(RuleExpression::and)
    }

    /// Left fold of `parts` with OR; `None` when `parts` is empty
    pub fn any(parts: impl IntoIterator<Item = RuleExpression>) -> Option<Self> {
        parts.into_iter().reduce(RuleExpression::or)
    }

    /// Evaluate the tree into a firing strength
    ///
    /// Both operands of AND/OR are always evaluated.
    pub fn evaluate(&self, fuzzified: &FuzzifiedInputs) -> FisResult<FuzzyValue> {
        match self {
            RuleExpression::Term { variable, term } => {
                let degrees = fuzzified
                    .get(variable)
                    .ok_or_else(|| FisError::unknown_variable(variable))?;
                degrees
                    .get(term)
                    .copied()
                    .ok_or_else(|| FisError::unknown_term(variable, term))
            }
            RuleExpression::And(left, right) => {
                let l = left.evaluate(fuzzified)?;
                let r = right.evaluate(fuzzified)?;
                Ok(l.and(&r))
            }
            RuleExpression::Or(left, right) => {
                let l = left.evaluate(fuzzified)?;
                let r = right.evaluate(fuzzified)?;
                Ok(l.or(&r))
            }
            RuleExpression::Not(inner) => Ok(inner.evaluate(fuzzified)?.not()),
        }
    }

    /// All `(variable, term)` leaves, left to right
    pub fn references(&self) -> Vec<(&str, &str)> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<(&'a str, &'a str)>) {
        match self {
            RuleExpression::Term { variable, term } => out.push((variable.as_str(), term.as_str())),
            RuleExpression::And(l, r) | RuleExpression::Or(l, r) => {
                l.collect_references(out);
                r.collect_references(out);
            }
            RuleExpression::Not(inner) => inner.collect_references(out),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            RuleExpression::Or(..) => 1,
            RuleExpression::And(..) => 2,
            RuleExpression::Not(..) | RuleExpression::Term { .. } => 3,
        }
    }

    fn fmt_operand(&self, parent: u8, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.precedence() < parent {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl fmt::Display for RuleExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleExpression::Term { variable, term } => write!(f, "{} IS {}", variable, term),
            RuleExpression::And(l, r) => {
                l.fmt_operand(2, f)?;
                write!(f, " AND ")?;
                r.fmt_operand(2, f)
            }
            RuleExpression::Or(l, r) => {
                l.fmt_operand(1, f)?;
                write!(f, " OR ")?;
                r.fmt_operand(1, f)
            }
            RuleExpression::Not(inner) => {
                write!(f, "NOT ")?;
                inner.fmt_operand(3, f)
            }
        }
    }
}

impl BitAnd for RuleExpression {
    type Output = RuleExpression;

    fn bitand(self, rhs: RuleExpression) -> RuleExpression {
        self.and(rhs)
    }
}

impl BitOr for RuleExpression {
    type Output = RuleExpression;

    fn bitor(self, rhs: RuleExpression) -> RuleExpression {
        self.or(rhs)
    }
}

impl Not for RuleExpression {
    type Output = RuleExpression;

    fn not(self) -> RuleExpression {
        self.negate()
    }
}
