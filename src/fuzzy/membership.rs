//! Triangular membership functions

use serde::Serialize;

use crate::error::{FisError, FisResult};
use super::FuzzyValue;

/// Triangular membership function: (left, peak, right)
///
/// Degree rises linearly from 0 at `a` to 1 at `b` and falls back to 0 at
/// `c`. With `a == b` the left edge is a vertical step, with `b == c` the
/// right edge is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MembershipFunction {
    a: f64,
    b: f64,
    c: f64,
}

impl MembershipFunction {
    /// Build a triangle, rejecting out-of-order or non-finite breakpoints
    pub fn triangular(a: f64, b: f64, c: f64) -> FisResult<Self> {
        Self::named("<anonymous>", a, b, c)
    }

    /// Same as [`triangular`](Self::triangular), naming the term in the error
    pub fn named(term: &str, a: f64, b: f64, c: f64) -> FisResult<Self> {
        let finite = a.is_finite() && b.is_finite() && c.is_finite();
        if !finite || a > b || b > c {
            return Err(FisError::invalid_membership(term, a, b, c));
        }
        Ok(Self { a, b, c })
    }

    /// Evaluate membership for a crisp value
    pub fn degree(&self, x: f64) -> f64 {
        let (a, b, c) = (self.a, self.b, self.c);

        if !x.is_finite() || x < a || x > c {
            0.0
        } else if x == b {
            1.0
        } else if x < b {
            // a < x < b, so b > a here
            (x - a) / (b - a)
        } else {
            (c - x) / (c - b)
        }
    }

    /// Evaluate membership as a [`FuzzyValue`]
    pub fn evaluate(&self, x: f64) -> FuzzyValue {
        FuzzyValue::new(self.degree(x))
    }

    /// Get the core (where membership = 1)
    pub fn core(&self) -> f64 {
        self.b
    }

    /// Get the support (where membership may be > 0)
    pub fn support(&self) -> (f64, f64) {
        (self.a, self.c)
    }

    pub fn params(&self) -> (f64, f64, f64) {
        (self.a, self.b, self.c)
    }
}
