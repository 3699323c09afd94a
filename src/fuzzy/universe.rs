//! Discretized universes of discourse

use serde::Serialize;

use crate::error::{FisError, FisResult};

/// Largest number of sample points a universe may hold
pub const MAX_POINTS: usize = 100_001;

/// Relative slack allowed when checking that `step` divides the range
const GRID_TOLERANCE: f64 = 1e-6;

/// Evenly spaced points `[min, min + step, ..., max]`
///
/// `step` must divide `max - min` into a whole number of intervals and the
/// grid may hold at most [`MAX_POINTS`] points. The last point is pinned to
/// `max` to absorb floating-point drift.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Universe {
    min: f64,
    max: f64,
    step: f64,
    #[serde(skip)]
    points: Vec<f64>,
}

impl Universe {
    pub fn new(min: f64, max: f64, step: f64) -> FisResult<Self> {
        Self::for_variable("<anonymous>", min, max, step)
    }

    /// Number of intervals `step` cuts `[min, max]` into, without allocating
    pub fn interval_count(min: f64, max: f64, step: f64) -> FisResult<usize> {
        Self::check_grid("<anonymous>", min, max, step)
    }

    pub(crate) fn for_variable(variable: &str, min: f64, max: f64, step: f64) -> FisResult<Self> {
        let intervals = Self::check_grid(variable, min, max, step)?;
        let mut points: Vec<f64> = (0..=intervals)
            .map(|i| min + i as f64 * step)
            .collect();
        if let Some(last) = points.last_mut() {
            *last = max;
        }

        Ok(Self { min, max, step, points })
    }

    fn check_grid(variable: &str, min: f64, max: f64, step: f64) -> FisResult<usize> {
        if !(min.is_finite() && max.is_finite() && step.is_finite()) {
            return Err(FisError::invalid_universe(
                variable,
                format!("Universe of '{}' has non-finite bounds or step", variable),
            ));
        }
        if max <= min {
            return Err(FisError::invalid_universe(
                variable,
                format!("Universe of '{}' is empty: max {} <= min {}", variable, max, min),
            ));
        }
        if step <= 0.0 || step > max - min {
            return Err(FisError::invalid_universe(
                variable,
                format!("Universe of '{}' has invalid step {}", variable, step),
            ));
        }

        let raw = (max - min) / step;
        let intervals = raw.round();
        if intervals + 1.0 > MAX_POINTS as f64 {
            return Err(FisError::invalid_universe(
                variable,
                format!(
                    "Universe of '{}' with step {} needs more than {} points",
                    variable, step, MAX_POINTS
                ),
            ));
        }
        if (raw - intervals).abs() > GRID_TOLERANCE * intervals.max(1.0) {
            return Err(FisError::invalid_universe(
                variable,
                format!(
                    "Step {} does not divide the universe [{}, {}] of '{}' evenly",
                    step, min, max, variable
                ),
            ));
        }

        Ok(intervals as usize)
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.min && x <= self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_integer_universe() {
        let u = Universe::new(0.0, 10.0, 1.0).unwrap();
        assert_eq!(u.len(), 11);
        assert_eq!(u.points()[0], 0.0);
        assert_eq!(u.points()[10], 10.0);
    }

    #[test]
    fn test_fractional_step_ends_at_max() {
        let u = Universe::new(0.0, 20.0, 0.1).unwrap();
        assert_eq!(u.len(), 201);
        assert_eq!(*u.points().last().unwrap(), 20.0);
        assert!((u.points()[37] - 3.7).abs() < 1e-9);
    }

    #[test]
    fn test_contains() {
        let u = Universe::new(0.0, 100.0, 1.0).unwrap();
        assert!(u.contains(0.0));
        assert!(u.contains(100.0));
        assert!(!u.contains(100.5));
        assert!(!u.contains(-1.0));
    }

    #[test]
    fn test_invalid_universes() {
        for (min, max, step) in [
            (10.0, 0.0, 1.0),
            (0.0, 0.0, 1.0),
            (0.0, 10.0, 0.0),
            (0.0, 10.0, -1.0),
            (0.0, 10.0, 11.0),
            (0.0, f64::INFINITY, 1.0),
            (0.0, 100.0, 7.0),
            (0.0, 100.0, 1e-9),
            (0.0, 100.0, 1e-300),
        ] {
            let err = Universe::new(min, max, step).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidUniverse);
        }
    }

    #[test]
    fn test_uneven_step_is_rejected() {
        let err = Universe::new(0.0, 100.0, 7.0).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidUniverse);
        assert!(err.message.contains("evenly"));
    }

    #[test]
    fn test_point_budget() {
        let u = Universe::new(0.0, 100.0, 0.001).unwrap();
        assert_eq!(u.len(), MAX_POINTS);

        let err = Universe::new(0.0, 100.0, 1e-300).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidUniverse);
        assert!(err.message.contains("points"));
    }

    #[test]
    fn test_interval_count() {
        assert_eq!(Universe::interval_count(0.0, 100.0, 0.1).unwrap(), 1000);
        assert_eq!(Universe::interval_count(0.0, 20.0, 0.1).unwrap(), 200);
        assert!(Universe::interval_count(0.0, 100.0, 3.0).is_err());
    }
}
