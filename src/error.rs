// src/error.rs
use thiserror::Error;

/// Error types for the fast-hedge library
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    /// Invalid parameter values
    #[error("Invalid parameter '{parameter}' = {value}: {constraint}")]
    InvalidParameters {
        parameter: String,
        value: f64,
        constraint: String,
    },

    /// Invalid configuration, raised before any computation starts
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfiguration { field: String, reason: String },

    /// Iterative method hit its iteration cap without meeting its tolerance
    #[error("{method} did not converge after {iterations} iterations: {reason}")]
    NonConvergence {
        method: String,
        iterations: usize,
        reason: String,
    },

    /// Target value lies outside the image of the search bracket
    #[error("Target {target} is not bracketed by f({lower}) and f({upper})")]
    NotBracketed { target: f64, lower: f64, upper: f64 },

    /// Array shapes that cannot be combined
    #[error("Shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    /// Numerical instability in a computed result
    #[error("Numerical instability in {method}: {reason}")]
    NumericalInstability { method: String, reason: String },
}

/// Result type alias for fast-hedge operations
pub type PricingResult<T> = Result<T, PricingError>;

/// Validation utilities
pub mod validation {
    use super::{PricingError, PricingResult};

    /// Validate that a parameter is positive and finite
    pub fn validate_positive(name: &str, value: f64) -> PricingResult<()> {
        if !(value > 0.0) || !value.is_finite() {
            Err(PricingError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be positive (> 0) and finite".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a parameter is non-negative and finite
    pub fn validate_non_negative(name: &str, value: f64) -> PricingResult<()> {
        if !(value >= 0.0) || !value.is_finite() {
            Err(PricingError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be non-negative (≥ 0) and finite".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a value is finite and not NaN
    pub fn validate_finite(name: &str, value: f64) -> PricingResult<()> {
        if !value.is_finite() {
            Err(PricingError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be finite (not NaN or infinite)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a value does not exceed an upper bound
    pub fn validate_at_most(name: &str, value: f64, max: f64) -> PricingResult<()> {
        if value > max {
            Err(PricingError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: format!("must not exceed {}", max),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that `scale · exp(log_value)` is positive and finite, so a
    /// log coordinate maps to a usable price level
    pub fn validate_log_level(name: &str, scale: f64, log_value: f64) -> PricingResult<()> {
        let level = scale * log_value.exp();
        if level > 0.0 && level.is_finite() {
            Ok(())
        } else {
            Err(PricingError::InvalidParameters {
                parameter: name.to_string(),
                value: log_value,
                constraint: format!(
                    "{} · exp({}) must be positive and finite",
                    scale, name
                ),
            })
        }
    }

    /// Validate a search bracket: both ends finite and `lower < upper`
    pub fn validate_bracket(lower: f64, upper: f64) -> PricingResult<()> {
        validate_finite("lower", lower)?;
        validate_finite("upper", upper)?;
        if lower >= upper {
            return Err(PricingError::InvalidConfiguration {
                field: "bracket".to_string(),
                reason: format!("lower ({}) must be strictly less than upper ({})", lower, upper),
            });
        }
        Ok(())
    }

    /// Validate a count-like setting
    pub fn validate_count(field: &str, value: usize, max: usize) -> PricingResult<()> {
        if value == 0 {
            Err(PricingError::InvalidConfiguration {
                field: field.to_string(),
                reason: "must be greater than 0".to_string(),
            })
        } else if value > max {
            Err(PricingError::InvalidConfiguration {
                field: field.to_string(),
                reason: format!("exceeds maximum allowed ({})", max),
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::validation::*;
    use super::*;

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive("strike", 1.0).is_ok());
        assert!(validate_positive("strike", 0.0).is_err());
        assert!(validate_positive("strike", -0.1).is_err());
        assert!(validate_positive("strike", f64::NAN).is_err());
        assert!(validate_positive("strike", f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative("volatility", 0.0).is_ok());
        assert!(validate_non_negative("volatility", 0.2).is_ok());
        assert!(validate_non_negative("volatility", -1e-12).is_err());
        assert!(validate_non_negative("volatility", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_finite() {
        assert!(validate_finite("value", 1.0).is_ok());
        assert!(validate_finite("value", f64::NAN).is_err());
        assert!(validate_finite("value", f64::INFINITY).is_err());
        assert!(validate_finite("value", f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_validate_log_level() {
        assert!(validate_log_level("log_moneyness", 1.0, -700.0).is_ok());
        assert!(validate_log_level("log_moneyness", 1.0, 700.0).is_ok());
        assert!(validate_log_level("log_moneyness", 1.0, -750.0).is_err());
        assert!(validate_log_level("log_moneyness", 1.0, 710.0).is_err());
        assert!(validate_log_level("log_moneyness", 100.0, 708.0).is_err());
    }

    #[test]
    fn test_validate_bracket() {
        assert!(validate_bracket(-6.0, 6.0).is_ok());
        assert!(matches!(
            validate_bracket(6.0, -6.0),
            Err(PricingError::InvalidConfiguration { .. })
        ));
        assert!(validate_bracket(1.0, 1.0).is_err());
        assert!(validate_bracket(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_error_display() {
        let error = PricingError::InvalidParameters {
            parameter: "volatility".to_string(),
            value: -0.1,
            constraint: "must be non-negative".to_string(),
        };

        let display = format!("{}", error);
        assert!(display.contains("volatility"));
        assert!(display.contains("-0.1"));
        assert!(display.contains("non-negative"));
    }

    #[test]
    fn test_non_convergence_display() {
        let error = PricingError::NonConvergence {
            method: "bisection".to_string(),
            iterations: 100,
            reason: "precision 0 can never be met".to_string(),
        };

        let display = format!("{}", error);
        assert!(display.contains("bisection"));
        assert!(display.contains("100"));
    }
}
