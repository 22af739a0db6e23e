//! Custom validation functions shared across configuration modules.

use validator::ValidationError;

/// Validate that a ratio lies in `[0, 1]`.
pub fn validate_unit_interval(value: f64) -> Result<(), ValidationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new("must_be_between_zero_and_one"))
    }
}

/// Validate a tracing level name.
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid = ["error", "warn", "info", "debug", "trace"]
        .contains(&level.to_lowercase().as_str());
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_log_level"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_interval_bounds() {
        assert!(validate_unit_interval(0.0).is_ok());
        assert!(validate_unit_interval(1.0).is_ok());
        assert!(validate_unit_interval(-0.1).is_err());
        assert!(validate_unit_interval(1.1).is_err());
    }

    #[test]
    fn log_levels() {
        assert!(validate_log_level("info").is_ok());
        assert!(validate_log_level("DEBUG").is_ok());
        assert!(validate_log_level("verbose").is_err());
    }
}
