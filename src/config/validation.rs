//! Configuration validation.
//!
//! Serde handles syntax; this checks value ranges. All problems are
//! collected, not just the first.

use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("balancing.weight_floor must be a finite number > 0, got {0}")]
    WeightFloor(f64),

    #[error("load_poll.default_load must be a finite number >= 0, got {0}")]
    DefaultLoad(f64),

    #[error("load_poll.path must start with '/', got '{0}'")]
    LoadPath(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Check value ranges of a fully assembled configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let floor = config.balancing.weight_floor;
    if !floor.is_finite() || floor <= 0.0 {
        errors.push(ValidationError::WeightFloor(floor));
    }

    let default_load = config.load_poll.default_load;
    if !default_load.is_finite() || default_load < 0.0 {
        errors.push(ValidationError::DefaultLoad(default_load));
    }

    if !config.load_poll.path.starts_with('/') {
        errors.push(ValidationError::LoadPath(config.load_poll.path.clone()));
    }

    if config.load_poll.timeout_ms == 0 {
        errors.push(ValidationError::Zero("load_poll.timeout_ms"));
    }
    if config.forward.timeout_secs == 0 {
        errors.push(ValidationError::Zero("forward.timeout_secs"));
    }
    if config.forward.chunk_size == 0 {
        errors.push(ValidationError::Zero("forward.chunk_size"));
    }
    if config.startup.retry_interval_secs == 0 {
        errors.push(ValidationError::Zero("startup.retry_interval_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn collects_every_error() {
        let mut config = GatewayConfig::default();
        config.balancing.weight_floor = 0.0;
        config.load_poll.default_load = f64::NAN;
        config.load_poll.path = "load".into();
        config.forward.chunk_size = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::WeightFloor(0.0)));
        assert!(errors.contains(&ValidationError::LoadPath("load".into())));
        assert!(errors.contains(&ValidationError::Zero("forward.chunk_size")));
    }
}
