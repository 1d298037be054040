//! Configuration loading and validation.

use std::path::Path;

use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};
use crate::schema::GovernanceConfig;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "INTENTCORE_CONFIG";

impl GovernanceConfig {
    /// Parses and validates a JSON configuration document. Missing sections
    /// and fields fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed documents and
    /// [`ConfigError::Invalid`] when validation fails.
    pub fn from_json_str(document: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read, otherwise as
    /// [`GovernanceConfig::from_json_str`].
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&document)?;
        info!(path = %path.display(), "governance configuration loaded");
        Ok(config)
    }

    /// Loads the file named by `INTENTCORE_CONFIG`, or returns the defaults
    /// when the variable is unset.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`GovernanceConfig::load`].
    pub fn load_from_env() -> ConfigResult<Self> {
        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::load(path),
            None => {
                debug!("{CONFIG_PATH_ENV} not set, using default governance configuration");
                Ok(Self::default())
            }
        }
    }

    /// Checks semantic constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> ConfigResult<()> {
        let limits = &self.trade_limits;
        positive("trade_limits.single_trade_max", limits.single_trade_max)?;
        positive("trade_limits.review_threshold", limits.review_threshold)?;
        positive("trade_limits.auto_approve_max", limits.auto_approve_max)?;
        if limits.review_threshold > limits.single_trade_max {
            return Err(ConfigError::invalid(
                "trade_limits.review_threshold",
                "must not exceed single_trade_max",
            ));
        }
        if limits.auto_approve_max > limits.review_threshold {
            return Err(ConfigError::invalid(
                "trade_limits.auto_approve_max",
                "must not exceed review_threshold",
            ));
        }

        positive(
            "timing_restrictions.high_volatility_threshold",
            self.timing_restrictions.high_volatility_threshold,
        )?;
        fraction(
            "risk_limits.max_position_concentration",
            self.risk_limits.max_position_concentration,
        )?;
        fraction(
            "risk_limits.max_sector_concentration",
            self.risk_limits.max_sector_concentration,
        )?;

        positive("priority.high_value", self.priority.high_value)?;
        fraction("priority.low_completeness", self.priority.low_completeness)?;
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("must be a finite positive number, got {value}"),
        ))
    }
}

fn fraction(field: &'static str, value: f64) -> ConfigResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("must be within [0, 1], got {value}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_document_keeps_defaults() {
        let config = GovernanceConfig::from_json_str(
            r#"{"trade_limits": {"single_trade_max": 200000000},
                "blacklist": {"symbols": ["gme"], "actions": ["short_sell"]}}"#,
        )
        .unwrap();

        assert!((config.trade_limits.single_trade_max - 200_000_000.0).abs() < f64::EPSILON);
        assert!((config.trade_limits.review_threshold - 50_000_000.0).abs() < f64::EPSILON);
        assert!(config.blacklist.contains_symbol("GME"));
        assert!(config.review_requirements.high_value);
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let err = GovernanceConfig::from_json_str(
            r#"{"trade_limits": {"single_trade_max": 10, "review_threshold": 20, "auto_approve_max": 5}}"#,
        )
        .expect_err("review threshold above max");
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "trade_limits.review_threshold",
                ..
            }
        ));
    }

    #[test]
    fn rejects_out_of_range_fraction() {
        let err = GovernanceConfig::from_json_str(r#"{"priority": {"low_completeness": 1.5}}"#)
            .expect_err("fraction above one");
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = GovernanceConfig::from_json_str("{not json").expect_err("parse");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn loads_from_file() {
        let mut path = std::env::temp_dir();
        path.push(format!("intentcore-config-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, r#"{"review_requirements": {"high_value": false}}"#).unwrap();

        let config = GovernanceConfig::load(&path).unwrap();
        assert!(!config.review_requirements.high_value);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = GovernanceConfig::load("/definitely/not/here.json").expect_err("io");
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
