//! Loading and validating `SimConfig` from JSON.

use std::path::Path;

use bistro_logic::config::SimConfig;
use bistro_logic::grid::MAX_GRID_SIZE;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Parse a JSON document; missing fields take their defaults.
pub fn from_json(json: &str) -> Result<SimConfig, ConfigError> {
    let config: SimConfig = serde_json::from_str(json)?;
    validate(&config)?;
    Ok(config)
}

pub fn load(path: impl AsRef<Path>) -> Result<SimConfig, ConfigError> {
    let text = std::fs::read_to_string(path.as_ref())?;
    let config = from_json(&text)?;
    log::info!("Loaded config from {}", path.as_ref().display());
    Ok(config)
}

/// Reject values the simulation cannot run with.
pub fn validate(config: &SimConfig) -> Result<(), ConfigError> {
    let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

    if !(3..=MAX_GRID_SIZE).contains(&config.grid_size) {
        return Err(ConfigError::Invalid(format!(
            "grid_size must be within 3..={MAX_GRID_SIZE}"
        )));
    }
    if !(config.max_dt > 0.0 && config.max_dt.is_finite()) {
        return invalid("max_dt must be positive");
    }
    if config.agent_speed <= 0.0 {
        return invalid("agent_speed must be positive");
    }
    if config.cooking_speed <= 0.0 {
        return invalid("cooking_speed must be positive");
    }
    if config.dropoff_capacity == 0 {
        return invalid("dropoff_capacity must be at least 1");
    }
    if config.patience <= 0.0 || config.vip_patience <= 0.0 {
        return invalid("patience must be positive");
    }
    for (name, p) in [
        ("vip_chance", config.vip_chance),
        ("dirty_chance", config.dirty_chance),
    ] {
        if !(0.0..=1.0).contains(&p) {
            return Err(ConfigError::Invalid(format!("{name} must be within 0..=1")));
        }
    }
    if matches!(config.auto_clean_after, Some(t) if t <= 0.0) {
        return invalid("auto_clean_after must be positive when set");
    }
    if config.eat_duration < 0.0 || config.clean_duration < 0.0 {
        return invalid("durations must not be negative");
    }
    if config.staff_max_xp == 0 || config.starting_max_xp == 0 {
        return invalid("max xp thresholds must be positive");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate(&SimConfig::default()).is_ok());
    }

    #[test]
    fn test_empty_document() {
        let config = from_json("{}").unwrap();
        assert_eq!(config, SimConfig::default());
    }

    #[test]
    fn test_rejects_bad_probability() {
        let err = from_json(r#"{ "dirty_chance": 1.5 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(from_json("{ nope"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_rejects_oversized_grid() {
        assert!(matches!(
            from_json(r#"{ "grid_size": 50000 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(from_json(r#"{ "grid_size": 256 }"#).is_ok());
    }

    #[test]
    fn test_rejects_zero_capacity() {
        assert!(from_json(r#"{ "dropoff_capacity": 0 }"#).is_err());
    }
}
