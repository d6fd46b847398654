//! Configuration loader for YAML files
//!
//! This module handles loading, env-overriding and validating configuration.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::debug;

use crate::error::AppError;

use super::types::AppConfig;

/// Load configuration from a YAML file, then apply env overrides
///
/// This function:
/// 1. Parses the YAML file if it exists (defaults otherwise)
/// 2. Applies environment variable overrides (`BOT_TOKEN`, `PORT`, ...)
/// 3. Validates the configuration rules
///
/// # Returns
/// * `Ok(AppConfig)` - Successfully loaded and validated configuration
/// * `Err(AppError)` - Parse error or validation failure (e.g. no bot token)
///
/// # Example
/// ```ignore
/// use std::path::Path;
/// use price_alert_bot::config::load_config;
///
/// let config = load_config(Path::new("config.yaml"))?;
/// ```
pub fn load_config(path: &Path) -> Result<AppConfig, AppError> {
    let mut config = if path.exists() {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        serde_yaml::from_reader(reader).map_err(|e| {
            AppError::Config(format!(
                "YAML parse error in '{}': {}",
                path.display(),
                e
            ))
        })?
    } else {
        debug!(path = %path.display(), "Config file not found, using defaults");
        AppConfig::default()
    };

    config.apply_env_overrides();
    config.validate()?;

    Ok(config)
}

/// Load configuration from a YAML string (useful for testing)
///
/// Environment overrides are not applied.
pub fn load_config_from_str(yaml_content: &str) -> Result<AppConfig, AppError> {
    let config: AppConfig = serde_yaml::from_str(yaml_content)
        .map_err(|e| AppError::Config(format!("YAML parse error: {}", e)))?;

    config.validate()?;

    Ok(config)
}

// ============================================================================
// Tests
// ============================================================================
