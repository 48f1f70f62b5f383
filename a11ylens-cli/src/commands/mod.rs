//! Command handlers -- one module per subcommand

pub mod config;
pub mod scan;

use std::path::Path;

use a11ylens_core::config::A11yLensConfig;
use a11ylens_core::error::{A11yError, ConfigError};

use crate::cli::DEFAULT_CONFIG_PATH;

/// Load the effective configuration.
///
/// A missing file at the default path falls back to built-in defaults
/// (still subject to env overrides and validation); an explicitly named
/// file must exist.
pub async fn load_config(path: &Path) -> Result<A11yLensConfig, A11yError> {
    match A11yLensConfig::load(path).await {
        Err(A11yError::Config(ConfigError::FileNotFound { .. }))
            if path == Path::new(DEFAULT_CONFIG_PATH) =>
        {
            let mut config = A11yLensConfig::default();
            config.apply_env_overrides();
            config.validate()?;
            Ok(config)
        }
        other => other,
    }
}
