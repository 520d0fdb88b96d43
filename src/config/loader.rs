use super::EngineConfig;
use crate::error::{ErrorCode, FormError, Result};
use std::path::Path;
use tracing::debug;

/// Loads [`EngineConfig`] from a TOML file plus environment overrides
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<EngineConfig> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: EngineConfig = toml::from_str(&content)
                .map_err(|e| FormError::from(e).with_context(path.display()))?;
            debug!("Loaded engine configuration from {}", path.display());
            config
        } else {
            debug!(
                "No engine configuration at {}, using defaults",
                path.display()
            );
            EngineConfig::default()
        };

        config.merge_env_vars();
        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from an optional path; `None` means defaults plus environment
    pub fn load_optional(path: Option<&Path>) -> Result<EngineConfig> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let mut config = EngineConfig::default();
                config.merge_env_vars();
                Ok(config)
            }
        }
    }

    fn validate(config: &EngineConfig) -> Result<()> {
        if config.default_country.trim().is_empty() {
            return Err(FormError::configuration_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                "default_country must not be empty",
            ));
        }
        if config.max_section_depth == 0 {
            return Err(FormError::configuration_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                "max_section_depth must be at least 1",
            ));
        }
        Ok(())
    }
}
