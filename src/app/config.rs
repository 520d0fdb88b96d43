//! Application configuration
//!
//! Settings of one `regform` invocation, as opposed to [`EngineConfig`] which
//! describes how forms are interpreted.

use crate::config::{ConfigLoader, EngineConfig};
use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Verbosity level for logging
    pub verbose: u8,
    /// Engine configuration file given with `--config`
    pub config_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn new(verbose: u8) -> Self {
        Self {
            verbose,
            config_path: None,
        }
    }

    pub fn with_config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    /// Get the log filter based on verbosity
    ///
    /// `RUST_LOG` style directives are not read from the environment; the
    /// verbosity flag alone decides.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn,regform=info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Load the engine configuration this invocation runs with
    pub fn engine_config(&self) -> Result<EngineConfig> {
        ConfigLoader::load_optional(self.config_path.as_deref()).with_context(|| match &self.config_path {
            Some(path) => format!("Failed to load engine configuration from {}", path.display()),
            None => "Failed to load engine configuration".to_string(),
        })
    }
}
