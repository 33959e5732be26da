//! # Engine Configuration
//!
//! Configuration for the order table engine.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     ORDERDESK_PAGE_SIZE=25                                             │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/orderdesk/engine.toml (Linux)                            │
//! │     ~/Library/Application Support/com.orderdesk.panel/engine.toml      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     page size 10, max page size 100                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # engine.toml
//! default_page_size = 10
//! max_page_size = 100
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};

// =============================================================================
// Constants
// =============================================================================

/// Environment variable overriding the default page size.
const ENV_PAGE_SIZE: &str = "ORDERDESK_PAGE_SIZE";

fn default_page_size() -> u32 {
    10
}

fn default_max_page_size() -> u32 {
    100
}

// =============================================================================
// Table Config
// =============================================================================

/// Tunables for one engine instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    /// Rows per page on a fresh engine (the UI can change it at runtime).
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Hard ceiling for runtime page-size changes.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl TableConfig {
    /// Loads configuration with the documented priority: env > file > defaults.
    ///
    /// A missing file is not an error (defaults apply); an unreadable or
    /// unparsable file is, so misconfiguration fails loudly instead of
    /// silently running on defaults.
    pub fn load_or_default(path: Option<&Path>) -> EngineResult<Self> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_path(),
        };

        let mut config = match path {
            Some(ref p) if p.exists() => {
                debug!(path = %p.display(), "Loading engine config");
                let text = std::fs::read_to_string(p)?;
                toml::from_str(&text)?
            }
            _ => TableConfig::default(),
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Platform config-file location (`engine.toml` in the app config dir).
    fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "orderdesk", "panel")
            .map(|dirs| dirs.config_dir().join("engine.toml"))
    }

    /// Applies environment-variable overrides on top of file/default values.
    fn apply_env_overrides(&mut self) {
        if let Ok(raw) = std::env::var(ENV_PAGE_SIZE) {
            match raw.parse::<u32>() {
                Ok(size) => self.default_page_size = size,
                Err(_) => warn!(value = %raw, "Ignoring unparsable {}", ENV_PAGE_SIZE),
            }
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> EngineResult<()> {
        if self.default_page_size == 0 {
            return Err(EngineError::InvalidConfig(
                "default_page_size must be at least 1".into(),
            ));
        }
        if self.max_page_size < self.default_page_size {
            return Err(EngineError::InvalidConfig(format!(
                "max_page_size ({}) must be >= default_page_size ({})",
                self.max_page_size, self.default_page_size
            )));
        }
        Ok(())
    }

    /// Clamps a requested page size into the configured bounds.
    pub fn clamp_page_size(&self, requested: u32) -> u32 {
        requested.clamp(1, self.max_page_size)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
