//! Sanitization configuration.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → SanitizeConfig::load (read & deserialize)
//!     → SanitizeConfig (immutable)
//!     → RequestSanitizer::from_config
//! ```
//!
//! All fields have defaults, so an empty document is a valid configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::policy::{ExemptionPolicy, MULTIPART_FORM_DATA};

/// Root configuration for request sanitization.
///
/// # Examples
///
/// ```
/// use request_sanitizer::SanitizeConfig;
///
/// let config = SanitizeConfig::from_toml_str(r#"
///     exempt_content_types = ["multipart/form-data", "application/octet-stream"]
///     max_body_bytes = 1048576
/// "#).expect("valid config");
///
/// assert_eq!(config.max_body_bytes, Some(1_048_576));
/// assert!(config.exemption_policy().is_exempt("application/octet-stream"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SanitizeConfig {
    /// Media type prefixes whose bodies are neither buffered nor sanitized.
    pub exempt_content_types: Vec<String>,

    /// Upper bound on a buffered body, in bytes. `None` buffers any size.
    pub max_body_bytes: Option<usize>,
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        Self {
            exempt_content_types: vec![MULTIPART_FORM_DATA.to_string()],
            max_body_bytes: None,
        }
    }
}

impl SanitizeConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Loads a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(
            path = %path.display(),
            exempt = config.exempt_content_types.len(),
            max_body_bytes = ?config.max_body_bytes,
            "loaded sanitize config"
        );
        Ok(config)
    }

    /// Builds the exemption policy described by this configuration.
    pub fn exemption_policy(&self) -> ExemptionPolicy {
        self.exempt_content_types.iter().cloned().collect()
    }
}
