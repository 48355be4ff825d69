use std::fmt;

use crate::materials::tools::error::{Result, ToolError};

/// Environment variable holding the Materials Project API key.
pub const API_KEY_VAR: &str = "MP_API_KEY";
/// Environment variable overriding the summary endpoint.
pub const ENDPOINT_VAR: &str = "MP_API_ENDPOINT";
/// Summary search endpoint of the public Materials Project API.
pub const DEFAULT_ENDPOINT: &str = "https://api.materialsproject.org/materials/summary/";

/// Settings resolved once at startup.
#[derive(Clone)]
pub struct Config {
    /// Credential sent with every request. Absence is only an error once a
    /// request is about to be made.
    pub api_key: Option<String>,
    pub endpoint: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

impl Config {
    /// Reads [`API_KEY_VAR`] and [`ENDPOINT_VAR`] from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source. Blank
    /// values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            api_key: read(API_KEY_VAR),
            endpoint: read(ENDPOINT_VAR).unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        }
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            ToolError::Configuration(format!("{API_KEY_VAR} environment variable not set"))
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .finish()
    }
}
