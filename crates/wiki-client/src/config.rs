//! Client configuration, resolved once from the environment.

use std::sync::Arc;

use crate::error::{ClientError, Result};
use crate::transport::{HttpTransport, MockTransport, Transport};

pub const API_BASE_VAR: &str = "WIKI_API_BASE";
pub const ENABLE_MOCK_VAR: &str = "WIKI_ENABLE_MOCK";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the document API, without trailing slashes
    pub api_base: String,
    /// Explicit mock switch; unset means "mock when there is no base URL"
    pub enable_mock: Option<bool>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// - `WIKI_API_BASE`: base URL, e.g. `http://localhost:8080`
    /// - `WIKI_ENABLE_MOCK`: `1/true/yes/on` or `0/false/no/off`
    pub fn from_env() -> Self {
        let api_base = std::env::var(API_BASE_VAR).ok();
        let enable_mock = std::env::var(ENABLE_MOCK_VAR).ok();
        Self::from_vars(api_base.as_deref(), enable_mock.as_deref())
    }

    pub fn from_vars(api_base: Option<&str>, enable_mock: Option<&str>) -> Self {
        let api_base = api_base
            .map(|base| base.trim().trim_end_matches('/').to_string())
            .unwrap_or_default();
        let enable_mock = enable_mock.filter(|raw| !raw.trim().is_empty()).and_then(|raw| {
            let flag = parse_flag(raw);
            if flag.is_none() {
                tracing::warn!("Ignoring unrecognized {} value: {:?}", ENABLE_MOCK_VAR, raw);
            }
            flag
        });
        Self {
            api_base,
            enable_mock,
        }
    }

    pub fn use_mock(&self) -> bool {
        self.enable_mock.unwrap_or(self.api_base.is_empty())
    }

    /// Build the transport this configuration selects.
    pub fn connect(&self) -> Result<Arc<dyn Transport>> {
        if self.use_mock() {
            tracing::info!("Using the in-process mock document API");
            return Ok(Arc::new(MockTransport::new()));
        }
        if self.api_base.is_empty() {
            return Err(ClientError::MissingApiBase);
        }
        tracing::info!("Using the document API at {}", self.api_base);
        Ok(Arc::new(HttpTransport::new(&self.api_base)?))
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slashes_stripped() {
        let config = ClientConfig::from_vars(Some("http://localhost:8080///"), None);
        assert_eq!(config.api_base, "http://localhost:8080");
        assert!(!config.use_mock());
    }

    #[test]
    fn test_empty_base_means_mock() {
        assert!(ClientConfig::from_vars(None, None).use_mock());
        assert!(ClientConfig::from_vars(Some("  "), None).use_mock());
    }

    #[test]
    fn test_explicit_flag_wins() {
        assert!(ClientConfig::from_vars(Some("http://api"), Some("yes")).use_mock());
        assert!(ClientConfig::from_vars(Some("http://api"), Some("ON")).use_mock());
        assert!(!ClientConfig::from_vars(None, Some("false")).use_mock());
        // Unrecognized values fall back to the default rule
        assert!(ClientConfig::from_vars(None, Some("maybe")).use_mock());
    }

    #[test]
    fn test_connect_without_base_or_mock_fails() {
        let config = ClientConfig::from_vars(None, Some("0"));
        assert!(matches!(config.connect(), Err(ClientError::MissingApiBase)));
    }

    #[test]
    fn test_connect_selects_transport() {
        assert!(ClientConfig::from_vars(None, None).connect().is_ok());
        assert!(ClientConfig::from_vars(Some("http://127.0.0.1:8080"), None).connect().is_ok());
    }
}
