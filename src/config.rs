//! Client configuration

use serde::{Deserialize, Serialize};
use url::Url;

/// Fixed library-identifying user agent used when none is configured
pub const DEFAULT_USER_AGENT: &str = "hafas-rest-client";

/// Configuration for a [`HafasRestClient`](crate::HafasRestClient)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the HAFAS REST endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// `User-Agent` header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_endpoint() -> String {
    "https://v6.db.transport.rest".to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            user_agent: default_user_agent(),
        }
    }
}

impl ClientConfig {
    /// Configuration pointing at `endpoint` with the default user agent
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            user_agent: default_user_agent(),
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is not an absolute base URL or
    /// the user agent is empty.
    pub fn validate(&self) -> Result<(), String> {
        match Url::parse(&self.endpoint) {
            Ok(url) if url.cannot_be_a_base() => {
                return Err(format!("endpoint is not a base URL: {}", self.endpoint));
            }
            Ok(_) => {}
            Err(e) => return Err(format!("endpoint is not an absolute URL: {e}")),
        }

        if self.user_agent.is_empty() {
            return Err("user_agent must not be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoint, "https://v6.db.transport.rest");
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_new_keeps_default_user_agent() {
        let config = ClientConfig::new("https://example.test");
        assert_eq!(config.endpoint, "https://example.test");
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_custom_user_agent_is_kept() {
        let config = ClientConfig {
            user_agent: "my-app/1.0".to_string(),
            ..ClientConfig::default()
        };
        assert_eq!(config.user_agent, "my-app/1.0");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_relative_url() {
        let config = ClientConfig::new("not a url");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_non_base_url() {
        let config = ClientConfig::new("mailto:someone@example.test");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_empty_user_agent() {
        let config = ClientConfig {
            user_agent: String::new(),
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serde_defaults() {
        let config: ClientConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.endpoint, "https://v6.db.transport.rest");
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let config = ClientConfig::new("https://example.test");
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: ClientConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.endpoint, config.endpoint);
        assert_eq!(deserialized.user_agent, config.user_agent);
    }
}
