//! Transport configuration.
//!
//! Configuration can be built in code or loaded from YAML or JSON. Keys are
//! accepted in either snake_case or camelCase.
//!
//! ```yaml
//! interceptsAllRequests: true
//! verificationEnabled: true
//! defaultHeaders:
//!   Accept: application/json
//! ```

use crate::error::MockError;
use crate::message::header_serde;
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_enabled() -> bool {
    true
}

fn default_scheduler_threads() -> usize {
    2
}

/// Settings for a [`MockTransport`](crate::transport::MockTransport).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransportConfig {
    /// Whether the transport intercepts as soon as it is created.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Intercept every request; unmatched ones are recorded as unexpected.
    #[serde(default, alias = "interceptsAllRequests")]
    pub intercepts_all_requests: bool,

    /// Remove exact mock requests from the expected set once serviced.
    #[serde(default, alias = "automaticallyRemovesServicedRequests")]
    pub automatically_removes_serviced_requests: bool,

    /// Enable `verify()`. Serviced exact mock requests are always removed in this mode.
    #[serde(default, alias = "verificationEnabled")]
    pub verification_enabled: bool,

    /// Headers applied to exact mock requests built through the transport.
    #[serde(default, alias = "defaultHeaders", with = "header_serde")]
    pub default_headers: HeaderMap,

    /// Worker threads of the delivery scheduler.
    #[serde(default = "default_scheduler_threads", alias = "schedulerThreads")]
    pub scheduler_threads: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            intercepts_all_requests: false,
            automatically_removes_serviced_requests: false,
            verification_enabled: false,
            default_headers: HeaderMap::new(),
            scheduler_threads: default_scheduler_threads(),
        }
    }
}

impl TransportConfig {
    /// Parse YAML text. JSON is accepted too, being a subset of YAML.
    pub fn from_yaml_str(text: &str) -> Result<Self, MockError> {
        let config: Self =
            serde_yaml::from_str(text).map_err(|e| MockError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self, MockError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| MockError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MockError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(MockError::ConfigIo)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_yaml_str(&text),
        }
    }

    pub fn validate(&self) -> Result<(), MockError> {
        if self.scheduler_threads == 0 {
            return Err(MockError::invalid_argument(
                "scheduler_threads must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = TransportConfig::default();
        assert!(config.enabled);
        assert!(!config.intercepts_all_requests);
        assert!(!config.automatically_removes_serviced_requests);
        assert!(!config.verification_enabled);
        assert!(config.default_headers.is_empty());
        assert_eq!(config.scheduler_threads, 2);
    }

    #[test]
    fn test_yaml_accepts_camel_case() {
        let config = TransportConfig::from_yaml_str(
            r#"
interceptsAllRequests: true
verificationEnabled: true
defaultHeaders:
  Accept: application/json
"#,
        )
        .unwrap();
        assert!(config.intercepts_all_requests);
        assert!(config.verification_enabled);
        assert!(!config.automatically_removes_serviced_requests);
        assert_eq!(config.default_headers["accept"], "application/json");
    }

    #[test]
    fn test_invalid_default_header_is_rejected() {
        let result = TransportConfig::from_yaml_str("defaultHeaders:\n  \"bad name\": x\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_json_accepts_snake_case() {
        let config = TransportConfig::from_json_str(
            r#"{"automatically_removes_serviced_requests": true, "enabled": false}"#,
        )
        .unwrap();
        assert!(config.automatically_removes_serviced_requests);
        assert!(!config.enabled);
    }

    #[test]
    fn test_rejects_unknown_keys_and_zero_threads() {
        assert!(matches!(
            TransportConfig::from_yaml_str("interceptAll: true"),
            Err(MockError::ConfigParse(_))
        ));
        assert!(matches!(
            TransportConfig::from_yaml_str("scheduler_threads: 0"),
            Err(MockError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"interceptsAllRequests": true}}"#).unwrap();
        let config = TransportConfig::from_file(file.path()).unwrap();
        assert!(config.intercepts_all_requests);

        assert!(matches!(
            TransportConfig::from_file("/nonexistent/netmock.yaml"),
            Err(MockError::ConfigIo(_))
        ));
    }
}
