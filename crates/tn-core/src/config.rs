//! Detection configuration

use crate::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const ENV_CLASSIFIER_URL: &str = "TRUSTNET_CLASSIFIER_URL";
pub const ENV_TIMEOUT_SECS: &str = "TRUSTNET_TIMEOUT_SECS";

const DEFAULT_CLASSIFIER_URL: &str = "http://localhost:3000";
const DEFAULT_IMAGE_ENDPOINT: &str = "/api/image";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SIMULATED_LATENCY_MS: u64 = 1500;
const DEFAULT_THREAT_THRESHOLD: f64 = 0.7;

/// Settings for the classifiers used by the detection workflow
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectConfig {
    /// Base URL of the remote classifier
    pub classifier_base_url: String,
    /// Path of the image classification endpoint
    pub image_endpoint: String,
    /// Request timeout (seconds)
    pub request_timeout_secs: u64,
    /// Artificial latency of the simulated classifier (milliseconds)
    pub simulated_latency_ms: u64,
    /// Draws above this value are classified as threats
    pub threat_threshold: f64,
    /// User agent string
    pub user_agent: String,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            classifier_base_url: std::env::var(ENV_CLASSIFIER_URL)
                .unwrap_or_else(|_| DEFAULT_CLASSIFIER_URL.to_string()),
            image_endpoint: DEFAULT_IMAGE_ENDPOINT.to_string(),
            request_timeout_secs: std::env::var(ENV_TIMEOUT_SECS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            simulated_latency_ms: DEFAULT_SIMULATED_LATENCY_MS,
            threat_threshold: DEFAULT_THREAT_THRESHOLD,
            user_agent: format!("TrustNet/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl DetectConfig {
    /// Full URL of the image endpoint.
    pub fn image_url(&self) -> String {
        format!(
            "{}/{}",
            self.classifier_base_url.trim_end_matches('/'),
            self.image_endpoint.trim_start_matches('/')
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.classifier_base_url.trim().is_empty() {
            return Err(CoreError::Config(
                "classifier base URL must not be empty".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.threat_threshold) {
            return Err(CoreError::Config(format!(
                "threat threshold {} is outside [0, 1]",
                self.threat_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        let config = DetectConfig::default();
        assert_eq!(config.image_endpoint, "/api/image");
        assert_eq!(config.simulated_latency_ms, 1500);
        assert!((config.threat_threshold - 0.7).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_image_url_joins_cleanly() {
        let config = DetectConfig {
            classifier_base_url: "http://localhost:3000/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.image_url(), "http://localhost:3000/api/image");
    }

    #[test]
    fn test_validate_rejects_bad_threshold() {
        let config = DetectConfig {
            threat_threshold: 1.5,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let config = DetectConfig {
            classifier_base_url: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
