//! Classifier capability and the simulated stand-in

use super::{ScanPayload, Verdict};
use crate::{CoreResult, DetectConfig};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;

pub const MSG_SIMULATED_THREAT: &str = "THREAT DETECTED: This content contains phishing indicators";
pub const MSG_SIMULATED_SAFE: &str = "SAFE: No threats detected in this content";

/// Produces a verdict for submitted content
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Human readable name (for logs)
    fn name(&self) -> &'static str;

    async fn classify(&self, payload: &ScanPayload) -> CoreResult<Verdict>;
}

/// Random stand-in for the non-image scan types.
///
/// There is no real analysis behind this: after a fixed delay it draws a
/// uniform value and reports a threat when the draw exceeds the threshold.
/// Production deployments replace it with a real [`Classifier`].
pub struct SimulatedClassifier {
    latency: Duration,
    threshold: f64,
    rng: Mutex<StdRng>,
}

impl SimulatedClassifier {
    pub fn new(config: &DetectConfig) -> Self {
        Self {
            latency: config.simulated_latency(),
            threshold: config.threat_threshold,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic variant for tests and demos
    pub fn with_seed(config: &DetectConfig, seed: u64) -> Self {
        Self {
            latency: config.simulated_latency(),
            threshold: config.threat_threshold,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn draw(&self) -> f64 {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen::<f64>()
    }
}

impl Default for SimulatedClassifier {
    fn default() -> Self {
        Self::new(&DetectConfig::default())
    }
}

#[async_trait]
impl Classifier for SimulatedClassifier {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn classify(&self, payload: &ScanPayload) -> CoreResult<Verdict> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let draw = self.draw();
        tracing::debug!(
            scan_type = %payload.scan_type(),
            draw,
            threshold = self.threshold,
            "Simulated classification"
        );

        if draw > self.threshold {
            Ok(Verdict::Threat {
                message: MSG_SIMULATED_THREAT.to_string(),
            })
        } else {
            Ok(Verdict::Safe {
                message: MSG_SIMULATED_SAFE.to_string(),
            })
        }
    }
}
