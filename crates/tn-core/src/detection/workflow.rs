//! Detection workflow state machine

use super::{
    Classifier, ImageUpload, RemoteClassifier, ScanPayload, ScanResult, ScanType,
    SimulatedClassifier,
};
use crate::{CoreError, CoreResult, DetectConfig};
use std::sync::Arc;
use uuid::Uuid;

/// A scan that passed its guards and is ready to be sent to a classifier.
///
/// The ticket owns everything it needs, so the workflow is free to change
/// while the classification is in flight.
pub struct ScanTicket {
    pub id: Uuid,
    pub generation: u64,
    payload: ScanPayload,
    classifier: Arc<dyn Classifier>,
}

impl ScanTicket {
    pub fn payload(&self) -> &ScanPayload {
        &self.payload
    }

    /// Run the classification. This is the only suspension point of a scan.
    pub async fn dispatch(self) -> ScanCompletion {
        tracing::info!(
            scan_id = %self.id,
            generation = self.generation,
            scan_type = %self.payload.scan_type(),
            classifier = self.classifier.name(),
            "Dispatching scan"
        );

        let outcome = self.classifier.classify(&self.payload).await;
        if let Err(e) = &outcome {
            tracing::error!(scan_id = %self.id, "Scan failed: {}", e);
        }

        ScanCompletion {
            id: self.id,
            generation: self.generation,
            result: ScanResult::from_outcome(outcome),
        }
    }
}

/// Settled classification, tagged with the generation it was issued for
#[derive(Debug, Clone)]
pub struct ScanCompletion {
    pub id: Uuid,
    pub generation: u64,
    pub result: ScanResult,
}

/// Scan type selection, input capture and verdict for one detect page
pub struct DetectionWorkflow {
    selected: ScanType,
    text_input: String,
    image: Option<ImageUpload>,
    scanning: bool,
    result: ScanResult,
    generation: u64,
    image_classifier: Arc<dyn Classifier>,
    content_classifier: Arc<dyn Classifier>,
}

impl DetectionWorkflow {
    pub fn new(
        image_classifier: Arc<dyn Classifier>,
        content_classifier: Arc<dyn Classifier>,
    ) -> Self {
        Self {
            selected: ScanType::default(),
            text_input: String::new(),
            image: None,
            scanning: false,
            result: ScanResult::pending(),
            generation: 0,
            image_classifier,
            content_classifier,
        }
    }

    /// Remote classifier for images, simulated classifier for everything else
    pub fn from_config(config: &DetectConfig) -> CoreResult<Self> {
        let remote = RemoteClassifier::new(config)?;
        Ok(Self::new(
            Arc::new(remote),
            Arc::new(SimulatedClassifier::new(config)),
        ))
    }

    pub fn selected_type(&self) -> ScanType {
        self.selected
    }

    pub fn text_input(&self) -> &str {
        &self.text_input
    }

    pub fn image(&self) -> Option<&ImageUpload> {
        self.image.as_ref()
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning
    }

    pub fn result(&self) -> &ScanResult {
        &self.result
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Switch scan type. Clears all input and the verdict, and orphans any
    /// scan still in flight.
    pub fn select_type(&mut self, scan_type: ScanType) {
        tracing::debug!("Selecting scan type {}", scan_type);
        self.selected = scan_type;
        self.text_input.clear();
        self.image = None;
        self.result = ScanResult::pending();
        self.scanning = false;
        self.generation += 1;
    }

    pub fn set_input(&mut self, value: impl Into<String>) {
        self.text_input = value.into();
    }

    pub fn set_image(&mut self, image: Option<ImageUpload>) {
        self.image = image;
    }

    /// Whether the analyze action should be enabled.
    pub fn can_scan(&self) -> bool {
        if self.scanning {
            return false;
        }
        if self.selected.takes_image() {
            self.image.is_some()
        } else {
            !self.text_input.trim().is_empty()
        }
    }

    /// Apply the scan guards and hand out a ticket for dispatch.
    ///
    /// Returns `None` when nothing has to be sent: a scan is already running,
    /// the text input is blank (left untouched), or the image is missing (the
    /// result is set to an error immediately).
    pub fn begin_scan(&mut self) -> Option<ScanTicket> {
        if self.scanning {
            tracing::debug!("Scan already in progress, ignoring");
            return None;
        }

        let payload = if self.selected.takes_image() {
            match &self.image {
                Some(image) => ScanPayload::Image(image.clone()),
                None => {
                    self.generation += 1;
                    let err = CoreError::InputMissing("no image selected".to_string());
                    tracing::warn!("{}", err);
                    self.result = ScanResult::error(err.user_message());
                    return None;
                }
            }
        } else {
            if self.text_input.trim().is_empty() {
                return None;
            }
            ScanPayload::Text {
                scan_type: self.selected,
                content: self.text_input.clone(),
            }
        };

        self.scanning = true;
        self.result = ScanResult::pending();
        self.generation += 1;

        let classifier = if self.selected.takes_image() {
            Arc::clone(&self.image_classifier)
        } else {
            Arc::clone(&self.content_classifier)
        };

        Some(ScanTicket {
            id: Uuid::new_v4(),
            generation: self.generation,
            payload,
            classifier,
        })
    }

    /// Store a settled classification. Completions from an older generation
    /// are dropped; returns whether the completion was applied.
    pub fn complete(&mut self, completion: ScanCompletion) -> bool {
        if completion.generation != self.generation {
            tracing::warn!(
                scan_id = %completion.id,
                "Discarding stale scan result (generation {} != {})",
                completion.generation,
                self.generation
            );
            return false;
        }

        tracing::info!(
            scan_id = %completion.id,
            status = %completion.result.status,
            "Scan completed"
        );
        self.result = completion.result;
        self.scanning = false;
        true
    }

    /// Begin, dispatch and complete in one go.
    pub async fn run_scan(&mut self) -> &ScanResult {
        if let Some(ticket) = self.begin_scan() {
            let completion = ticket.dispatch().await;
            self.complete(completion);
        }
        &self.result
    }
}
