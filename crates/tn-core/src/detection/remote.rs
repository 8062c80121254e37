//! Remote image classifier client

use super::{Classifier, ImageUpload, ScanPayload, Verdict};
use crate::{CoreError, CoreResult, DetectConfig};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

/// Multipart field carrying the image bytes
pub const IMAGE_FIELD: &str = "input_image";

/// Decision value the classifier uses for phishing content
pub const DECISION_PHISHED: &str = "PHISHED";

/// Body returned by the classifier endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierResponse {
    pub decision: String,
    pub message: String,
}

impl ClassifierResponse {
    /// Parse a raw response body
    pub fn parse(body: &str) -> CoreResult<Self> {
        serde_json::from_str(body).map_err(|e| CoreError::MalformedResponse(e.to_string()))
    }

    pub fn into_verdict(self) -> Verdict {
        if self.decision == DECISION_PHISHED {
            Verdict::Threat {
                message: self.message,
            }
        } else {
            Verdict::Safe {
                message: self.message,
            }
        }
    }
}

/// HTTP client for the image classification endpoint
pub struct RemoteClassifier {
    client: reqwest::Client,
    url: String,
}

impl RemoteClassifier {
    pub fn new(config: &DetectConfig) -> CoreResult<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| CoreError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.image_url(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn build_form(image: &ImageUpload) -> CoreResult<Form> {
        let mut part = Part::bytes(image.bytes.clone()).file_name(image.file_name.clone());
        if let Some(content_type) = &image.content_type {
            part = part
                .mime_str(content_type)
                .map_err(|e| CoreError::Transport(e.to_string()))?;
        }
        Ok(Form::new().part(IMAGE_FIELD, part))
    }

    /// Upload an image and return the classifier's decision
    pub async fn classify_image(&self, image: &ImageUpload) -> CoreResult<Verdict> {
        tracing::info!(
            "Uploading {} ({} bytes, SHA256: {}) to {}",
            image.file_name,
            image.bytes.len(),
            image.sha256(),
            self.url
        );

        let form = Self::build_form(image)?;
        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| CoreError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CoreError::Transport(e.to_string()))?;
        tracing::debug!("Raw response from classifier ({}): {}", status, body);

        if !status.is_success() {
            return Err(CoreError::Transport(format!(
                "classifier answered with status {}",
                status
            )));
        }

        Ok(ClassifierResponse::parse(&body)?.into_verdict())
    }
}

#[async_trait]
impl Classifier for RemoteClassifier {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn classify(&self, payload: &ScanPayload) -> CoreResult<Verdict> {
        match payload {
            ScanPayload::Image(image) => self.classify_image(image).await,
            ScanPayload::Text { scan_type, .. } => Err(CoreError::Config(format!(
                "remote classifier does not handle {} scans",
                scan_type
            ))),
        }
    }
}
