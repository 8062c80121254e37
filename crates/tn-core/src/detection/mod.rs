//! Threat detection workflow
//!
//! A user picks a scan type, supplies content for it, and asks for a verdict.
//! Image scans go to the remote classifier; every other type is answered by
//! an injectable [`Classifier`] whose default is a random stand-in.

pub mod classifier;
pub mod remote;
pub mod workflow;

pub use classifier::{Classifier, SimulatedClassifier};
pub use remote::{ClassifierResponse, RemoteClassifier};
pub use workflow::{DetectionWorkflow, ScanCompletion, ScanTicket};

use crate::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::str::FromStr;

/// Content category a user can submit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanType {
    #[default]
    Url,
    Image,
    Email,
    Qr,
    File,
}

impl ScanType {
    pub const ALL: [ScanType; 5] = [
        ScanType::Url,
        ScanType::Image,
        ScanType::Email,
        ScanType::Qr,
        ScanType::File,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            ScanType::Url => "url",
            ScanType::Image => "image",
            ScanType::Email => "email",
            ScanType::Qr => "qr",
            ScanType::File => "file",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScanType::Url => "URL Scan",
            ScanType::Image => "Image Scan",
            ScanType::Email => "Email Analysis",
            ScanType::Qr => "QR Code Scan",
            ScanType::File => "File Scan",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            ScanType::Url => "Enter URL to scan...",
            ScanType::Image => "Upload image file...",
            ScanType::Email => "Paste email content...",
            ScanType::Qr => "Upload QR code image...",
            ScanType::File => "Upload file to scan...",
        }
    }

    /// Image scans take a binary upload; all others take text.
    pub fn takes_image(&self) -> bool {
        matches!(self, ScanType::Image)
    }
}

impl std::fmt::Display for ScanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for ScanType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScanType::ALL
            .into_iter()
            .find(|t| t.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::Config(format!("unknown scan type '{}'", s)))
    }
}

/// An image selected for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = guess_image_mime(&file_name).map(str::to_string);
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    /// Load an image from disk
    pub fn from_path(path: &Path) -> CoreResult<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload.bin".to_string());
        Ok(Self::new(file_name, bytes))
    }

    /// SHA-256 of the image bytes, hex encoded
    pub fn sha256(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.bytes);
        hex::encode(hasher.finalize())
    }
}

fn guess_image_mime(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// Content handed to a classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanPayload {
    Text { scan_type: ScanType, content: String },
    Image(ImageUpload),
}

impl ScanPayload {
    pub fn scan_type(&self) -> ScanType {
        match self {
            ScanPayload::Text { scan_type, .. } => *scan_type,
            ScanPayload::Image(_) => ScanType::Image,
        }
    }
}

/// Classification produced by a classifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "lowercase")]
pub enum Verdict {
    Safe { message: String },
    Threat { message: String },
}

/// Status of a scan result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    #[default]
    Pending,
    Safe,
    Threat,
    Error,
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanStatus::Pending => write!(f, "pending"),
            ScanStatus::Safe => write!(f, "safe"),
            ScanStatus::Threat => write!(f, "threat"),
            ScanStatus::Error => write!(f, "error"),
        }
    }
}

/// Outcome of a scan as shown to the user
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScanResult {
    pub status: ScanStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ScanResult {
    pub fn pending() -> Self {
        Self::default()
    }

    pub fn safe(message: impl Into<String>) -> Self {
        Self::terminal(ScanStatus::Safe, message)
    }

    pub fn threat(message: impl Into<String>) -> Self {
        Self::terminal(ScanStatus::Threat, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::terminal(ScanStatus::Error, message)
    }

    fn terminal(status: ScanStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            completed_at: Some(Utc::now()),
        }
    }

    /// Map a classifier outcome onto a displayable result.
    pub fn from_outcome(outcome: CoreResult<Verdict>) -> Self {
        match outcome {
            Ok(Verdict::Threat { message }) => Self::threat(message),
            Ok(Verdict::Safe { message }) => Self::safe(message),
            Err(e) => Self::error(e.user_message()),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ScanStatus::Pending
    }

    pub fn is_threat(&self) -> bool {
        self.status == ScanStatus::Threat
    }

    /// Banner text for the verdict panel, if there is one to show.
    pub fn headline(&self) -> Option<&'static str> {
        match self.status {
            ScanStatus::Pending => None,
            ScanStatus::Threat => Some("THREAT DETECTED"),
            ScanStatus::Safe => Some("CONTENT IS SAFE"),
            ScanStatus::Error => Some("SCAN FAILED"),
        }
    }
}
