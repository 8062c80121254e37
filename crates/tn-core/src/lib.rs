//! TrustNet Core
//!
//! This crate holds the stateful parts of the TrustNet front-end: the
//! multi-mode detection workflow that turns user content into a verdict, and
//! the session role resolution flow that routes a signed-in identity to its
//! dashboard. Rendering lives elsewhere; everything here is driven through
//! plain method calls and the capability traits the shell provides.

pub mod config;
pub mod detection;
pub mod report;
pub mod routes;
pub mod session;

use thiserror::Error;

pub use config::DetectConfig;
pub use detection::{
    Classifier, DetectionWorkflow, ImageUpload, RemoteClassifier, ScanCompletion, ScanPayload,
    ScanResult, ScanStatus, ScanTicket, ScanType, SimulatedClassifier, Verdict,
};
pub use routes::{NavigateOptions, Navigator, Route, Shell};
pub use session::{
    FlowOutcome, Identity, IdentityProvider, Role, RoleClaim, RoleResolutionFlow, SessionState,
};

/// Message shown when an image scan is started without a file.
pub const MSG_IMAGE_MISSING: &str = "Please upload an image first!";

/// Message shown when the remote classifier cannot be reached or answers garbage.
pub const MSG_UPLOAD_FAILED: &str = "Error uploading image or parsing response";

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Input missing: {0}")]
    InputMissing(String),

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Role assignment failed: {0}")]
    RoleAssignment(String),

    #[error("Unknown role claim: {0}")]
    UnknownRole(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CoreError {
    /// Short text suitable for an end-user verdict panel.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::InputMissing(_) => MSG_IMAGE_MISSING.to_string(),
            CoreError::Transport(_) | CoreError::MalformedResponse(_) => {
                MSG_UPLOAD_FAILED.to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        assert_eq!(
            CoreError::InputMissing("image".into()).user_message(),
            MSG_IMAGE_MISSING
        );
        assert_eq!(
            CoreError::Transport("connection refused".into()).user_message(),
            MSG_UPLOAD_FAILED
        );
        assert_eq!(
            CoreError::MalformedResponse("eof".into()).user_message(),
            MSG_UPLOAD_FAILED
        );
    }

    #[test]
    fn test_error_display() {
        let err = CoreError::UnknownRole("auditor".into());
        assert_eq!(err.to_string(), "Unknown role claim: auditor");
    }
}
