//! Login / sign-up form

use crate::routes::{NavigateOptions, Navigator, Route};
use crate::{CoreError, CoreResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const MSG_NEEDS_VERIFICATION: &str = "Additional verification is required.";
pub const MSG_GENERIC_FAILURE: &str = "Something went wrong.";
pub const MSG_SSO_FAILURE: &str = "SSO sign-in failed.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
    Github,
    Microsoft,
}

impl OAuthProvider {
    /// Strategy name understood by the identity provider
    pub fn strategy(&self) -> String {
        let name = match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Github => "github",
            OAuthProvider::Microsoft => "microsoft",
        };
        format!("oauth_{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub email_address: String,
    pub password: String,
}

/// Result of a sign-in or sign-up attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptStatus {
    Complete { session_id: String },
    NeedsVerification,
}

/// Authentication calls of the identity provider.
///
/// Errors carry the provider's user-facing text in their message when there
/// is one.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> CoreResult<AttemptStatus>;

    async fn sign_up(&self, request: SignUpRequest) -> CoreResult<AttemptStatus>;

    async fn activate(&self, session_id: &str) -> CoreResult<()>;

    async fn start_oauth(
        &self,
        strategy: &str,
        redirect_url: &str,
        redirect_url_complete: &str,
    ) -> CoreResult<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub mode: AuthMode,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub loading: bool,
    pub error: Option<String>,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_mode(&mut self, mode: AuthMode) {
        self.mode = mode;
        self.error = None;
    }

    fn sign_up_request(&self) -> SignUpRequest {
        let non_empty = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };
        SignUpRequest {
            first_name: non_empty(&self.first_name),
            last_name: non_empty(&self.last_name),
            email_address: self.email.clone(),
            password: self.password.clone(),
        }
    }

    /// Submit the form in its current mode. On success the shell is sent to
    /// the root, where role resolution takes over.
    pub async fn submit(&mut self, backend: &dyn AuthBackend, navigator: &dyn Navigator) {
        self.error = None;
        self.loading = true;

        let attempt = match self.mode {
            AuthMode::SignIn => backend.sign_in(&self.email, &self.password).await,
            AuthMode::SignUp => backend.sign_up(self.sign_up_request()).await,
        };

        let outcome = match attempt {
            Ok(AttemptStatus::Complete { session_id }) => {
                backend.activate(&session_id).await.map(|_| true)
            }
            Ok(AttemptStatus::NeedsVerification) => Ok(false),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(true) => {
                tracing::info!("Session activated");
                navigator.navigate(Route::Home.path(), NavigateOptions::replace());
            }
            Ok(false) => self.error = Some(MSG_NEEDS_VERIFICATION.to_string()),
            Err(e) => {
                tracing::error!("Authentication failed: {}", e);
                self.error = Some(backend_message(&e, MSG_GENERIC_FAILURE));
            }
        }

        self.loading = false;
    }

    /// Hand off to an OAuth provider; it comes back through the SSO callback.
    pub async fn start_oauth(&mut self, provider: OAuthProvider, backend: &dyn AuthBackend) {
        self.error = None;
        let result = backend
            .start_oauth(
                &provider.strategy(),
                Route::SsoCallback.path(),
                Route::Home.path(),
            )
            .await;

        if let Err(e) = result {
            tracing::error!("SSO sign-in failed: {}", e);
            self.error = Some(backend_message(&e, MSG_SSO_FAILURE));
        }
    }
}

fn backend_message(error: &CoreError, fallback: &str) -> String {
    match error {
        CoreError::Transport(msg) | CoreError::RoleAssignment(msg) | CoreError::Config(msg)
            if !msg.trim().is_empty() =>
        {
            msg.clone()
        }
        _ => fallback.to_string(),
    }
}
