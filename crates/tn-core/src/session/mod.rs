//! Session handling: role resolution after sign-in and the login form

pub mod flow;
pub mod login;

pub use flow::{ensure_role, FlowOutcome, IdentityProvider, RoleResolutionFlow};
pub use login::{AttemptStatus, AuthBackend, AuthMode, LoginForm, OAuthProvider, SignUpRequest};

use crate::routes::Route;
use crate::CoreError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// Metadata key holding the role claim
pub const ROLE_KEY: &str = "role";

/// Free-form metadata bag attached to an identity
pub type Metadata = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    pub fn dashboard(&self) -> Route {
        match self {
            Role::Admin => Route::AdminDashboard,
            Role::User => Route::UserDashboard,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(CoreError::UnknownRole(other.to_string())),
        }
    }
}

/// Role claim as read from an identity's metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleClaim {
    Missing,
    Known(Role),
    Unknown(String),
}

/// Signed-in user as reported by the identity provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub loaded: bool,
    pub signed_in: bool,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Identity {
    pub fn loading() -> Self {
        Self::default()
    }

    pub fn signed_out() -> Self {
        Self {
            loaded: true,
            ..Default::default()
        }
    }

    pub fn signed_in(metadata: Metadata) -> Self {
        Self {
            loaded: true,
            signed_in: true,
            metadata,
        }
    }

    pub fn with_role(role: &str) -> Self {
        let mut metadata = Metadata::new();
        metadata.insert(ROLE_KEY.to_string(), Value::String(role.to_string()));
        Self::signed_in(metadata)
    }
}

/// Read the role claim without touching the identity.
///
/// An absent, null or empty claim counts as missing; any other value that is
/// not a known role is reported as unknown.
pub fn resolve_role(identity: &Identity) -> RoleClaim {
    match identity.metadata.get(ROLE_KEY) {
        None | Some(Value::Null) => RoleClaim::Missing,
        Some(Value::String(s)) if s.is_empty() => RoleClaim::Missing,
        Some(Value::String(s)) => match s.parse::<Role>() {
            Ok(role) => RoleClaim::Known(role),
            Err(_) => RoleClaim::Unknown(s.clone()),
        },
        Some(other) => RoleClaim::Unknown(other.to_string()),
    }
}

/// Where an identity stands in the role resolution state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    Unauthenticated,
    RoleKnown(Role),
    RoleMissing,
    UnknownRole(String),
}

impl SessionState {
    pub fn of(identity: &Identity) -> Self {
        if !identity.loaded {
            return SessionState::Loading;
        }
        if !identity.signed_in {
            return SessionState::Unauthenticated;
        }
        match resolve_role(identity) {
            RoleClaim::Known(role) => SessionState::RoleKnown(role),
            RoleClaim::Missing => SessionState::RoleMissing,
            RoleClaim::Unknown(value) => SessionState::UnknownRole(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_role() {
        assert_eq!(resolve_role(&Identity::with_role("admin")), RoleClaim::Known(Role::Admin));
        assert_eq!(resolve_role(&Identity::with_role("user")), RoleClaim::Known(Role::User));
        assert_eq!(resolve_role(&Identity::with_role("")), RoleClaim::Missing);
        assert_eq!(resolve_role(&Identity::signed_in(Metadata::new())), RoleClaim::Missing);
        assert_eq!(
            resolve_role(&Identity::with_role("auditor")),
            RoleClaim::Unknown("auditor".to_string())
        );
    }

    #[test]
    fn test_non_string_claim_is_unknown() {
        let mut metadata = Metadata::new();
        metadata.insert(ROLE_KEY.to_string(), json!(3));
        assert_eq!(
            resolve_role(&Identity::signed_in(metadata)),
            RoleClaim::Unknown("3".to_string())
        );
    }

    #[test]
    fn test_session_states() {
        assert_eq!(SessionState::of(&Identity::loading()), SessionState::Loading);
        assert_eq!(SessionState::of(&Identity::signed_out()), SessionState::Unauthenticated);
        assert_eq!(
            SessionState::of(&Identity::with_role("admin")),
            SessionState::RoleKnown(Role::Admin)
        );

        // role is ignored until the provider has loaded
        let mut identity = Identity::with_role("admin");
        identity.loaded = false;
        assert_eq!(SessionState::of(&identity), SessionState::Loading);
    }

    #[test]
    fn test_identity_deserializes_without_metadata() {
        let identity: Identity =
            serde_json::from_str(r#"{"loaded":true,"signed_in":false}"#).unwrap();
        assert_eq!(identity, Identity::signed_out());
    }

    #[test]
    fn test_dashboards() {
        assert_eq!(Role::Admin.dashboard().path(), "/dashboard-admin");
        assert_eq!(Role::User.dashboard().path(), "/dashboard-user");
    }
}
