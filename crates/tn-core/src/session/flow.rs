//! Post sign-in role resolution
//!
//! Runs when the session page mounts and again whenever the identity
//! changes. Every path ends in exactly one replacing redirect; after that the
//! flow is settled and ignores further evaluations.

use super::{Identity, Metadata, Role, SessionState, ROLE_KEY};
use crate::routes::{NavigateOptions, Navigator, Route};
use crate::{CoreError, CoreResult};
use async_trait::async_trait;
use serde_json::Value;

/// Mutation capability of the identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Persist the given metadata on the signed-in identity
    async fn update_metadata(&self, metadata: Metadata) -> CoreResult<()>;
}

/// Assign `role` to an identity, keeping its other metadata.
///
/// This is the only place the role flow writes to the identity.
pub async fn ensure_role(
    identity: &Identity,
    role: Role,
    provider: &dyn IdentityProvider,
) -> CoreResult<()> {
    let mut metadata = identity.metadata.clone();
    metadata.insert(ROLE_KEY.to_string(), Value::String(role.as_str().to_string()));

    provider.update_metadata(metadata).await.map_err(|e| match e {
        CoreError::RoleAssignment(_) => e,
        other => CoreError::RoleAssignment(other.to_string()),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
    /// Identity not loaded yet
    Waiting,
    /// A redirect was issued by this evaluation
    Redirected(Route),
    /// An earlier evaluation already redirected
    Settled(Route),
}

#[derive(Debug, Default)]
pub struct RoleResolutionFlow {
    redirected_to: Option<Route>,
    assignment_attempted: bool,
}

impl RoleResolutionFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn redirected_to(&self) -> Option<Route> {
        self.redirected_to
    }

    pub async fn evaluate(
        &mut self,
        identity: &Identity,
        provider: &dyn IdentityProvider,
        navigator: &dyn Navigator,
    ) -> FlowOutcome {
        if let Some(route) = self.redirected_to {
            return FlowOutcome::Settled(route);
        }

        let target = match SessionState::of(identity) {
            SessionState::Loading => return FlowOutcome::Waiting,
            SessionState::Unauthenticated => Route::Login,
            SessionState::RoleKnown(role) => role.dashboard(),
            SessionState::RoleMissing => self.assign_default_role(identity, provider).await,
            SessionState::UnknownRole(value) => {
                let err = CoreError::UnknownRole(value);
                tracing::error!("{}, sending identity back to login", err);
                Route::Login
            }
        };

        tracing::info!("Session resolved, redirecting to {}", target);
        navigator.navigate(target.path(), NavigateOptions::replace());
        self.redirected_to = Some(target);
        FlowOutcome::Redirected(target)
    }

    async fn assign_default_role(
        &mut self,
        identity: &Identity,
        provider: &dyn IdentityProvider,
    ) -> Route {
        if self.assignment_attempted {
            return Route::Login;
        }
        self.assignment_attempted = true;

        match ensure_role(identity, Role::User, provider).await {
            Ok(()) => {
                tracing::info!("Assigned default role '{}'", Role::User);
                Role::User.dashboard()
            }
            Err(e) => {
                tracing::error!("Failed to set default role: {}", e);
                Route::Login
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::testing::RecordingNavigator;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeProvider {
        fail: bool,
        updates: Mutex<Vec<Metadata>>,
    }

    impl FakeProvider {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn updates(&self) -> Vec<Metadata> {
            self.updates.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl IdentityProvider for FakeProvider {
        async fn update_metadata(&self, metadata: Metadata) -> CoreResult<()> {
            self.updates.lock().unwrap().push(metadata);
            if self.fail {
                Err(CoreError::Transport("session expired".into()))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_loading_takes_no_action() {
        let provider = FakeProvider::default();
        let nav = RecordingNavigator::at("/");
        let mut flow = RoleResolutionFlow::new();

        let outcome = flow.evaluate(&Identity::loading(), &provider, &nav).await;

        assert_eq!(outcome, FlowOutcome::Waiting);
        assert!(nav.calls().is_empty());
        assert!(provider.updates().is_empty());
    }

    #[tokio::test]
    async fn test_signed_out_goes_to_login() {
        let provider = FakeProvider::default();
        let nav = RecordingNavigator::at("/");
        let mut flow = RoleResolutionFlow::new();

        let outcome = flow.evaluate(&Identity::signed_out(), &provider, &nav).await;

        assert_eq!(outcome, FlowOutcome::Redirected(Route::Login));
        assert_eq!(nav.calls(), vec!["replace /login"]);
        assert!(provider.updates().is_empty());
    }

    #[tokio::test]
    async fn test_known_roles_go_to_dashboards() {
        for (role, path) in [("admin", "/dashboard-admin"), ("user", "/dashboard-user")] {
            let provider = FakeProvider::default();
            let nav = RecordingNavigator::at("/");
            let mut flow = RoleResolutionFlow::new();

            flow.evaluate(&Identity::with_role(role), &provider, &nav).await;

            assert_eq!(nav.calls(), vec![format!("replace {}", path)]);
            assert!(provider.updates().is_empty());
        }
    }

    #[tokio::test]
    async fn test_missing_role_is_assigned() {
        let provider = FakeProvider::default();
        let nav = RecordingNavigator::at("/");
        let mut flow = RoleResolutionFlow::new();
        let mut metadata = Metadata::new();
        metadata.insert("theme".to_string(), json!("dark"));

        let outcome = flow
            .evaluate(&Identity::signed_in(metadata), &provider, &nav)
            .await;

        assert_eq!(outcome, FlowOutcome::Redirected(Route::UserDashboard));
        let updates = provider.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].get("role"), Some(&json!("user")));
        assert_eq!(updates[0].get("theme"), Some(&json!("dark")));
    }

    #[tokio::test]
    async fn test_failed_assignment_goes_to_login() {
        let provider = FakeProvider::failing();
        let nav = RecordingNavigator::at("/");
        let mut flow = RoleResolutionFlow::new();

        let outcome = flow
            .evaluate(&Identity::signed_in(Metadata::new()), &provider, &nav)
            .await;

        assert_eq!(outcome, FlowOutcome::Redirected(Route::Login));
        assert_eq!(provider.updates().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_role_goes_to_login() {
        let provider = FakeProvider::default();
        let nav = RecordingNavigator::at("/");
        let mut flow = RoleResolutionFlow::new();

        let outcome = flow
            .evaluate(&Identity::with_role("superuser"), &provider, &nav)
            .await;

        assert_eq!(outcome, FlowOutcome::Redirected(Route::Login));
        assert!(provider.updates().is_empty());
    }

    #[tokio::test]
    async fn test_settled_flow_ignores_identity_changes() {
        let provider = FakeProvider::default();
        let nav = RecordingNavigator::at("/");
        let mut flow = RoleResolutionFlow::new();

        assert_eq!(
            flow.evaluate(&Identity::loading(), &provider, &nav).await,
            FlowOutcome::Waiting
        );
        flow.evaluate(&Identity::signed_in(Metadata::new()), &provider, &nav)
            .await;
        let outcome = flow
            .evaluate(&Identity::signed_in(Metadata::new()), &provider, &nav)
            .await;

        assert_eq!(outcome, FlowOutcome::Settled(Route::UserDashboard));
        assert_eq!(provider.updates().len(), 1);
        assert_eq!(nav.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_ensure_role_wraps_provider_errors() {
        let provider = FakeProvider::failing();
        let err = ensure_role(&Identity::signed_in(Metadata::new()), Role::User, &provider)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::RoleAssignment(_)));
    }
}
