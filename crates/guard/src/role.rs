//! Role gate layered on top of authentication.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use turnstile_auth::{CredentialStore, Role};
use turnstile_core::{ConfigurationError, TransitionRequest};

use crate::{DenyReason, Guard, GuardVerdict, authenticate};

/// Metadata key a role-gated location must declare.
pub const EXPECTED_ROLE_KEY: &str = "expected_role";

/// Guard that requires the token's role to match the target's declared role.
///
/// A role-gated location *must* carry [`EXPECTED_ROLE_KEY`] in its metadata;
/// a missing declaration is a routing-table bug, not a denial, and fails the
/// transition with a `ConfigurationError`.
pub struct RoleGuard {
    store: Arc<dyn CredentialStore>,
}

impl RoleGuard {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Guard for RoleGuard {
    async fn evaluate(
        &self,
        request: &TransitionRequest,
    ) -> Result<GuardVerdict, ConfigurationError> {
        let Some(declared) = request.metadata(EXPECTED_ROLE_KEY) else {
            return Err(ConfigurationError::new(format!(
                "location '{}' is role-gated but declares no '{EXPECTED_ROLE_KEY}' metadata",
                request.target()
            )));
        };

        let Some(expected) = declared.as_str() else {
            return Err(ConfigurationError::new(format!(
                "'{EXPECTED_ROLE_KEY}' metadata on '{}' must be a string",
                request.target()
            )));
        };

        // Role checking implies authentication; its deny propagates as-is.
        let claims = match authenticate(self.store.as_ref(), Utc::now()) {
            Ok(claims) => claims,
            Err(reason) => return Ok(GuardVerdict::Deny(reason)),
        };

        // Exact, case-sensitive match.
        let verdict = match claims.role {
            Some(ref role) if role.as_str() == expected => GuardVerdict::Allow,
            actual => GuardVerdict::Deny(DenyReason::RoleMismatch {
                required: Role::new(expected.to_string()),
                actual,
            }),
        };

        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use turnstile_auth::InMemoryCredentialStore;
    use turnstile_core::Location;

    use super::*;
    use crate::testing::fresh_token;

    fn admin_request() -> TransitionRequest {
        TransitionRequest::new(Location::new("/"), Location::new("/admin"))
            .with_metadata(EXPECTED_ROLE_KEY, "admin")
    }

    fn guard_with_role(role: &'static str) -> RoleGuard {
        RoleGuard::new(Arc::new(InMemoryCredentialStore::with_token(fresh_token(
            role,
        ))))
    }

    #[tokio::test]
    async fn missing_declaration_is_a_configuration_error() {
        let guard = guard_with_role("admin");
        let bare = TransitionRequest::new(Location::new("/"), Location::new("/admin"));

        assert!(guard.evaluate(&bare).await.is_err());
    }

    #[tokio::test]
    async fn non_string_declaration_is_a_configuration_error() {
        let guard = guard_with_role("admin");
        let request = TransitionRequest::new(Location::new("/"), Location::new("/admin"))
            .with_metadata(EXPECTED_ROLE_KEY, 7);

        assert!(guard.evaluate(&request).await.is_err());
    }

    #[tokio::test]
    async fn matching_role_allows() {
        let guard = guard_with_role("admin");
        assert_eq!(
            guard.evaluate(&admin_request()).await.unwrap(),
            GuardVerdict::Allow
        );
    }

    #[tokio::test]
    async fn mismatched_role_denies_with_both_roles() {
        let guard = guard_with_role("user");

        let verdict = guard.evaluate(&admin_request()).await.unwrap();

        assert_eq!(
            verdict,
            GuardVerdict::Deny(DenyReason::RoleMismatch {
                required: Role::new("admin"),
                actual: Some(Role::new("user")),
            })
        );
    }

    #[tokio::test]
    async fn comparison_is_case_sensitive() {
        let guard = guard_with_role("Admin");

        let verdict = guard.evaluate(&admin_request()).await.unwrap();

        assert!(matches!(
            verdict,
            GuardVerdict::Deny(DenyReason::RoleMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn unauthenticated_wins_over_role_mismatch() {
        let guard = RoleGuard::new(Arc::new(InMemoryCredentialStore::new()));

        let verdict = guard.evaluate(&admin_request()).await.unwrap();

        assert_eq!(verdict, GuardVerdict::Deny(DenyReason::Unauthenticated));
    }
}
