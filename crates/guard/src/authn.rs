//! Authentication guards (stateless token freshness checks).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use turnstile_auth::{Claims, CredentialStore, decode, is_expired};
use turnstile_core::{ConfigurationError, TransitionRequest};

use crate::{DenyReason, Guard, GuardVerdict};

/// Authenticate against the credential store as of `now`.
///
/// Fail closed: a missing token, an undecodable token, and an expired one
/// all collapse to `Unauthenticated`. Re-running with the same stored token
/// and clock yields the same answer.
pub fn authenticate(
    store: &dyn CredentialStore,
    now: DateTime<Utc>,
) -> Result<Claims, DenyReason> {
    let Some(token) = store.get() else {
        debug!("no token in credential store");
        return Err(DenyReason::Unauthenticated);
    };

    let claims = match decode(&token) {
        Ok(claims) => claims,
        Err(err) => {
            debug!(%err, "stored token failed to decode");
            return Err(DenyReason::Unauthenticated);
        }
    };

    if is_expired(&claims, now) {
        debug!("stored token is expired");
        return Err(DenyReason::Unauthenticated);
    }

    Ok(claims)
}

/// Guard that only requires a live authenticated session.
pub struct AuthenticationGuard {
    store: Arc<dyn CredentialStore>,
}

impl AuthenticationGuard {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Guard for AuthenticationGuard {
    async fn evaluate(
        &self,
        _request: &TransitionRequest,
    ) -> Result<GuardVerdict, ConfigurationError> {
        Ok(match authenticate(self.store.as_ref(), Utc::now()) {
            Ok(_claims) => GuardVerdict::Allow,
            Err(reason) => GuardVerdict::Deny(reason),
        })
    }
}

/// Load-phase twin of [`AuthenticationGuard`].
///
/// Same verdict logic; the placement is what matters. The coordinator runs
/// load guards before it invokes the target's module fetch, so a deny here
/// means the bundle is never pulled at all.
pub struct LoadGuard {
    store: Arc<dyn CredentialStore>,
}

impl LoadGuard {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Guard for LoadGuard {
    async fn evaluate(
        &self,
        _request: &TransitionRequest,
    ) -> Result<GuardVerdict, ConfigurationError> {
        Ok(match authenticate(self.store.as_ref(), Utc::now()) {
            Ok(_claims) => GuardVerdict::Allow,
            Err(reason) => GuardVerdict::Deny(reason),
        })
    }
}
