//! Credential storage abstraction.
//!
//! The pipeline only ever *reads* the store; writes (login/logout) happen
//! elsewhere and simply change what the next transition attempt observes.

use std::sync::{Arc, PoisonError, RwLock};

use crate::BearerToken;

/// Key-value credential store capability.
///
/// Implementations decide the persistence medium (browser storage, keyring,
/// plain memory); the pipeline never assumes one.
pub trait CredentialStore: Send + Sync {
    /// The current token, if a principal is logged in.
    fn get(&self) -> Option<BearerToken>;

    /// Store a token (login).
    fn set(&self, token: BearerToken);

    /// Drop the stored token (logout).
    fn clear(&self);
}

impl<S> CredentialStore for Arc<S>
where
    S: CredentialStore + ?Sized,
{
    fn get(&self) -> Option<BearerToken> {
        (**self).get()
    }

    fn set(&self, token: BearerToken) {
        (**self).set(token)
    }

    fn clear(&self) {
        (**self).clear()
    }
}

/// In-memory credential store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    token: RwLock<Option<BearerToken>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor for a store that already holds a token.
    pub fn with_token(token: BearerToken) -> Self {
        Self {
            token: RwLock::new(Some(token)),
        }
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn get(&self) -> Option<BearerToken> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, token: BearerToken) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    fn clear(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
