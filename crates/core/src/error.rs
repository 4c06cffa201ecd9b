//! Fatal misconfiguration errors.

use thiserror::Error;

/// A routing-table/configuration bug (e.g. a role-gated location without a
/// declared role).
///
/// Deliberately distinct from an access denial: denials resolve to verdicts,
/// while this propagates to the application's top-level error reporting and
/// must never be silently swallowed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("configuration error: {0}")]
pub struct ConfigurationError(String);

impl ConfigurationError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}
