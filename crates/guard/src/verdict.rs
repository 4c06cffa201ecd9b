use thiserror::Error;

use turnstile_auth::Role;
use turnstile_core::Location;

/// Why a guard refused a transition.
///
/// Closed set: every denial this pipeline can produce is one of these, so
/// callers can match exhaustively when deciding what to show the user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// No token, an undecodable token, or an expired one.
    #[error("not authenticated")]
    Unauthenticated,

    /// Authenticated, but the token's role is not the one the target
    /// location expects.
    #[error("token role does not satisfy required role '{required}'")]
    RoleMismatch {
        required: Role,
        actual: Option<Role>,
    },

    /// The active view refused to be left (e.g. unsaved edits).
    #[error("active view blocked the exit")]
    ExitBlocked,
}

/// Outcome of one guard evaluation.
///
/// Exactly one verdict is produced per guard per transition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardVerdict {
    Allow,
    Deny(DenyReason),
    Redirect(Location),
}

impl GuardVerdict {
    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow)
    }
}
