use async_trait::async_trait;

use turnstile_core::{ConfigurationError, TransitionRequest};

use crate::GuardVerdict;

/// A unit of navigation policy.
///
/// One invocation yields exactly one verdict; evaluation may suspend (no
/// streaming, no multiple emissions). The `Err` escape is reserved for
/// routing-table bugs — it is fatal to the whole transition and is never
/// a substitute for `Deny`.
#[async_trait]
pub trait Guard: Send + Sync {
    async fn evaluate(
        &self,
        request: &TransitionRequest,
    ) -> Result<GuardVerdict, ConfigurationError>;
}

/// Exit-readiness capability, optionally exposed by the active view.
///
/// A view with unsaved edits would answer `false` here; a view that does
/// not expose the capability at all is always considered ready.
#[async_trait]
pub trait ExitReadiness: Send + Sync {
    async fn can_exit(&self) -> bool;
}
