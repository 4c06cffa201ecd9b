//! Ordered, short-circuiting evaluation of a guard sequence.

use std::sync::Arc;

use tracing::debug;

use turnstile_core::{ConfigurationError, TransitionRequest};

use crate::{Guard, GuardVerdict};

/// Evaluate `guards` strictly in order against one transition attempt.
///
/// Each guard is awaited in turn — never concurrently — because a later
/// guard's relevance can depend on an earlier verdict, and a short-circuit
/// must stop work eagerly. The first non-`Allow` verdict is returned as the
/// chain's verdict; if every guard allows, the chain allows.
pub async fn evaluate_chain(
    guards: &[Arc<dyn Guard>],
    request: &TransitionRequest,
) -> Result<GuardVerdict, ConfigurationError> {
    for (index, guard) in guards.iter().enumerate() {
        let verdict = guard.evaluate(request).await?;

        if !verdict.is_allow() {
            debug!(
                transition = %request.id(),
                index,
                target = %request.target(),
                ?verdict,
                "guard chain short-circuited"
            );
            return Ok(verdict);
        }
    }

    Ok(GuardVerdict::Allow)
}
