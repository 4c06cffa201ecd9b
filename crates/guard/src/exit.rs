//! Exit gating, delegated entirely to the active view.

use std::sync::Arc;

use async_trait::async_trait;

use turnstile_core::{ConfigurationError, TransitionRequest};

use crate::{DenyReason, ExitReadiness, Guard, GuardVerdict};

/// Adapts the active view's optional [`ExitReadiness`] capability into the
/// uniform [`Guard`] contract.
///
/// The guard itself holds no opinion: no capability means exit is always
/// allowed, and an unwilling view blocks in place — exit guards never
/// redirect.
pub struct ExitGuard {
    readiness: Option<Arc<dyn ExitReadiness>>,
}

impl ExitGuard {
    pub fn new(readiness: Option<Arc<dyn ExitReadiness>>) -> Self {
        Self { readiness }
    }
}

#[async_trait]
impl Guard for ExitGuard {
    async fn evaluate(
        &self,
        _request: &TransitionRequest,
    ) -> Result<GuardVerdict, ConfigurationError> {
        let verdict = match &self.readiness {
            None => GuardVerdict::Allow,
            Some(view) => {
                if view.can_exit().await {
                    GuardVerdict::Allow
                } else {
                    GuardVerdict::Deny(DenyReason::ExitBlocked)
                }
            }
        };

        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use turnstile_core::Location;

    use super::*;

    struct FixedReadiness(bool);

    #[async_trait]
    impl ExitReadiness for FixedReadiness {
        async fn can_exit(&self) -> bool {
            self.0
        }
    }

    fn request() -> TransitionRequest {
        TransitionRequest::new(Location::new("/details/42"), Location::new("/"))
    }

    #[tokio::test]
    async fn absent_capability_always_allows() {
        let guard = ExitGuard::new(None);
        assert_eq!(guard.evaluate(&request()).await.unwrap(), GuardVerdict::Allow);
    }

    #[tokio::test]
    async fn willing_view_allows() {
        let guard = ExitGuard::new(Some(Arc::new(FixedReadiness(true))));
        assert_eq!(guard.evaluate(&request()).await.unwrap(), GuardVerdict::Allow);
    }

    #[tokio::test]
    async fn unwilling_view_blocks_in_place() {
        let guard = ExitGuard::new(Some(Arc::new(FixedReadiness(false))));
        assert_eq!(
            guard.evaluate(&request()).await.unwrap(),
            GuardVerdict::Deny(DenyReason::ExitBlocked)
        );
    }
}
