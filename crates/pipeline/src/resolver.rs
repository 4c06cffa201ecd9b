//! Resolver stage: named data fetches joined before commit.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::debug;

use turnstile_core::{ResolvedBundle, TransitionRequest};

/// A named data dependency fetched before a transition commits.
///
/// Resolvers are reads, not gates: they must be idempotent and free of
/// navigation-visible side effects, because a superseded transition may
/// invoke them and then discard everything they produced.
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(&self, request: &TransitionRequest) -> anyhow::Result<JsonValue>;
}

/// Failure of the resolver stage.
#[derive(Debug, Error)]
#[error("resolver '{failed_name}' failed: {cause}")]
pub struct ResolutionError {
    pub failed_name: String,
    pub cause: anyhow::Error,
}

/// Run every resolver concurrently and join the results.
///
/// Resolvers are independent reads, so they all start at once; the stage
/// waits for every one of them. All-or-nothing: any failure fails the whole
/// stage and no partial bundle is produced. If several resolvers fail, the
/// first failing name in map order is reported.
pub async fn resolve_all(
    resolvers: &BTreeMap<String, Arc<dyn Resolver>>,
    request: &TransitionRequest,
) -> Result<ResolvedBundle, ResolutionError> {
    let pending = resolvers.iter().map(|(name, resolver)| async move {
        (name.clone(), resolver.resolve(request).await)
    });

    let mut resolved = BTreeMap::new();
    for (name, result) in join_all(pending).await {
        match result {
            Ok(value) => {
                resolved.insert(name, value);
            }
            Err(cause) => {
                debug!(transition = %request.id(), resolver = %name, "resolver failed");
                return Err(ResolutionError {
                    failed_name: name,
                    cause,
                });
            }
        }
    }

    Ok(ResolvedBundle::from(resolved))
}
