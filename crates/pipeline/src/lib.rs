//! `turnstile-pipeline` — the navigation-authorization pipeline.
//!
//! Composes the guard chain, the resolver stage, and the routing table into
//! a transition coordinator: one navigation request goes in, one committed
//! or aborted outcome comes out.

pub mod coordinator;
pub mod resolver;
pub mod routes;

pub use coordinator::{
    AbortReason, Coordinator, CoordinatorConfig, DEFAULT_MAX_REDIRECT_HOPS, PipelineError,
    TransitionOutcome, TransitionPhase,
};
pub use resolver::{ResolutionError, Resolver, resolve_all};
pub use routes::{ModuleLoader, RouteEntry, RouteTable};
