//! `turnstile-core` — navigation domain building blocks.
//!
//! This crate contains **pure domain** primitives (no IO, no async).

pub mod error;
pub mod id;
pub mod location;
pub mod transition;

pub use error::ConfigurationError;
pub use id::TransitionId;
pub use location::Location;
pub use transition::{ResolvedBundle, TransitionRequest};
