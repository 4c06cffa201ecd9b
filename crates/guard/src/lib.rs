//! `turnstile-guard` — navigation policy units and their chain evaluator.
//!
//! A guard votes allow/deny/redirect on one proposed transition, possibly
//! asynchronously; the chain evaluator runs an ordered sequence of guards
//! and short-circuits on the first dissent.

pub mod authn;
pub mod chain;
pub mod exit;
pub mod guard;
pub mod role;
pub mod verdict;

pub use authn::{AuthenticationGuard, LoadGuard, authenticate};
pub use chain::evaluate_chain;
pub use exit::ExitGuard;
pub use guard::{ExitReadiness, Guard};
pub use role::{EXPECTED_ROLE_KEY, RoleGuard};
pub use verdict::{DenyReason, GuardVerdict};
