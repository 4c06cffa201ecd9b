//! Transition coordination: the full protocol for one navigation request.
//!
//! The coordinator composes the guard phases in their mandated order (exit →
//! load → module fetch → entry), then the resolver stage, then a commit that
//! either fully lands or leaves the current location untouched. Issuing a new
//! request supersedes any in-flight one: the older attempt keeps running
//! cooperatively but its results are discarded at the next checkpoint.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::{debug, info, warn};

use turnstile_core::{ConfigurationError, Location, ResolvedBundle, TransitionRequest};
use turnstile_guard::{DenyReason, ExitGuard, ExitReadiness, Guard, GuardVerdict, evaluate_chain};

use crate::resolver::{ResolutionError, resolve_all};
use crate::routes::RouteTable;

/// Default bound on guard-driven redirect chains.
pub const DEFAULT_MAX_REDIRECT_HOPS: usize = 10;

/// Coordinator configuration.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    login_location: Location,
    forbidden_location: Option<Location>,
    max_redirect_hops: usize,
}

impl CoordinatorConfig {
    pub fn new(login_location: Location) -> Self {
        Self {
            login_location,
            forbidden_location: None,
            max_redirect_hops: DEFAULT_MAX_REDIRECT_HOPS,
        }
    }

    /// Where role mismatches are pointed instead of the login location.
    pub fn with_forbidden_location(mut self, location: Location) -> Self {
        self.forbidden_location = Some(location);
        self
    }

    pub fn with_max_redirect_hops(mut self, hops: usize) -> Self {
        self.max_redirect_hops = hops;
        self
    }
}

/// Pipeline phase the coordinator is currently in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransitionPhase {
    Idle,
    Evaluating,
    Resolving,
    Committing,
}

/// Why a transition aborted. The current location is unchanged in all cases.
#[derive(Debug)]
pub enum AbortReason {
    /// A guard voted no.
    Denied(DenyReason),

    /// A resolver failed; no partial data was kept.
    Resolution(ResolutionError),

    /// The target's module fetch failed after the load phase allowed it.
    LoadFailed {
        location: Location,
        cause: anyhow::Error,
    },

    /// A newer request took over the pipeline; this attempt's results were
    /// discarded.
    Superseded,
}

/// Outcome of one navigation request.
#[derive(Debug)]
pub enum TransitionOutcome {
    /// Every guard phase allowed and every resolver succeeded.
    Committed {
        location: Location,
        data: ResolvedBundle,
    },

    /// The transition was refused. `redirect` is advisory: where the caller
    /// should send the user next (login for missing credentials, the
    /// forbidden location for role mismatches), never followed implicitly.
    Aborted {
        reason: AbortReason,
        redirect: Option<Location>,
    },
}

/// Fatal pipeline failures — misconfiguration, never user-recoverable denial.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("redirect chain exceeded {limit} hops")]
    RedirectLoop { limit: usize },
}

struct CoordinatorState {
    /// Monotonic request counter; the newest ticket owns the pipeline.
    epoch: u64,
    phase: TransitionPhase,
    current: Location,
    exit_readiness: Option<Arc<dyn ExitReadiness>>,
}

enum AttemptOutcome {
    Commit {
        location: Location,
        data: ResolvedBundle,
    },
    Abort(AbortReason),
    Redirect(Location),
}

/// Drives the full transition protocol for one application instance.
pub struct Coordinator {
    routes: RouteTable,
    config: CoordinatorConfig,
    state: Mutex<CoordinatorState>,
}

impl Coordinator {
    pub fn new(routes: RouteTable, config: CoordinatorConfig, initial: Location) -> Self {
        Self {
            routes,
            config,
            state: Mutex::new(CoordinatorState {
                epoch: 0,
                phase: TransitionPhase::Idle,
                current: initial,
                exit_readiness: None,
            }),
        }
    }

    pub fn current_location(&self) -> Location {
        self.state().current.clone()
    }

    pub fn phase(&self) -> TransitionPhase {
        self.state().phase
    }

    /// Register (or clear) the active view's exit-readiness capability.
    ///
    /// Committing a transition clears the slot; the freshly rendered view
    /// registers its own capability afterwards.
    pub fn set_exit_readiness(&self, readiness: Option<Arc<dyn ExitReadiness>>) {
        self.state().exit_readiness = readiness;
    }

    /// Drive one navigation request to a committed or aborted outcome.
    ///
    /// Guard-issued redirects are followed internally (bounded by
    /// `max_redirect_hops`) on the same ticket — a redirect continues the
    /// navigation, it does not supersede it.
    pub async fn request(
        &self,
        request: TransitionRequest,
    ) -> Result<TransitionOutcome, PipelineError> {
        let ticket = {
            let mut state = self.state();
            state.epoch += 1;
            state.phase = TransitionPhase::Evaluating;
            state.epoch
        };

        debug!(
            transition = %request.id(),
            source = %request.source(),
            target = %request.target(),
            "transition requested"
        );

        let mut attempt = request;
        let mut hops = 0usize;

        loop {
            match self.attempt(&attempt, ticket).await {
                Ok(AttemptOutcome::Commit { location, data }) => {
                    info!(transition = %attempt.id(), location = %location, "transition committed");
                    return Ok(TransitionOutcome::Committed { location, data });
                }
                Ok(AttemptOutcome::Abort(reason)) => {
                    let redirect = self.advisory_redirect(&reason);
                    self.finish(ticket);
                    debug!(transition = %attempt.id(), ?reason, "transition aborted");
                    return Ok(TransitionOutcome::Aborted { reason, redirect });
                }
                Ok(AttemptOutcome::Redirect(location)) => {
                    hops += 1;
                    if hops > self.config.max_redirect_hops {
                        self.finish(ticket);
                        warn!(transition = %attempt.id(), limit = self.config.max_redirect_hops, "redirect loop");
                        return Err(PipelineError::RedirectLoop {
                            limit: self.config.max_redirect_hops,
                        });
                    }

                    debug!(transition = %attempt.id(), to = %location, hops, "following guard redirect");
                    attempt = TransitionRequest::new(self.current_location(), location);
                }
                Err(fatal) => {
                    self.finish(ticket);
                    return Err(fatal);
                }
            }
        }
    }

    /// One pass through the phase ordering for a single target.
    async fn attempt(
        &self,
        request: &TransitionRequest,
        ticket: u64,
    ) -> Result<AttemptOutcome, PipelineError> {
        let target = request.target().clone();

        let Some(entry) = self.routes.entry(&target) else {
            return match self.routes.fallback_redirect() {
                Some(fallback) if *fallback != target => {
                    Ok(AttemptOutcome::Redirect(fallback.clone()))
                }
                _ => Err(ConfigurationError::new(format!(
                    "no route registered for '{target}'"
                ))
                .into()),
            };
        };

        // The table's static facts about the target back-fill the request.
        let request = request.merge_default_metadata(entry.metadata());

        // Exit phase, against the source: the active view's readiness first,
        // then whatever the source location registered.
        let readiness = self.state().exit_readiness.clone();
        let mut exit_chain: Vec<Arc<dyn Guard>> = vec![Arc::new(ExitGuard::new(readiness))];
        exit_chain.extend(self.routes.exit_guards(request.source()));

        match evaluate_chain(&exit_chain, &request).await? {
            GuardVerdict::Allow => {}
            GuardVerdict::Deny(reason) => {
                return Ok(AttemptOutcome::Abort(AbortReason::Denied(reason)));
            }
            GuardVerdict::Redirect(_) => {
                // Exit guards block in place; a redirecting one is a bug.
                return Err(ConfigurationError::new(format!(
                    "exit guard for '{}' attempted a redirect",
                    request.source()
                ))
                .into());
            }
        }
        if !self.is_current(ticket) {
            return Ok(AttemptOutcome::Abort(AbortReason::Superseded));
        }

        // Load phase, only while the target's module is not yet resident.
        if let Some(loader) = entry.loader() {
            if !loader.is_loaded() {
                match evaluate_chain(&self.routes.load_guards(&target), &request).await? {
                    GuardVerdict::Allow => {}
                    GuardVerdict::Deny(reason) => {
                        // Denied before the fetch: the module is never pulled.
                        return Ok(AttemptOutcome::Abort(AbortReason::Denied(reason)));
                    }
                    GuardVerdict::Redirect(location) => {
                        return Ok(AttemptOutcome::Redirect(location));
                    }
                }
                if !self.is_current(ticket) {
                    return Ok(AttemptOutcome::Abort(AbortReason::Superseded));
                }

                debug!(transition = %request.id(), location = %target, "fetching module");
                if let Err(cause) = loader.load().await {
                    warn!(transition = %request.id(), location = %target, "module fetch failed");
                    return Ok(AttemptOutcome::Abort(AbortReason::LoadFailed {
                        location: target,
                        cause,
                    }));
                }
                if !self.is_current(ticket) {
                    return Ok(AttemptOutcome::Abort(AbortReason::Superseded));
                }
            }
        }

        // Entry phase, outermost ancestor to innermost target.
        match evaluate_chain(&self.routes.entry_sequence(&target), &request).await? {
            GuardVerdict::Allow => {}
            GuardVerdict::Deny(reason) => {
                return Ok(AttemptOutcome::Abort(AbortReason::Denied(reason)));
            }
            GuardVerdict::Redirect(location) => {
                return Ok(AttemptOutcome::Redirect(location));
            }
        }
        if !self.set_phase_if_current(ticket, TransitionPhase::Resolving) {
            return Ok(AttemptOutcome::Abort(AbortReason::Superseded));
        }

        // Resolver stage: all guard phases have allowed by now.
        let data = match resolve_all(entry.resolvers(), &request).await {
            Ok(bundle) => bundle,
            Err(failure) => {
                return Ok(AttemptOutcome::Abort(AbortReason::Resolution(failure)));
            }
        };
        if !self.set_phase_if_current(ticket, TransitionPhase::Committing) {
            return Ok(AttemptOutcome::Abort(AbortReason::Superseded));
        }

        // Commit under the lock, with a final ticket check: only the newest
        // request may ever move the current location.
        let mut state = self.state();
        if state.epoch != ticket {
            return Ok(AttemptOutcome::Abort(AbortReason::Superseded));
        }
        state.current = target.clone();
        state.exit_readiness = None;
        state.phase = TransitionPhase::Idle;
        drop(state);

        Ok(AttemptOutcome::Commit {
            location: target,
            data,
        })
    }

    /// Where the caller should send the user after a refusal.
    fn advisory_redirect(&self, reason: &AbortReason) -> Option<Location> {
        match reason {
            AbortReason::Denied(DenyReason::Unauthenticated) => {
                Some(self.config.login_location.clone())
            }
            AbortReason::Denied(DenyReason::RoleMismatch { .. }) => Some(
                self.config
                    .forbidden_location
                    .clone()
                    .unwrap_or_else(|| self.config.login_location.clone()),
            ),
            AbortReason::Denied(DenyReason::ExitBlocked) => None,
            AbortReason::Resolution(_)
            | AbortReason::LoadFailed { .. }
            | AbortReason::Superseded => None,
        }
    }

    /// Return the pipeline to idle, unless a newer request owns it.
    fn finish(&self, ticket: u64) {
        self.set_phase_if_current(ticket, TransitionPhase::Idle);
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.state().epoch == ticket
    }

    fn set_phase_if_current(&self, ticket: u64, phase: TransitionPhase) -> bool {
        let mut state = self.state();
        if state.epoch != ticket {
            return false;
        }
        state.phase = phase;
        true
    }

    fn state(&self) -> MutexGuard<'_, CoordinatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
