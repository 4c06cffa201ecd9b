//! Routing table: per-location guard lists, resolvers, and lazy modules.
//!
//! The table holds policy, not control flow. It answers "which guards apply
//! to this transition, in what order" — the coordinator decides when each
//! phase actually runs.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use turnstile_core::Location;
use turnstile_guard::Guard;

use crate::Resolver;

/// Lazy module-fetch capability for a location.
///
/// `load` is only ever called after the load-guard phase allows, and only
/// when `is_loaded` reported false — a denied load phase means no fetch
/// happens at all.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    fn is_loaded(&self) -> bool;

    async fn load(&self) -> anyhow::Result<()>;
}

/// Everything the routing table knows about one location.
///
/// Guard lists are ordered; siblings run in registration order.
#[derive(Default)]
pub struct RouteEntry {
    metadata: BTreeMap<String, JsonValue>,
    entry_guards: Vec<Arc<dyn Guard>>,
    child_entry_guards: Vec<Arc<dyn Guard>>,
    exit_guards: Vec<Arc<dyn Guard>>,
    load_guards: Vec<Arc<dyn Guard>>,
    resolvers: BTreeMap<String, Arc<dyn Resolver>>,
    loader: Option<Arc<dyn ModuleLoader>>,
}

impl RouteEntry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Static facts about the location (e.g. the role it expects), merged
    /// under a request's own metadata before guards see it.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Gate entering this location.
    pub fn with_entry_guard(mut self, guard: Arc<dyn Guard>) -> Self {
        self.entry_guards.push(guard);
        self
    }

    /// Gate entering descendants of this location.
    pub fn with_child_entry_guard(mut self, guard: Arc<dyn Guard>) -> Self {
        self.child_entry_guards.push(guard);
        self
    }

    /// Gate leaving this location.
    pub fn with_exit_guard(mut self, guard: Arc<dyn Guard>) -> Self {
        self.exit_guards.push(guard);
        self
    }

    /// Gate fetching this location's lazily-loaded module.
    pub fn with_load_guard(mut self, guard: Arc<dyn Guard>) -> Self {
        self.load_guards.push(guard);
        self
    }

    /// Declare a named data dependency required before commit.
    pub fn with_resolver(mut self, name: impl Into<String>, resolver: Arc<dyn Resolver>) -> Self {
        self.resolvers.insert(name.into(), resolver);
        self
    }

    pub fn with_module_loader(mut self, loader: Arc<dyn ModuleLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn metadata(&self) -> &BTreeMap<String, JsonValue> {
        &self.metadata
    }

    pub fn resolvers(&self) -> &BTreeMap<String, Arc<dyn Resolver>> {
        &self.resolvers
    }

    pub fn loader(&self) -> Option<&Arc<dyn ModuleLoader>> {
        self.loader.as_ref()
    }
}

/// The routing table consumed by the coordinator.
#[derive(Default)]
pub struct RouteTable {
    entries: BTreeMap<Location, RouteEntry>,
    fallback_redirect: Option<Location>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, location: Location, entry: RouteEntry) -> Self {
        self.entries.insert(location, entry);
        self
    }

    /// Where to send requests for unregistered locations (the classic
    /// `**` catch-all route). Without one, an unknown target is treated as
    /// a routing-table bug.
    pub fn with_fallback_redirect(mut self, location: Location) -> Self {
        self.fallback_redirect = Some(location);
        self
    }

    pub fn entry(&self, location: &Location) -> Option<&RouteEntry> {
        self.entries.get(location)
    }

    pub fn fallback_redirect(&self) -> Option<&Location> {
        self.fallback_redirect.as_ref()
    }

    /// Exit-phase guards registered on the source location.
    pub(crate) fn exit_guards(&self, source: &Location) -> Vec<Arc<dyn Guard>> {
        self.entries
            .get(source)
            .map(|entry| entry.exit_guards.clone())
            .unwrap_or_default()
    }

    /// Load-phase guards registered on the target location.
    pub(crate) fn load_guards(&self, target: &Location) -> Vec<Arc<dyn Guard>> {
        self.entries
            .get(target)
            .map(|entry| entry.load_guards.clone())
            .unwrap_or_default()
    }

    /// The entry-phase sequence for `target`, outermost ancestor first.
    ///
    /// At each level the parent's child-entry guards run before the child's
    /// own entry guards; the target's own child-entry guards close the
    /// sequence. Unregistered ancestors contribute nothing.
    pub(crate) fn entry_sequence(&self, target: &Location) -> Vec<Arc<dyn Guard>> {
        let chain = target.ancestors();
        let mut sequence: Vec<Arc<dyn Guard>> = Vec::new();

        for (index, location) in chain.iter().enumerate() {
            if index > 0 {
                if let Some(parent) = self.entries.get(&chain[index - 1]) {
                    sequence.extend(parent.child_entry_guards.iter().cloned());
                }
            }

            if let Some(entry) = self.entries.get(location) {
                sequence.extend(entry.entry_guards.iter().cloned());
            }
        }

        if let Some(entry) = self.entries.get(target) {
            sequence.extend(entry.child_entry_guards.iter().cloned());
        }

        sequence
    }
}
