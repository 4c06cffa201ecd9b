//! Transition requests and the data attached to committed transitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::{Location, TransitionId};

/// A proposed move from one location to another.
///
/// Immutable once created: guards and resolvers read it, nobody mutates it.
/// Metadata carries routing-table facts about the target (e.g. the role a
/// location expects); params carry the dynamic path values (e.g. an `id`).
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionRequest {
    id: TransitionId,
    source: Location,
    target: Location,
    params: BTreeMap<String, String>,
    metadata: BTreeMap<String, JsonValue>,
}

impl TransitionRequest {
    pub fn new(source: Location, target: Location) -> Self {
        Self {
            id: TransitionId::new(),
            source,
            target,
            params: BTreeMap::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> TransitionId {
        self.id
    }

    pub fn source(&self) -> &Location {
        &self.source
    }

    pub fn target(&self) -> &Location {
        &self.target
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn metadata(&self, key: &str) -> Option<&JsonValue> {
        self.metadata.get(key)
    }

    /// Derive a request whose metadata is backfilled from `defaults`.
    ///
    /// Keys already present on the request win; the transition id is kept,
    /// since this is still the same logical navigation.
    pub fn merge_default_metadata(&self, defaults: &BTreeMap<String, JsonValue>) -> Self {
        let mut merged = defaults.clone();
        merged.extend(self.metadata.clone());

        Self {
            metadata: merged,
            ..self.clone()
        }
    }
}

/// Data produced by the resolver stage, keyed by resolver name.
///
/// Attached to a committed transition and handed to the destination view;
/// an aborted transition never yields a (partial) bundle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolvedBundle(BTreeMap<String, JsonValue>);

impl ResolvedBundle {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl From<BTreeMap<String, JsonValue>> for ResolvedBundle {
    fn from(value: BTreeMap<String, JsonValue>) -> Self {
        Self(value)
    }
}
