//! Path-like keys identifying logical application locations.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Logical application location (a route-like key such as `/admin/users`).
///
/// Locations are normalized on construction: a single leading `/`, no
/// trailing `/` (except the root itself), empty segments dropped. The
/// segment structure is what defines the ancestor chain used for
/// child-entry guard ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Location(Cow<'static, str>);

impl Location {
    /// The root location, ancestor of every other location.
    pub const ROOT: Location = Location(Cow::Borrowed("/"));

    pub fn new(path: impl AsRef<str>) -> Self {
        let segments: Vec<&str> = path
            .as_ref()
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        if segments.is_empty() {
            return Self::ROOT;
        }

        Self(Cow::Owned(format!("/{}", segments.join("/"))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Path segments, outermost first (empty for the root).
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// The immediate ancestor, or `None` for the root.
    pub fn parent(&self) -> Option<Location> {
        if self.is_root() {
            return None;
        }

        match self.0.rsplit_once('/') {
            Some(("", _)) => Some(Self::ROOT),
            Some((prefix, _)) => Some(Self(Cow::Owned(prefix.to_string()))),
            None => None,
        }
    }

    /// The full ancestor chain from the root down to (and including) this
    /// location.
    pub fn ancestors(&self) -> Vec<Location> {
        let mut chain = vec![Self::ROOT];
        let mut path = String::new();

        for segment in self.segments() {
            path.push('/');
            path.push_str(segment);
            chain.push(Location::new(&path));
        }

        chain
    }

    /// True if `self` is a strict ancestor of `other`.
    pub fn is_ancestor_of(&self, other: &Location) -> bool {
        if self == other {
            return false;
        }
        if self.is_root() {
            return true;
        }

        other
            .as_str()
            .strip_prefix(self.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl core::fmt::Display for Location {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Location {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
