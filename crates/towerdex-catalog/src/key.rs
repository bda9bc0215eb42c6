//! Cache keys.

use std::fmt;

/// Path-shaped key of one fetched collection, e.g. `reports/user/42`.
///
/// Keys form a hierarchy: invalidating `reports` covers `reports/all` and
/// every `reports/user/<id>`.
///
/// ```
/// use towerdex_catalog::CollectionKey;
///
/// let key = CollectionKey::new(["reports", "user", "42"]);
/// assert!(key.starts_with(&CollectionKey::new(["reports"])));
/// assert_eq!(key.to_string(), "reports/user/42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionKey {
    segments: Vec<String>,
}

impl CollectionKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CollectionKey {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Single-segment key for a whole collection.
    pub fn collection(name: &str) -> Self {
        CollectionKey::new([name])
    }

    /// Appends a segment.
    pub fn join(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// First segment, which names the collection.
    pub fn root(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    /// Returns `true` if `prefix` is this key or one of its ancestors.
    pub fn starts_with(&self, prefix: &CollectionKey) -> bool {
        self.segments.starts_with(&prefix.segments)
    }
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}
