//! Metric name handling.
//!
//! Names use a dotted hierarchical form (`group.type.operation`). They are
//! immutable, cheap to clone, and compare by string form only.

use std::fmt;
use std::sync::Arc;

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

/// Immutable dotted metric identifier, e.g. `web.api.getOrder`.
///
/// Two names are equal iff their string forms are equal. Ordering is
/// lexicographic on the string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetricName(Arc<str>);

impl MetricName {
    /// Create a name from its string form.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Create a name from dotted parts, e.g. `of("web", "api", "getOrder")`.
    pub fn of(group: &str, kind: &str, operation: &str) -> Self {
        Self::new(format!("{group}.{kind}.{operation}"))
    }

    /// The plain string form, used for matching and reporting.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derived name for the error path: string form plus an `.error` suffix.
    pub fn error_name(&self) -> MetricName {
        Self::new(format!("{}.error", self.0))
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MetricName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for MetricName {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl Serialize for MetricName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for MetricName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::new(name))
    }
}
