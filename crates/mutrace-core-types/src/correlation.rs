//! Correlation types for subscription tracking and tracing
//!
//! A live incident view crosses two asynchronous boundaries (the snapshot
//! fetch and the live channel). These types tie the log lines and errors
//! produced on either side back to the subscription that caused them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trace identifier spanning one subscription's whole lifetime
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceId(String);

impl TraceId {
    /// Generate a fresh identifier using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create from an existing string (for deserialization)
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Correlation context for one incident subscription
///
/// A subscription is acquired when an incident is selected and released when
/// the selection changes. `generation` increases monotonically per viewer so
/// that responses belonging to a released subscription can be recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionContext {
    pub incident_id: String,
    pub generation: u64,
    pub trace_id: TraceId,
}

impl SubscriptionContext {
    /// Create a context for the given incident and generation
    pub fn new(incident_id: impl Into<String>, generation: u64) -> Self {
        Self {
            incident_id: incident_id.into(),
            generation,
            trace_id: TraceId::new(),
        }
    }

    /// True if a response tagged with `(incident_id, generation)` belongs here
    pub fn owns(&self, incident_id: &str, generation: u64) -> bool {
        self.generation == generation && self.incident_id == incident_id
    }
}

impl std::fmt::Display for SubscriptionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.incident_id, self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_id_generation() {
        let id1 = TraceId::new();
        let id2 = TraceId::new();

        assert_ne!(id1, id2);
        assert!(!id1.as_str().is_empty());
    }

    #[test]
    fn test_trace_id_display() {
        let id = TraceId::new();
        assert_eq!(format!("{}", id), id.as_str());
    }

    #[test]
    fn test_subscription_owns() {
        let ctx = SubscriptionContext::new("inc-1", 3);

        assert!(ctx.owns("inc-1", 3));
        assert!(!ctx.owns("inc-1", 2));
        assert!(!ctx.owns("inc-2", 3));
    }

    #[test]
    fn test_subscription_display() {
        let ctx = SubscriptionContext::new("inc-1", 3);
        assert_eq!(ctx.to_string(), "inc-1#3");
    }

    #[test]
    fn test_serialization() {
        let id = TraceId::from_string("trace-42".to_string());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"trace-42\"");
        let back: TraceId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
