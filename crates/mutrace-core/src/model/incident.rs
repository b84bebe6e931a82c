use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Incident severity; variant order gives `Low < Medium < High < Critical`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// A tracked piece of misinformation
///
/// Posts belong to an incident by membership only; the incident does not
/// embed them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_critical_is_highest() {
        let mut all = vec![
            Severity::Critical,
            Severity::Low,
            Severity::High,
            Severity::Medium,
        ];
        all.sort();
        assert_eq!(all.last(), Some(&Severity::Critical));
        assert_eq!(all.first(), Some(&Severity::Low));
    }

    #[test]
    fn test_incident_wire_format() {
        let json = r#"{"id":"inc-1","title":"Blue sky","severity":"CRITICAL","createdAt":"2024-05-01T00:00:00Z"}"#;
        let incident: Incident = serde_json::from_str(json).unwrap();
        assert_eq!(incident.severity, Severity::Critical);
    }
}
