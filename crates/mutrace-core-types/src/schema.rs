//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names consistent across logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_TRACE_ID: &str = "trace_id";

// Entity identifiers
pub const FIELD_POST_ID: &str = "post_id";
pub const FIELD_PARENT_ID: &str = "parent_id";
pub const FIELD_INCIDENT_ID: &str = "incident_id";
pub const FIELD_GENERATION: &str = "generation";

// Collection sizes
pub const FIELD_POST_COUNT: &str = "post_count";
pub const FIELD_ROOT_COUNT: &str = "root_count";
pub const FIELD_ORPHAN_COUNT: &str = "orphan_count";
pub const FIELD_CYCLE_COUNT: &str = "cycle_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_distinct() {
        assert_ne!(EVENT_START, EVENT_END);
        assert_ne!(EVENT_START, EVENT_END_ERROR);
        assert_ne!(EVENT_END, EVENT_END_ERROR);
    }

    #[test]
    fn test_entity_fields_are_distinct() {
        let fields = [FIELD_POST_ID, FIELD_PARENT_ID, FIELD_INCIDENT_ID, FIELD_GENERATION];
        for (i, a) in fields.iter().enumerate() {
            for b in &fields[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
