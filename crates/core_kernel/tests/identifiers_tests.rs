//! Unit tests for the identifier newtypes
//!
//! Tests cover creation, parsing, conversion, serialization and display.

use core_kernel::{AuditEventId, CorrelationId};
use proptest::prelude::*;
use uuid::Uuid;

mod correlation_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        let id1 = CorrelationId::new();
        let id2 = CorrelationId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_new_v7_generates_time_ordered_ids() {
        let id1 = CorrelationId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = CorrelationId::new_v7();
        let uuid1: Uuid = id1.into();
        let uuid2: Uuid = id2.into();
        assert!(uuid1 < uuid2);
    }

    #[test]
    fn test_prefix() {
        assert_eq!(CorrelationId::prefix(), "COR");
    }

    #[test]
    fn test_from_str_without_prefix() {
        let uuid = Uuid::new_v4();
        let parsed: CorrelationId = uuid.to_string().parse().unwrap();
        assert_eq!(*parsed.as_uuid(), uuid);
    }

    #[test]
    fn test_from_str_invalid() {
        let result: Result<CorrelationId, _> = "COR-not-a-uuid".parse();
        assert!(result.is_err());
    }

    #[test]
    fn test_serializes_as_bare_uuid() {
        let uuid = Uuid::new_v4();
        let id = CorrelationId::from_uuid(uuid);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));
    }
}

mod audit_event_id_tests {
    use super::*;

    #[test]
    fn test_prefix_and_display() {
        let id = AuditEventId::new_v7();
        assert_eq!(AuditEventId::prefix(), "AUD");
        assert!(id.to_string().starts_with("AUD-"));
    }

    #[test]
    fn test_roundtrip_through_display() {
        let id = AuditEventId::default();
        let parsed: AuditEventId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }
}

proptest! {
    #[test]
    fn prop_display_parse_roundtrip(bytes in any::<[u8; 16]>()) {
        let id = CorrelationId::from_uuid(Uuid::from_bytes(bytes));
        let parsed: CorrelationId = id.to_string().parse().unwrap();
        prop_assert_eq!(id, parsed);
    }
}
