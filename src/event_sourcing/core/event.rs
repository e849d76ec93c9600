use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::error::{DomainError, DomainResult};

// ============================================================================
// Domain Event Trait
// ============================================================================

/// All events applied through a [`DomainEventManager`](super::DomainEventManager)
/// implement this trait.
///
/// Events are immutable once raised. The only write an event receives is
/// the metadata stamp applied by `raise_event`, and only when the event
/// type keeps a metadata slot.
pub trait DomainEvent: Serialize + for<'de> Deserialize<'de> + Clone + Send + Sync {
    /// Type name of this event, e.g. `OrderConfirmed`
    fn event_type(&self) -> &'static str;

    /// Receive correlation metadata. Events without a slot ignore it.
    fn set_metadata(&mut self, _metadata: EventMetadata) {}

    fn metadata(&self) -> Option<&EventMetadata> {
        None
    }
}

// ============================================================================
// Event Metadata - correlation stamp applied by raise_event
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EventMetadata {
    pub event_id: Uuid,
    pub event_type: String,
    pub aggregate_id: Uuid,
    pub aggregate_type: String,
    pub occurred_at: DateTime<Utc>,
}

impl EventMetadata {
    pub fn new(event_type: &str, aggregate_id: Uuid, aggregate_type: &str) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type: event_type.to_string(),
            aggregate_id,
            aggregate_type: aggregate_type.to_string(),
            occurred_at: Utc::now(),
        }
    }
}

// ============================================================================
// Event Envelope - positioned event for publication and replay
// ============================================================================
//
// Committed events leave an aggregate wrapped in envelopes; history comes
// back in the same shape. `sequence_number` is the aggregate version the
// event produced.
//
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EventEnvelope<E> {
    // Event Identity
    pub event_id: Uuid,
    pub aggregate_id: Uuid,
    pub aggregate_type: String,
    pub sequence_number: i64,

    // Event Type Information
    pub event_type: String,

    // Event Payload
    pub event_data: E,

    // Causation & Correlation
    pub causation_id: Option<Uuid>,
    pub correlation_id: Uuid,

    // Timing
    pub timestamp: DateTime<Utc>,

    // Additional Metadata
    pub metadata: HashMap<String, String>,
}

impl<E: DomainEvent> EventEnvelope<E> {
    pub fn new(
        aggregate_id: Uuid,
        aggregate_type: &str,
        sequence_number: i64,
        event_data: E,
        correlation_id: Uuid,
    ) -> Self {
        // Reuse the stamp from raise_event when the event carries one
        let (event_id, timestamp) = match event_data.metadata() {
            Some(stamp) => (stamp.event_id, stamp.occurred_at),
            None => (Uuid::new_v4(), Utc::now()),
        };

        Self {
            event_id,
            aggregate_id,
            aggregate_type: aggregate_type.to_string(),
            sequence_number,
            event_type: event_data.event_type().to_string(),
            event_data,
            causation_id: None,
            correlation_id,
            timestamp,
            metadata: HashMap::new(),
        }
    }
}

impl<E> EventEnvelope<E> {
    pub fn with_causation(mut self, causation_id: Uuid) -> Self {
        self.causation_id = Some(causation_id);
        self
    }

    pub fn with_metadata(mut self, key: String, value: String) -> Self {
        self.metadata.insert(key, value);
        self
    }
}

// ============================================================================
// Event Serialization Helpers
// ============================================================================

pub fn serialize_event<E: Serialize>(event: &E) -> DomainResult<String> {
    serde_json::to_string(event)
        .map_err(|e| DomainError::invalid_format("event", e.to_string()))
}

pub fn deserialize_event<E: for<'de> Deserialize<'de>>(json: &str) -> DomainResult<E> {
    serde_json::from_str(json).map_err(|e| DomainError::invalid_format("event", e.to_string()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize, Clone, Debug)]
    struct TestEvent {
        data: String,
        metadata: Option<EventMetadata>,
    }

    impl DomainEvent for TestEvent {
        fn event_type(&self) -> &'static str {
            "TestEvent"
        }

        fn set_metadata(&mut self, metadata: EventMetadata) {
            self.metadata = Some(metadata);
        }

        fn metadata(&self) -> Option<&EventMetadata> {
            self.metadata.as_ref()
        }
    }

    fn test_event() -> TestEvent {
        TestEvent {
            data: "test".to_string(),
            metadata: None,
        }
    }

    #[test]
    fn test_event_envelope_creation() {
        let aggregate_id = Uuid::new_v4();
        let correlation_id = Uuid::new_v4();

        let envelope = EventEnvelope::new(aggregate_id, "Test", 1, test_event(), correlation_id);

        assert_eq!(envelope.aggregate_id, aggregate_id);
        assert_eq!(envelope.aggregate_type, "Test");
        assert_eq!(envelope.sequence_number, 1);
        assert_eq!(envelope.event_type, "TestEvent");
        assert_eq!(envelope.correlation_id, correlation_id);
        assert!(envelope.causation_id.is_none());
    }

    #[test]
    fn test_envelope_reuses_metadata_stamp() {
        let aggregate_id = Uuid::new_v4();
        let mut event = test_event();
        let stamp = EventMetadata::new("TestEvent", aggregate_id, "Test");
        event.set_metadata(stamp.clone());

        let envelope = EventEnvelope::new(aggregate_id, "Test", 3, event, Uuid::new_v4())
            .with_causation(Uuid::new_v4())
            .with_metadata("source".to_string(), "test".to_string());

        assert_eq!(envelope.event_id, stamp.event_id);
        assert_eq!(envelope.timestamp, stamp.occurred_at);
        assert!(envelope.causation_id.is_some());
        assert_eq!(envelope.metadata.get("source").map(String::as_str), Some("test"));
    }

    #[test]
    fn test_event_serialization() {
        let event = TestEvent {
            data: "test data".to_string(),
            metadata: None,
        };

        let json = serialize_event(&event).unwrap();
        let deserialized: TestEvent = deserialize_event(&json).unwrap();

        assert_eq!(event.data, deserialized.data);
    }

    #[test]
    fn test_deserialize_malformed_event() {
        let result = deserialize_event::<TestEvent>("{not json");
        assert!(matches!(result, Err(DomainError::InvalidFormat { kind: "event", .. })));
    }
}
