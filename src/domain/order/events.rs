use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use crate::event_sourcing::core::{DomainEvent, EventMetadata};
use super::value_objects::{OrderItem, ShippingAddress};

// ============================================================================
// Order Events - Domain Events for Order Aggregate
// ============================================================================

/// Order Event - Union type for all order events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    Created(OrderCreated),
    LineAdded(OrderLineAdded),
    Confirmed(OrderConfirmed),
    Shipped(OrderShipped),
    Cancelled(OrderCancelled),
}

impl OrderEvent {
    fn metadata_slot(&mut self) -> &mut Option<EventMetadata> {
        match self {
            OrderEvent::Created(e) => &mut e.metadata,
            OrderEvent::LineAdded(e) => &mut e.metadata,
            OrderEvent::Confirmed(e) => &mut e.metadata,
            OrderEvent::Shipped(e) => &mut e.metadata,
            OrderEvent::Cancelled(e) => &mut e.metadata,
        }
    }
}

impl DomainEvent for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::Created(_) => "OrderCreated",
            OrderEvent::LineAdded(_) => "OrderLineAdded",
            OrderEvent::Confirmed(_) => "OrderConfirmed",
            OrderEvent::Shipped(_) => "OrderShipped",
            OrderEvent::Cancelled(_) => "OrderCancelled",
        }
    }

    fn set_metadata(&mut self, metadata: EventMetadata) {
        *self.metadata_slot() = Some(metadata);
    }

    fn metadata(&self) -> Option<&EventMetadata> {
        match self {
            OrderEvent::Created(e) => e.metadata.as_ref(),
            OrderEvent::LineAdded(e) => e.metadata.as_ref(),
            OrderEvent::Confirmed(e) => e.metadata.as_ref(),
            OrderEvent::Shipped(e) => e.metadata.as_ref(),
            OrderEvent::Cancelled(e) => e.metadata.as_ref(),
        }
    }
}

// ============================================================================
// Individual Event Types
// ============================================================================

/// Order Created - Initial event in order lifecycle
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderCreated {
    pub customer_id: Uuid,
    pub shipping_address: ShippingAddress,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EventMetadata>,
}

/// Order Line Added - Draft order contents extended
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderLineAdded {
    pub item: OrderItem,
    pub added_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EventMetadata>,
}

/// Order Confirmed - Order accepted for fulfillment
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderConfirmed {
    pub confirmed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EventMetadata>,
}

/// Order Shipped - Order dispatched to customer
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderShipped {
    pub tracking_number: String,
    pub carrier: String,
    pub shipped_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EventMetadata>,
}

/// Order Cancelled - Order lifecycle ended
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderCancelled {
    pub reason: Option<String>,
    pub cancelled_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EventMetadata>,
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_sourcing::core::{deserialize_event, serialize_event};

    fn cancelled() -> OrderEvent {
        OrderEvent::Cancelled(OrderCancelled {
            reason: Some("customer request".to_string()),
            cancelled_at: Utc::now(),
            metadata: None,
        })
    }

    #[test]
    fn test_event_type_names() {
        assert_eq!(cancelled().event_type(), "OrderCancelled");
        assert_eq!(
            OrderEvent::Confirmed(OrderConfirmed {
                confirmed_at: Utc::now(),
                metadata: None,
            })
            .event_type(),
            "OrderConfirmed"
        );
    }

    #[test]
    fn test_metadata_stamp() {
        let mut event = cancelled();
        assert!(event.metadata().is_none());

        let aggregate_id = Uuid::new_v4();
        event.set_metadata(EventMetadata::new("OrderCancelled", aggregate_id, "Order"));

        let metadata = event.metadata().unwrap();
        assert_eq!(metadata.aggregate_id, aggregate_id);
        assert_eq!(metadata.aggregate_type, "Order");
    }

    #[test]
    fn test_event_json_is_tagged() {
        let json = serialize_event(&cancelled()).unwrap();
        assert!(json.contains("\"type\":\"Cancelled\""));
        assert!(!json.contains("metadata"));

        let back: OrderEvent = deserialize_event(&json).unwrap();
        assert_eq!(back.event_type(), "OrderCancelled");
    }
}
