use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;
use chrono::{DateTime, Utc};

use crate::aggregate::{AggregateCore, AggregateRoot, Entity};
use crate::config::RuntimeConfig;
use crate::error::{DomainError, DomainResult};
use crate::event_sourcing::core::{EventEnvelope, EventMetadata};
use crate::rules::{BrokenRule, BrokenRuleCollection, HasBrokenRules, RuleValidator, Validatable, ValidatorRegistry};
use crate::state_machine::StateTransitionManager;
use crate::values::{AggregateId, Enumeration};
use super::events::*;
use super::value_objects::{OrderItem, OrderLine, OrderStatus, ShippingAddress};

// ============================================================================
// Order Aggregate - Domain Logic
// ============================================================================
//
// Business methods check preconditions, then raise exactly one event. All
// state changes happen in `apply`, so live calls and replay produce the
// same state.
//
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct OrderProperties {
    pub customer_id: Uuid,
    pub status: OrderStatus,
    pub lines: Vec<OrderLine>,
    pub shipping_address: Option<ShippingAddress>,

    // Fulfilment
    pub tracking_number: Option<String>,
    pub carrier: Option<String>,
    pub cancelled_reason: Option<String>,

    // Audit Trail
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for OrderProperties {
    fn default() -> Self {
        Self {
            customer_id: Uuid::nil(),
            status: OrderStatus::Draft,
            lines: Vec::new(),
            shipping_address: None,
            tracking_number: None,
            carrier: None,
            cancelled_reason: None,
            created_at: None,
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrderAggregate {
    core: AggregateCore<OrderAggregate>,
    props: OrderProperties,
    transitions: StateTransitionManager<OrderStatus>,
}

/// Draft -> Confirmed | Cancelled, Confirmed -> Shipped | Cancelled.
/// Shipped and Cancelled are terminal.
pub fn order_transitions() -> DomainResult<StateTransitionManager<OrderStatus>> {
    StateTransitionManager::with_transitions([
        (OrderStatus::Draft, vec![OrderStatus::Confirmed, OrderStatus::Cancelled]),
        (OrderStatus::Confirmed, vec![OrderStatus::Shipped, OrderStatus::Cancelled]),
    ])
}

impl OrderAggregate {
    fn blank(core: AggregateCore<Self>) -> DomainResult<Self> {
        Ok(Self {
            core,
            props: OrderProperties::default(),
            transitions: order_transitions()?,
        })
    }

    /// Start a new draft order. The creation event is queued but the order
    /// stays New until a business method changes it.
    pub fn create(
        customer_id: Uuid,
        shipping_address: ShippingAddress,
        items: Vec<OrderItem>,
        config: RuntimeConfig,
    ) -> DomainResult<Self> {
        let id = AggregateId::new();
        let mut order = Self::blank(AggregateCore::new(id, config))?;

        let metadata = EventMetadata::new("OrderCreated", id.as_uuid(), Self::AGGREGATE_TYPE);
        order.apply_change(
            OrderEvent::Created(OrderCreated {
                customer_id,
                shipping_address,
                items,
                created_at: metadata.occurred_at,
                metadata: Some(metadata),
            }),
            true,
        )?;

        let order = order.initialize();
        tracing::info!(
            order_id = %order.id(),
            customer_id = %customer_id,
            valid = order.is_valid(),
            "Order created"
        );
        Ok(order)
    }

    /// Rebuild a persisted order from its stored events
    pub fn rehydrate<I>(id: AggregateId, history: I, config: RuntimeConfig) -> DomainResult<Self>
    where
        I: IntoIterator<Item = EventEnvelope<OrderEvent>>,
    {
        let mut order = Self::blank(AggregateCore::existing(id, config))?.initialize();
        order.load_from_history(history)?;
        Ok(order)
    }

    // ------------------------------------------------------------------------
    // Business methods
    // ------------------------------------------------------------------------

    pub fn add_line(&mut self, item: OrderItem) -> DomainResult<()> {
        if self.props.status != OrderStatus::Draft {
            return Err(DomainError::invalid_operation(format!(
                "Lines can only be added to a draft order, order is {}",
                self.props.status.name()
            )));
        }

        self.raise_event(OrderEvent::LineAdded(OrderLineAdded {
            item,
            added_at: Utc::now(),
            metadata: None,
        }))
    }

    /// Accept the order for fulfilment. An invalid order cannot be confirmed.
    pub fn confirm(&mut self) -> DomainResult<()> {
        self.ensure_valid()?;
        self.transitions
            .validate_transition(&self.props.status, &OrderStatus::Confirmed)?;

        self.raise_event(OrderEvent::Confirmed(OrderConfirmed {
            confirmed_at: Utc::now(),
            metadata: None,
        }))
    }

    pub fn ship(&mut self, tracking_number: impl Into<String>, carrier: impl Into<String>) -> DomainResult<()> {
        self.transitions
            .validate_transition(&self.props.status, &OrderStatus::Shipped)?;

        self.raise_event(OrderEvent::Shipped(OrderShipped {
            tracking_number: tracking_number.into(),
            carrier: carrier.into(),
            shipped_at: Utc::now(),
            metadata: None,
        }))
    }

    pub fn cancel(&mut self, reason: Option<String>) -> DomainResult<()> {
        self.transitions
            .validate_transition(&self.props.status, &OrderStatus::Cancelled)?;

        self.raise_event(OrderEvent::Cancelled(OrderCancelled {
            reason,
            cancelled_at: Utc::now(),
            metadata: None,
        }))
    }

    /// Flag the order for removal at the next flush
    pub fn delete(&mut self) {
        tracing::debug!(order_id = %self.id(), "Order marked for deletion");
        self.tracking_mut().mark_as_self_deleted();
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn status(&self) -> OrderStatus {
        self.props.status
    }

    pub fn customer_id(&self) -> Uuid {
        self.props.customer_id
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.props.lines
    }

    pub fn tracking_number(&self) -> Option<&str> {
        self.props.tracking_number.as_deref()
    }

    pub fn total_cents(&self) -> i64 {
        self.props.lines.iter().map(OrderLine::total_cents).sum()
    }

    pub fn can_move_to(&self, next: OrderStatus) -> bool {
        self.transitions
            .can_transition_to(&self.props.status, &next)
            .unwrap_or(false)
    }
}

// ============================================================================
// Validation
// ============================================================================

struct LinesRequired;

impl RuleValidator<OrderAggregate> for LinesRequired {
    fn add_rules(&self, subject: &OrderAggregate, rules: &mut BrokenRuleCollection) {
        if subject.props.lines.is_empty() {
            rules.add(BrokenRule::error("lines", "An order needs at least one line"));
        }
    }
}

struct UniqueProducts;

impl RuleValidator<OrderAggregate> for UniqueProducts {
    fn add_rules(&self, subject: &OrderAggregate, rules: &mut BrokenRuleCollection) {
        let mut seen = HashSet::new();
        let duplicated = subject
            .props
            .lines
            .iter()
            .any(|line| !seen.insert(line.item().product_id));

        if duplicated {
            rules.add(BrokenRule::error("lines", "Each product may appear on one line only"));
        }
    }
}

impl Validatable for OrderAggregate {
    fn guard(&self, rules: &mut BrokenRuleCollection) {
        if self.props.customer_id.is_nil() {
            rules.add(BrokenRule::error("customerId", "Customer is required"));
        }
        if self.props.shipping_address.is_none() {
            rules.add(BrokenRule::error("shippingAddress", "Shipping address is required"));
        }
    }

    fn add_validators(registry: &mut ValidatorRegistry<Self>) {
        registry.add(LinesRequired);
        registry.add(UniqueProducts);
    }

    fn nested_rules(&self) -> Vec<(&'static str, Option<&dyn HasBrokenRules>)> {
        self.props
            .lines
            .iter()
            .map(|line| ("lines", Some(line.rule_source())))
            .collect()
    }
}

// ============================================================================
// Aggregate Root Implementation
// ============================================================================

impl AggregateRoot for OrderAggregate {
    type Event = OrderEvent;
    type Properties = OrderProperties;

    const AGGREGATE_TYPE: &'static str = "Order";

    fn core(&self) -> &AggregateCore<Self> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AggregateCore<Self> {
        &mut self.core
    }

    fn properties(&self) -> &OrderProperties {
        &self.props
    }

    fn apply(&mut self, event: &OrderEvent) -> DomainResult<()> {
        let occurred_at = match event {
            OrderEvent::Created(e) => {
                if self.props.created_at.is_some() {
                    return Err(DomainError::invalid_operation("Order has already been created"));
                }
                self.props.customer_id = e.customer_id;
                self.props.shipping_address = Some(e.shipping_address.clone());
                self.props.lines = e.items.iter().cloned().map(OrderLine::new).collect();
                self.props.status = OrderStatus::Draft;
                self.props.created_at = Some(e.created_at);
                e.created_at
            }
            OrderEvent::LineAdded(e) => {
                self.props.lines.push(OrderLine::new(e.item.clone()));
                e.added_at
            }
            OrderEvent::Confirmed(e) => {
                self.props.status = OrderStatus::Confirmed;
                e.confirmed_at
            }
            OrderEvent::Shipped(e) => {
                self.props.status = OrderStatus::Shipped;
                self.props.tracking_number = Some(e.tracking_number.clone());
                self.props.carrier = Some(e.carrier.clone());
                e.shipped_at
            }
            OrderEvent::Cancelled(e) => {
                self.props.status = OrderStatus::Cancelled;
                self.props.cancelled_reason = e.reason.clone();
                e.cancelled_at
            }
        };

        // Taken from the payload so replay reproduces it exactly
        self.props.updated_at = Some(occurred_at);
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
