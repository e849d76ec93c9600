use serde::Serialize;
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::event_sourcing::{DomainEvent, DomainEventManager, EventEnvelope, EventHandler};
use crate::rules::{registry_for, run_validation, BrokenRuleCollection, Validatable};
use crate::tracking::TrackingStateManager;
use crate::values::AggregateId;

use super::core::AggregateCore;
use super::projection::{FrozenSnapshot, FullProjection, PlainProjection};

// ============================================================================
// Aggregate Root - composition of the per-instance managers
// ============================================================================
//
// Lifecycle:
// 1. construct with an AggregateCore, call `initialize`
//    guard -> validators -> nested sweep; New, or Dirty when invalid
// 2. business methods call `raise_event`
//    handler mutates state -> version + 1 -> queued -> Dirty -> revalidate
// 3. caller persists, then `commit` drains the queue for publication
//
// Replay (`load_from_history`) runs handlers only. It never queues events
// and never touches tracking state.
//
// ============================================================================

pub trait AggregateRoot: Validatable {
    /// Sum type of every event this aggregate applies
    type Event: DomainEvent;

    /// Plain-data view of the aggregate's state
    type Properties: Serialize;

    const AGGREGATE_TYPE: &'static str;

    fn core(&self) -> &AggregateCore<Self>;

    fn core_mut(&mut self) -> &mut AggregateCore<Self>;

    fn properties(&self) -> &Self::Properties;

    /// Event handler: apply the effect of `event` to the aggregate's state.
    /// Returning `DomainError::missing_handler` for a variant is a fatal
    /// configuration error.
    fn apply(&mut self, event: &Self::Event) -> DomainResult<()>;

    // ------------------------------------------------------------------------
    // Identity & state
    // ------------------------------------------------------------------------

    fn id(&self) -> AggregateId {
        self.core().id
    }

    fn version(&self) -> i64 {
        self.core().events.version()
    }

    fn tracking(&self) -> &TrackingStateManager {
        &self.core().tracking
    }

    fn tracking_mut(&mut self) -> &mut TrackingStateManager {
        &mut self.core_mut().tracking
    }

    // ------------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------------

    /// Register validators and run the first validation pass. A New
    /// aggregate with violations becomes Dirty; an existing one keeps its
    /// tracking state.
    fn initialize(mut self) -> Self {
        self.core_mut().validators = registry_for::<Self>();

        let valid = self.validate();
        if !valid && self.core().config.mark_dirty_on_invalid && self.tracking().is_new() {
            tracing::warn!(
                aggregate_type = Self::AGGREGATE_TYPE,
                aggregate_id = %self.id(),
                rule_count = self.broken_rules().len(),
                "Aggregate constructed with broken rules"
            );
            self.core_mut().tracking.mark_as_dirty();
        }

        self
    }

    /// Recompute the broken rules from scratch. Returns whether the
    /// aggregate is valid.
    fn validate(&mut self) -> bool {
        let rules = run_validation(&*self, &self.core().validators);
        let valid = rules.is_empty();
        self.core_mut().broken_rules = rules;
        valid
    }

    fn broken_rules(&self) -> &BrokenRuleCollection {
        &self.core().broken_rules
    }

    fn is_valid(&self) -> bool {
        self.core().broken_rules.is_empty()
    }

    /// Fail with every current violation; for callers about to persist
    fn ensure_valid(&self) -> DomainResult<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(DomainError::broken_rules(
                Self::AGGREGATE_TYPE,
                self.core().broken_rules.clone(),
            ))
        }
    }

    // ------------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------------

    /// Dispatch `event` to the handler. Live events (`is_new`) bump the
    /// version and are queued; history events are not.
    fn apply_change(&mut self, event: Self::Event, is_new: bool) -> DomainResult<()> {
        with_event_manager(self, |events, handler| events.apply_change(handler, event, is_new))
    }

    /// Apply a live event raised by a business method: stamp metadata,
    /// dispatch, queue, mark Dirty and revalidate.
    ///
    /// An aggregate marked for deletion accepts no further events.
    fn raise_event(&mut self, event: Self::Event) -> DomainResult<()> {
        let tracking = self.tracking();
        if tracking.is_self_deleted() || tracking.is_deleted() {
            return Err(DomainError::invalid_operation(format!(
                "{} {} is marked {:?} and cannot raise {}",
                Self::AGGREGATE_TYPE,
                self.id(),
                tracking.lifecycle(),
                event.event_type()
            )));
        }

        let aggregate_id = self.id().as_uuid();
        with_event_manager(self, |events, handler| {
            events.raise_event(handler, event, aggregate_id, Self::AGGREGATE_TYPE)
        })?;

        self.core_mut().tracking.mark_as_dirty();
        self.validate();
        Ok(())
    }

    /// Rebuild state from stored envelopes, in the order given.
    ///
    /// Replay runs against a staged copy that replaces `self` only when
    /// every event applied, so a failing history changes nothing. Fails
    /// while uncommitted events are queued.
    fn load_from_history<I>(&mut self, history: I) -> DomainResult<()>
    where
        Self: Clone,
        I: IntoIterator<Item = EventEnvelope<Self::Event>>,
    {
        let mut staged = self.clone();
        with_event_manager(&mut staged, |events, handler| {
            events.load_from_history(handler, history)
        })?;
        *self = staged;

        if self.core().config.revalidate_after_replay {
            self.validate();
        }

        tracing::debug!(
            aggregate_type = Self::AGGREGATE_TYPE,
            aggregate_id = %self.id(),
            version = self.version(),
            "Aggregate rebuilt from history"
        );
        Ok(())
    }

    fn get_uncommitted_changes(&self) -> Vec<Self::Event> {
        self.core().events.get_uncommitted_changes()
    }

    fn mark_changes_as_committed(&mut self) {
        self.core_mut().events.mark_changes_as_committed();
    }

    /// Drain the queued events as envelopes numbered by the version each
    /// one produced. A second call without new events returns nothing.
    fn commit(&mut self, correlation_id: Uuid) -> Vec<EventEnvelope<Self::Event>> {
        let aggregate_id = self.id().as_uuid();
        let version = self.version();
        let events = self.core_mut().events.take_uncommitted_changes();
        let first_sequence = version - events.len() as i64 + 1;

        if !events.is_empty() {
            tracing::debug!(
                aggregate_type = Self::AGGREGATE_TYPE,
                aggregate_id = %aggregate_id,
                event_count = events.len(),
                version,
                "Committed uncommitted events"
            );
        }

        events
            .into_iter()
            .enumerate()
            .map(|(offset, event)| {
                EventEnvelope::new(
                    aggregate_id,
                    Self::AGGREGATE_TYPE,
                    first_sequence + offset as i64,
                    event,
                    correlation_id,
                )
            })
            .collect()
    }

    // ------------------------------------------------------------------------
    // Projections
    // ------------------------------------------------------------------------

    /// Identity, version, flattened properties and validity
    fn to_plain(&self) -> DomainResult<PlainProjection> {
        PlainProjection::new(self.id(), self.version(), self.properties(), self.is_valid())
    }

    /// Plain projection plus the live tracking state and broken rules
    fn to_full(&self) -> DomainResult<FullProjection<'_>> {
        Ok(FullProjection {
            plain: self.to_plain()?,
            tracking: &self.core().tracking,
            broken_rules: &self.core().broken_rules,
        })
    }

    /// Immutable copy safe to hand across a trust boundary
    fn freeze(&self) -> FrozenSnapshot<Self::Properties>
    where
        Self::Properties: Clone,
    {
        FrozenSnapshot::new(
            self.id(),
            self.version(),
            self.properties().clone(),
            self.core().tracking.snapshot(),
        )
    }
}

// ============================================================================
// Handler dispatch
// ============================================================================

struct Dispatch<'a, A>(&'a mut A);

impl<A: AggregateRoot> EventHandler<A::Event> for Dispatch<'_, A> {
    fn handle(&mut self, event: &A::Event) -> DomainResult<()> {
        self.0.apply(event)
    }
}

/// Run `operation` with the event manager detached from the aggregate, so
/// the manager can drive the aggregate's handler. Handlers see an empty
/// manager while detached.
fn with_event_manager<A, T, F>(aggregate: &mut A, operation: F) -> DomainResult<T>
where
    A: AggregateRoot,
    F: FnOnce(&mut DomainEventManager<A::Event>, &mut Dispatch<'_, A>) -> DomainResult<T>,
{
    let mut events = std::mem::take(&mut aggregate.core_mut().events);
    let result = operation(&mut events, &mut Dispatch(&mut *aggregate));
    aggregate.core_mut().events = events;
    result
}
