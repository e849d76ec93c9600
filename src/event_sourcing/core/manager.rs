use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use super::event::{DomainEvent, EventEnvelope, EventMetadata};
use super::handler::EventHandler;

// ============================================================================
// Domain Event Manager - uncommitted events and version for one instance
// ============================================================================
//
// Two paths reach the handler:
// - live: the event just happened. Version goes up by exactly one and the
//   event is queued for publication.
// - history: the event already happened. Nothing is queued; once the whole
//   history is applied the version is the last event's sequence number.
//
// Version is a counter of its own, never derived from the queue length, so
// it stays right across several commit cycles.
//
// ============================================================================

#[derive(Debug, Clone)]
pub struct DomainEventManager<E> {
    uncommitted: Vec<E>,
    version: i64,
}

impl<E> Default for DomainEventManager<E> {
    fn default() -> Self {
        Self {
            uncommitted: Vec::new(),
            version: 0,
        }
    }
}

impl<E: DomainEvent> DomainEventManager<E> {
    pub fn new(initial_version: i64) -> Self {
        Self {
            uncommitted: Vec::new(),
            version: initial_version,
        }
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    /// Dispatch `event` to `handler`. Live events (`is_new`) are counted and
    /// queued; history events are not.
    ///
    /// A failing handler leaves version and queue untouched.
    pub fn apply_change<H>(&mut self, handler: &mut H, event: E, is_new: bool) -> DomainResult<()>
    where
        H: EventHandler<E> + ?Sized,
    {
        handler.handle(&event)?;

        if is_new {
            self.version += 1;
            tracing::trace!(
                event_type = event.event_type(),
                version = self.version,
                "Applied live event"
            );
            self.uncommitted.push(event);
        } else {
            tracing::trace!(event_type = event.event_type(), "Replayed historical event");
        }

        Ok(())
    }

    /// Stamp correlation metadata on `event`, then apply it as a live event
    pub fn raise_event<H>(
        &mut self,
        handler: &mut H,
        mut event: E,
        aggregate_id: Uuid,
        aggregate_type: &str,
    ) -> DomainResult<()>
    where
        H: EventHandler<E> + ?Sized,
    {
        let metadata = EventMetadata::new(event.event_type(), aggregate_id, aggregate_type);
        event.set_metadata(metadata);
        self.apply_change(handler, event, true)
    }

    /// Replay `history` in the order given.
    ///
    /// Nothing is queued. The version becomes the sequence number of the
    /// last envelope; an empty history leaves it unchanged. Replay is
    /// refused while live events are still queued, since their sequence
    /// numbers would collide with the replayed ones. A failing handler
    /// leaves version and queue untouched; rolling back the handler's own
    /// state is up to the caller.
    pub fn load_from_history<H, I>(&mut self, handler: &mut H, history: I) -> DomainResult<()>
    where
        H: EventHandler<E> + ?Sized,
        I: IntoIterator<Item = EventEnvelope<E>>,
    {
        if self.has_uncommitted_changes() {
            return Err(DomainError::invalid_operation(format!(
                "Cannot load history with {} uncommitted events queued",
                self.uncommitted.len()
            )));
        }

        let mut last_position = None;
        let mut replayed = 0usize;

        for envelope in history {
            let position = envelope.sequence_number;
            self.apply_change(handler, envelope.event_data, false)?;
            last_position = Some(position);
            replayed += 1;
        }

        if let Some(position) = last_position {
            self.version = position;
        }

        tracing::debug!(replayed, version = self.version, "Loaded events from history");
        Ok(())
    }

    /// Snapshot of the queued events in application order
    pub fn get_uncommitted_changes(&self) -> Vec<E> {
        self.uncommitted.clone()
    }

    pub fn uncommitted_changes(&self) -> &[E] {
        &self.uncommitted
    }

    pub fn has_uncommitted_changes(&self) -> bool {
        !self.uncommitted.is_empty()
    }

    pub fn mark_changes_as_committed(&mut self) {
        self.uncommitted.clear();
    }

    /// Drain the queue, handing the events to the caller for publication
    pub fn take_uncommitted_changes(&mut self) -> Vec<E> {
        std::mem::take(&mut self.uncommitted)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
