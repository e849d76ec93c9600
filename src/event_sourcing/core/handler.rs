use crate::error::DomainResult;

// ============================================================================
// Event Handler - dispatch target for applied events
// ============================================================================
//
// Handlers are selected by matching on the event sum type, so a missing
// handler is a compile error for exhaustive matches. Handlers that
// deliberately leave variants out return `DomainError::missing_handler`.
//
// Handlers mutate state only. They must not touch the event log, the
// tracking state or the broken rule collection of the object being
// updated, and they must be deterministic so replay is repeatable.
//
// ============================================================================

pub trait EventHandler<E> {
    /// Apply the effect of `event` to this object's state
    fn handle(&mut self, event: &E) -> DomainResult<()>;
}
