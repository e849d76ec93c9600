// ============================================================================
// Event Sourcing Core - Generic Infrastructure Abstractions
// ============================================================================
//
// Works with any event sum type. No domain-specific code lives here.
//
// ============================================================================

pub mod event;
pub mod handler;
pub mod manager;

// Re-export core types for convenience
pub use event::{deserialize_event, serialize_event, DomainEvent, EventEnvelope, EventMetadata};
pub use handler::EventHandler;
pub use manager::DomainEventManager;
