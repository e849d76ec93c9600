// ============================================================================
// Aggregate Runtime
// ============================================================================
//
// In-memory bookkeeping for domain aggregates:
// - rules           broken rules, validators, nested rule pull-up
// - tracking        New / Dirty / SelfDeleted / Deleted / Clean
// - state_machine   caller-configured domain state transitions
// - event_sourcing  live and replayed events, versioning, envelopes
// - aggregate       composition of the above per aggregate instance
//
// Persistence and publication are the caller's job.
//
// ============================================================================

pub mod aggregate;
pub mod config;
pub mod domain;
pub mod error;
pub mod event_sourcing;
pub mod rules;
pub mod state_machine;
pub mod tracking;
pub mod values;

pub use aggregate::{AggregateCore, AggregateRoot, Entity, EntityCore, FrozenSnapshot, FullProjection, PlainProjection};
pub use config::RuntimeConfig;
pub use error::{DomainError, DomainResult};
pub use event_sourcing::{DomainEvent, DomainEventManager, EventEnvelope, EventHandler, EventMetadata};
pub use rules::{BrokenRule, BrokenRuleCollection, HasBrokenRules, RuleValidator, Severity, Validatable, ValidatorRegistry};
pub use state_machine::{StateTransitionManager, TransitionGraphReport};
pub use tracking::{Lifecycle, TrackingState, TrackingStateManager};
pub use values::{AggregateId, Enumeration, ValueObject};
