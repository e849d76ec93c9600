// ============================================================================
// Aggregate Orchestrator
// ============================================================================
//
// Composes the rule collection, validator registry, tracking state and
// event manager owned by one aggregate instance.
//
// ============================================================================

pub mod core;
pub mod entity;
pub mod projection;
pub mod root;

pub use self::core::AggregateCore;
pub use entity::{Entity, EntityCore};
pub use projection::{FrozenSnapshot, FullProjection, PlainProjection};
pub use root::AggregateRoot;
