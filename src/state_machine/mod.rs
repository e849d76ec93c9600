// ============================================================================
// State Machine - validated transitions between domain-defined states
// ============================================================================
//
// Unlike tracking state, domain states form a graph with forbidden edges.
//
// ============================================================================

pub mod transition;

pub use transition::{StateEquality, StateTransitionManager, TransitionGraphReport};
