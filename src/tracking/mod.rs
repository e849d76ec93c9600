// ============================================================================
// Tracking - lifecycle flags independent of any storage technology
// ============================================================================

pub mod state;

pub use state::{Lifecycle, TrackingState, TrackingStateManager};
