// ============================================================================
// Event Sourcing Infrastructure
// ============================================================================
//
// In-memory bookkeeping only: applying, versioning and replaying events.
// Storing and publishing them is left to the caller.
//
// ============================================================================

pub mod core;

pub use self::core::*;
