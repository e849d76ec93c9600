// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Concrete aggregates built on the runtime. Each aggregate has its own
// subdirectory with value objects, events and the aggregate itself.
//
// ============================================================================

pub mod order;
