// ============================================================================
// Order Domain - example consumer of the aggregate runtime
// ============================================================================
//
// - Value objects (OrderItem, OrderStatus, ShippingAddress, OrderLine)
// - Events (OrderCreated, OrderConfirmed, etc.)
// - Aggregate (OrderAggregate with business logic)
//
// ============================================================================

pub mod value_objects;
pub mod events;
pub mod aggregate;

// Re-export for convenience
pub use value_objects::*;
pub use events::*;
pub use aggregate::*;
