// ============================================================================
// Values - identifiers, enumeration classes and self-validating values
// ============================================================================

pub mod enumeration;
pub mod identifier;
pub mod value_object;

pub use enumeration::Enumeration;
pub use identifier::AggregateId;
pub use value_object::ValueObject;
