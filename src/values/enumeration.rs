use crate::error::{DomainError, DomainResult};

// ============================================================================
// Smart Enumerations
// ============================================================================
//
// Enumeration classes with an id and a display name. The full value table
// is a compile-time constant, so lookups never need a runtime cache.
//
// ============================================================================

pub trait Enumeration: Sized + Copy + PartialEq + 'static {
    /// Every value, in declaration order
    const ALL: &'static [Self];

    /// Name used in lookup errors
    const KIND: &'static str;

    fn id(&self) -> i32;

    fn name(&self) -> &'static str;

    fn from_id(id: i32) -> DomainResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|value| value.id() == id)
            .ok_or_else(|| DomainError::invalid_format(Self::KIND, id.to_string()))
    }

    /// Case-insensitive lookup by display name
    fn from_name(name: &str) -> DomainResult<Self> {
        let wanted = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|value| value.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DomainError::invalid_format(Self::KIND, name))
    }
}
