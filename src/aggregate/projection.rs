use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{DomainError, DomainResult};
use crate::rules::BrokenRuleCollection;
use crate::tracking::{TrackingState, TrackingStateManager};
use crate::values::AggregateId;

// ============================================================================
// Projections handed to persistence and API collaborators
// ============================================================================

/// Identity, version, flattened properties and validity. Carries no
/// manager objects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlainProjection {
    pub id: AggregateId,
    pub version: i64,
    #[serde(flatten)]
    pub properties: Map<String, Value>,
    pub is_valid: bool,
}

impl PlainProjection {
    /// `properties` must serialize to a JSON object
    pub fn new<P: Serialize + ?Sized>(
        id: AggregateId,
        version: i64,
        properties: &P,
        is_valid: bool,
    ) -> DomainResult<Self> {
        let value = serde_json::to_value(properties)
            .map_err(|e| DomainError::invalid_format("properties", e.to_string()))?;

        let properties = match value {
            Value::Object(map) => map,
            other => {
                return Err(DomainError::invalid_format(
                    "properties",
                    format!("expected an object, got {other}"),
                ))
            }
        };

        Ok(Self {
            id,
            version,
            properties,
            is_valid,
        })
    }

    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert("id".to_string(), Value::String(self.id.to_string()));
        object.insert("version".to_string(), Value::from(self.version));
        for (key, value) in &self.properties {
            object.insert(key.clone(), value.clone());
        }
        object.insert("isValid".to_string(), Value::Bool(self.is_valid));
        Value::Object(object)
    }
}

/// Diagnostic view: the plain projection plus borrowed live managers
#[derive(Debug, Serialize)]
pub struct FullProjection<'a> {
    #[serde(flatten)]
    pub plain: PlainProjection,
    pub tracking: &'a TrackingStateManager,
    pub broken_rules: &'a BrokenRuleCollection,
}

/// Owned, read-only copy of an aggregate at one point in time.
///
/// Fields are private; the receiver can read but never reach back into
/// the live aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrozenSnapshot<P> {
    id: AggregateId,
    version: i64,
    properties: P,
    tracking: TrackingState,
}

impl<P> FrozenSnapshot<P> {
    pub(crate) fn new(id: AggregateId, version: i64, properties: P, tracking: TrackingState) -> Self {
        Self {
            id,
            version,
            properties,
            tracking,
        }
    }

    pub fn id(&self) -> AggregateId {
        self.id
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn properties(&self) -> &P {
        &self.properties
    }

    pub fn tracking(&self) -> TrackingState {
        self.tracking
    }
}
