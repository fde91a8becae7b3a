//! Introspection error type.

use arena_ecs::{ComponentTypeId, Entity};
use thiserror::Error;

use crate::field::FieldKind;

/// Errors from field sync and codec operations.
///
/// Malformed external data is recoverable here; misuse of the typed ECS API
/// underneath still panics per its own contract.
#[derive(Debug, Error)]
pub enum IntrospectError {
    /// The component type declares no field with this name.
    #[error("unknown field `{0}`")]
    UnknownField(String),

    /// The field rejected a value of the wrong kind.
    #[error("field `{field}` cannot hold a {kind:?} value")]
    FieldKind {
        /// Declared field name.
        field: &'static str,
        /// Kind of the rejected value.
        kind: FieldKind,
    },

    /// The entity does not hold the addressed component.
    #[error("entity {0} does not hold the component")]
    ComponentMissing(Entity),

    /// The component type id was never registered for sync.
    #[error("component type id {0:?} is not registered for sync")]
    NotRegistered(ComponentTypeId),

    /// The encoded entity names a tag no codec was registered for.
    #[error("unknown component tag `{0}`")]
    UnknownTag(String),

    /// An encoded entity must be a JSON object keyed by component tags.
    #[error("entity encoding must be a JSON object")]
    NotAnObject,

    /// JSON (de)serialization failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
