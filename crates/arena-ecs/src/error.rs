//! Error types for replaying external data into a world.

use thiserror::Error;

use crate::component::ComponentTypeId;

/// Errors from replaying type-erased component data into a world.
///
/// These cover malformed external input (scene files, persisted entities,
/// network snapshots). Misuse of the typed API is a contract violation and
/// panics instead of returning one of these.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The snapshot names a component type id this process never registered.
    #[error("unknown component type id {0:?}")]
    UnknownType(ComponentTypeId),

    /// The boxed value does not downcast to the storage's component type.
    #[error("value does not match component type {expected}")]
    ValueMismatch {
        /// Name of the type the storage holds.
        expected: &'static str,
    },
}
