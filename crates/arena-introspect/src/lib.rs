//! Introspection layer over `arena-ecs`.
//!
//! Two collaborator-facing capabilities the core deliberately does not own:
//!
//! - **Field sync** ([`ComponentDescriptor`], [`SyncRegistry`],
//!   [`ChangeTracker`]): network code declares which component fields to
//!   synchronize by name. The descriptor tables are built once at
//!   registration time from plain function pointers, so reading and diffing
//!   named fields involves no runtime reflection.
//! - **JSON codecs** ([`CodecRegistry`]): scene-loading and persistence
//!   code moves whole entities as tag-keyed JSON objects, replayed through
//!   the world's regular add-component path.
//!
//! # Example
//!
//! ```
//! use arena_ecs::World;
//! use arena_introspect::{ComponentDescriptor, FieldValue, SyncRegistry};
//!
//! #[derive(Clone)]
//! struct Health {
//!     current: i64,
//! }
//!
//! let mut world = World::new();
//! world.register_component::<Health>();
//!
//! let mut sync = SyncRegistry::new();
//! let ty = sync.register(
//!     &world,
//!     ComponentDescriptor::<Health>::new().field(
//!         "current",
//!         |h| FieldValue::Int(h.current),
//!         |h, v| match v {
//!             FieldValue::Int(current) => {
//!                 h.current = *current;
//!                 true
//!             }
//!             _ => false,
//!         },
//!     ),
//! );
//!
//! let entity = world.create_entity();
//! world.add_component(entity, Health { current: 20 });
//!
//! assert_eq!(
//!     sync.read_field(&world, entity, ty, "current"),
//!     Some(FieldValue::Int(20))
//! );
//! ```

mod codec;
mod error;
mod field;
mod sync;

pub use codec::CodecRegistry;
pub use error::IntrospectError;
pub use field::{
    ComponentDescriptor, FieldDelta, FieldGetter, FieldKind, FieldSetter, FieldValue,
};
pub use sync::{ChangeTracker, SyncRegistry};
