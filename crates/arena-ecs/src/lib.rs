//! Arena ECS - signature-driven Entity Component System runtime.
//!
//! A small in-process database for real-time simulation: typed data
//! ("components") attached to lightweight recycled handles ("entities"),
//! with per-tick logic ("systems") dispatched to exactly the entities that
//! own a required set of component types.
//!
//! # Key Concepts
//!
//! - **Entity**: an opaque recycled integer handle with no data of its own
//! - **Component**: a plain data record, at most one per entity per type
//! - **Signature**: a bit-vector over registered component types; an
//!   entity's "what it has" and a system's "what it needs"
//! - **System**: stateful per-tick logic over its current membership
//! - **World**: the facade composing the three registries; the only entry
//!   point collaborators use
//!
//! Storage is dense (swap-removal keeps every per-type array contiguous),
//! membership matching is a bitset AND, and the whole core is
//! single-threaded and tick-driven: every operation is a plain in-memory
//! transformation that completes within the calling tick.
//!
//! # Example
//!
//! ```
//! use arena_ecs::{Entity, Signature, System, World};
//!
//! #[derive(Clone, Copy)]
//! struct Position {
//!     x: f32,
//! }
//!
//! #[derive(Clone, Copy)]
//! struct Velocity {
//!     x: f32,
//! }
//!
//! #[derive(Default)]
//! struct Motion;
//!
//! impl System for Motion {
//!     type Config = ();
//!
//!     fn initialize(&mut self, (): ()) -> bool {
//!         true
//!     }
//!
//!     fn update(&mut self, world: &mut World, members: &[Entity], dt: f32) {
//!         for &entity in members {
//!             let velocity = *world.get_component::<Velocity>(entity);
//!             world.get_component_mut::<Position>(entity).x += velocity.x * dt;
//!         }
//!     }
//! }
//!
//! let mut world = World::new();
//! let position = world.register_component::<Position>();
//! let velocity = world.register_component::<Velocity>();
//!
//! let motion = world.register_system::<Motion>();
//! world.set_system_signature::<Motion>(Signature::of(&[position, velocity]));
//! assert!(motion.initialize(&mut world, ()));
//!
//! let player = world.create_entity();
//! world.add_component(player, Position { x: 0.0 });
//! world.add_component(player, Velocity { x: 5.0 });
//!
//! motion.update(&mut world, 1.0);
//! assert_eq!(world.get_component::<Position>(player).x, 5.0);
//! ```

mod component;
mod entity;
mod error;
mod event;
mod signature;
mod snapshot;
mod system;
mod world;

pub use component::{Component, ComponentArray, ComponentManager, ComponentTypeId};
pub use entity::{Entity, EntityManager, MAX_ENTITIES};
pub use error::SnapshotError;
pub use event::{Event, EventQueues};
pub use signature::{MAX_COMPONENT_TYPES, Signature};
pub use snapshot::ComponentSnapshot;
pub use system::{MemberSet, System, SystemHandle, SystemManager};
pub use world::World;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Component, Entity, Signature, System, SystemHandle, World};
}
