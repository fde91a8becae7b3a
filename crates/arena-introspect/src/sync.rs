//! World-level sync registry and change tracking.
//!
//! The sync registry erases [`ComponentDescriptor`]s behind the component
//! type ids assigned by the world, so generic network code can read and
//! apply named fields on entities it only knows by id. The change tracker
//! in front of it decides which of those values actually need to go on the
//! wire this tick.

use std::sync::Arc;

use arena_ecs::{Component, ComponentTypeId, Entity, World};
use hashbrown::HashMap;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::debug;

use crate::error::IntrospectError;
use crate::field::{ComponentDescriptor, FieldDelta, FieldValue};

type ReadFn = Box<dyn Fn(&World, Entity, &str) -> Option<FieldValue>>;
type WriteFn = Box<dyn Fn(&mut World, Entity, &str, &FieldValue) -> Result<(), IntrospectError>>;
type ReadAllFn = Box<dyn Fn(&World, Entity) -> Option<Vec<FieldDelta>>>;

struct SyncEntry {
    names: Vec<&'static str>,
    read: ReadFn,
    write: WriteFn,
    read_all: ReadAllFn,
}

/// Erased field access for every component type registered for sync.
#[derive(Default)]
pub struct SyncRegistry {
    entries: HashMap<ComponentTypeId, SyncEntry>,
}

impl SyncRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T`'s descriptor table under the type id the world assigned
    /// to `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` was never registered in `world`.
    pub fn register<T: Component>(
        &mut self,
        world: &World,
        descriptor: ComponentDescriptor<T>,
    ) -> ComponentTypeId {
        let ty = world.component_type::<T>();
        let names: Vec<&'static str> = descriptor.names().collect();
        let descriptor = Arc::new(descriptor);

        let read = {
            let descriptor = Arc::clone(&descriptor);
            Box::new(move |world: &World, entity: Entity, name: &str| {
                world
                    .try_get_component::<T>(entity)
                    .and_then(|component| descriptor.read(component, name))
            }) as ReadFn
        };
        let write = {
            let descriptor = Arc::clone(&descriptor);
            Box::new(
                move |world: &mut World, entity: Entity, name: &str, value: &FieldValue| {
                    let Some(component) = world.try_get_component_mut::<T>(entity) else {
                        return Err(IntrospectError::ComponentMissing(entity));
                    };
                    descriptor.write(component, name, value)
                },
            ) as WriteFn
        };
        let read_all = Box::new(move |world: &World, entity: Entity| {
            world
                .try_get_component::<T>(entity)
                .map(|component| descriptor.read_all(component))
        }) as ReadAllFn;

        self.entries.insert(
            ty,
            SyncEntry {
                names,
                read,
                write,
                read_all,
            },
        );
        debug!(id = ty.as_raw(), "registered component type for field sync");
        ty
    }

    /// Read a named field off a live component.
    ///
    /// Returns `None` when the type is not sync-registered, the entity has
    /// no such component, or the field name is unknown.
    #[must_use]
    pub fn read_field(
        &self,
        world: &World,
        entity: Entity,
        ty: ComponentTypeId,
        name: &str,
    ) -> Option<FieldValue> {
        self.entries
            .get(&ty)
            .and_then(|entry| (entry.read)(world, entity, name))
    }

    /// Write a named field into a live component.
    pub fn write_field(
        &self,
        world: &mut World,
        entity: Entity,
        ty: ComponentTypeId,
        name: &str,
        value: &FieldValue,
    ) -> Result<(), IntrospectError> {
        let entry = self
            .entries
            .get(&ty)
            .ok_or(IntrospectError::NotRegistered(ty))?;
        (entry.write)(world, entity, name, value)
    }

    /// Every declared field of a live component, in declaration order.
    #[must_use]
    pub fn read_fields(
        &self,
        world: &World,
        entity: Entity,
        ty: ComponentTypeId,
    ) -> Option<Vec<FieldDelta>> {
        self.entries
            .get(&ty)
            .and_then(|entry| (entry.read_all)(world, entity))
    }

    /// Declared field names for a sync-registered type.
    #[must_use]
    pub fn field_names(&self, ty: ComponentTypeId) -> Option<&[&'static str]> {
        self.entries.get(&ty).map(|entry| entry.names.as_slice())
    }

    /// Check whether the type id is sync-registered.
    #[must_use]
    pub fn is_registered(&self, ty: ComponentTypeId) -> bool {
        self.entries.contains_key(&ty)
    }

    /// Number of sync-registered component types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Remembers the last value reported per `(entity, type, field)` and lets
/// only actual changes through: the dedup step in front of the wire.
#[derive(Default)]
pub struct ChangeTracker {
    sent: FxHashMap<(Entity, ComponentTypeId, &'static str), FieldValue>,
}

impl ChangeTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record current values; returns the subset that differs from what was
    /// last recorded. A first sighting always counts as changed.
    pub fn record(
        &mut self,
        entity: Entity,
        ty: ComponentTypeId,
        fields: &[FieldDelta],
    ) -> SmallVec<[FieldDelta; 4]> {
        let mut changed = SmallVec::new();
        for field in fields {
            let key = (entity, ty, field.name);
            if self.sent.get(&key) != Some(&field.value) {
                self.sent.insert(key, field.value.clone());
                changed.push(field.clone());
            }
        }
        changed
    }

    /// Drop every record for `entity`; it left the synced set or was
    /// destroyed.
    pub fn forget(&mut self, entity: Entity) {
        self.sent.retain(|&(e, _, _), _| e != entity);
    }

    /// Number of tracked `(entity, type, field)` values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sent.len()
    }

    /// Check whether nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sent.is_empty()
    }
}
