//! The world facade composing the three registries.
//!
//! Every mutation flows through here so the cross-registry invariants hold
//! at all times: storage contents, the entity's signature and every
//! system's membership are updated within the same call, and no caller can
//! observe an entity with stale membership.

use std::any::{Any, TypeId};

use crate::component::{Component, ComponentManager, ComponentTypeId};
use crate::entity::{Entity, EntityManager};
use crate::error::SnapshotError;
use crate::event::{Event, EventQueues};
use crate::signature::Signature;
use crate::snapshot::ComponentSnapshot;
use crate::system::{MemberSet, System, SystemHandle, SystemManager};

/// The ECS world: entity allocator, component storages, system registry and
/// event queues behind a single facade.
#[derive(Default)]
pub struct World {
    entities: EntityManager,
    components: ComponentManager,
    systems: SystemManager,
    events: EventQueues,
}

impl World {
    /// Create an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Entities ====================

    /// Allocate a fresh entity with an empty signature.
    ///
    /// # Panics
    ///
    /// Panics if the entity ceiling is reached.
    pub fn create_entity(&mut self) -> Entity {
        self.entities.create()
    }

    /// Destroy an entity.
    ///
    /// Before this returns, the signature is cleared, every component
    /// storage has dropped its slot and every system has forgotten the
    /// entity, regardless of which subset of types it actually held.
    ///
    /// # Panics
    ///
    /// Panics if the entity is not live; destroying a handle twice is a bug
    /// in the caller.
    pub fn destroy_entity(&mut self, entity: Entity) {
        self.entities.destroy(entity);
        self.components.entity_destroyed(entity);
        self.systems.entity_destroyed(entity);
    }

    /// Check whether the handle is currently live.
    #[must_use]
    pub fn is_live(&self, entity: Entity) -> bool {
        self.entities.is_live(entity)
    }

    /// Number of currently live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.live_count()
    }

    /// Iterate over all live entities in handle order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter()
    }

    /// The entity's current signature.
    #[must_use]
    pub fn signature(&self, entity: Entity) -> Signature {
        self.entities.signature(entity)
    }

    // ==================== Component types ====================

    /// Register a component type, allocating its signature bit.
    ///
    /// Must be called before any entity may carry the type. Registration
    /// order determines bit assignment, so processes that exchange
    /// snapshots must register types in the same order.
    ///
    /// # Panics
    ///
    /// Panics on double registration or when the type ceiling is reached.
    pub fn register_component<T: Component>(&mut self) -> ComponentTypeId {
        self.components.register::<T>()
    }

    /// The bit position assigned to `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` was never registered.
    #[must_use]
    pub fn component_type<T: Component>(&self) -> ComponentTypeId {
        self.components.type_id::<T>()
    }

    /// Number of registered component types.
    #[must_use]
    pub fn component_type_count(&self) -> usize {
        self.components.type_count()
    }

    // ==================== Components ====================

    /// Attach a component to an entity.
    ///
    /// Mutates storage, flips the signature bit and re-derives every
    /// system's membership before returning.
    ///
    /// # Panics
    ///
    /// Panics if `T` is unregistered or the entity already has a `T`.
    pub fn add_component<T: Component>(&mut self, entity: Entity, component: T) {
        self.components.array_mut::<T>().insert(entity, component);
        let ty = self.components.type_id::<T>();
        self.apply_signature_bit(entity, ty, true);
    }

    /// Detach and return an entity's component.
    ///
    /// # Panics
    ///
    /// Panics if `T` is unregistered or the entity has no `T`.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> T {
        let component = self.components.array_mut::<T>().remove(entity);
        let ty = self.components.type_id::<T>();
        self.apply_signature_bit(entity, ty, false);
        component
    }

    /// Get an entity's component.
    ///
    /// # Panics
    ///
    /// Panics if the entity has no `T`; probe optional components with
    /// [`try_get_component`](Self::try_get_component) instead.
    #[must_use]
    pub fn get_component<T: Component>(&self, entity: Entity) -> &T {
        self.components.array::<T>().get(entity)
    }

    /// Get an entity's component mutably.
    ///
    /// # Panics
    ///
    /// Panics if the entity has no `T`.
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> &mut T {
        self.components.array_mut::<T>().get_mut(entity)
    }

    /// Get an entity's component, or `None` if it has none.
    #[must_use]
    pub fn try_get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.components.array::<T>().try_get(entity)
    }

    /// Get an entity's component mutably, or `None` if it has none.
    pub fn try_get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.components.array_mut::<T>().try_get_mut(entity)
    }

    /// Check whether the entity has a `T`.
    #[must_use]
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.components.array::<T>().contains(entity)
    }

    // ==================== Type-erased access ====================

    /// Attach a boxed component value under a runtime type id.
    ///
    /// Used by generic persistence and network code that does not know
    /// concrete types at compile time. Goes through the same signature and
    /// membership bookkeeping as [`add_component`](Self::add_component).
    pub fn add_boxed(
        &mut self,
        entity: Entity,
        ty: ComponentTypeId,
        value: Box<dyn Any + Send + Sync>,
    ) -> Result<(), SnapshotError> {
        self.components.insert_boxed(entity, ty, value)?;
        self.apply_signature_bit(entity, ty, true);
        Ok(())
    }

    /// Clone an entity's component under a runtime type id.
    #[must_use]
    pub fn get_boxed(
        &self,
        entity: Entity,
        ty: ComponentTypeId,
    ) -> Option<Box<dyn Any + Send + Sync>> {
        self.components.clone_boxed(entity, ty)
    }

    /// Clone every component the entity currently holds, ordered by type id.
    #[must_use]
    pub fn snapshot_entity(&self, entity: Entity) -> Vec<ComponentSnapshot> {
        self.components
            .type_ids()
            .filter_map(|ty| {
                self.components
                    .clone_boxed(entity, ty)
                    .map(|value| ComponentSnapshot { type_id: ty, value })
            })
            .collect()
    }

    /// Replay a snapshot list onto an entity through the add-component path.
    ///
    /// Stops at the first bad item; the components already replayed stay
    /// attached.
    pub fn load_snapshot(
        &mut self,
        entity: Entity,
        snapshot: Vec<ComponentSnapshot>,
    ) -> Result<(), SnapshotError> {
        for ComponentSnapshot { type_id, value } in snapshot {
            self.add_boxed(entity, type_id, value)?;
        }
        Ok(())
    }

    // ==================== Systems ====================

    /// Construct and store the one instance of `S`, returning its handle.
    ///
    /// # Panics
    ///
    /// Panics if `S` is already registered.
    pub fn register_system<S: System + Default>(&mut self) -> SystemHandle<S> {
        self.systems.register::<S>();
        SystemHandle::new()
    }

    /// Set the required signature of `S`; from this point on the system
    /// participates in membership recomputation.
    ///
    /// # Panics
    ///
    /// Panics if `S` was never registered.
    pub fn set_system_signature<S: System>(&mut self, signature: Signature) {
        self.systems.set_signature::<S>(signature);
    }

    /// Run `S`'s one-time setup, marking it updatable on success.
    ///
    /// # Panics
    ///
    /// Panics if `S` was never registered.
    pub fn initialize_system<S: System>(&mut self, config: S::Config) -> bool {
        self.systems.initialize::<S>(config)
    }

    /// Run one system for this tick.
    ///
    /// The system sees the membership as of the start of the call, in
    /// insertion order, and accesses component data through this world.
    ///
    /// # Panics
    ///
    /// Panics if `S` was never registered or has not been successfully
    /// initialized.
    pub fn run_system<S: System>(&mut self, dt: f32) {
        let mut entry = self.systems.take::<S>();
        assert!(
            entry.initialized,
            "system {} updated before a successful initialize",
            entry.name
        );
        entry.system.update_erased(self, entry.members.as_slice(), dt);
        self.systems.restore(TypeId::of::<S>(), entry);
    }

    /// Membership of system `S`, in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if `S` was never registered.
    #[must_use]
    pub fn system_members<S: System>(&self) -> &MemberSet {
        self.systems.members::<S>()
    }

    /// Borrow the instance of `S`.
    ///
    /// # Panics
    ///
    /// Panics if `S` was never registered.
    #[must_use]
    pub fn system<S: System>(&self) -> &S {
        self.systems.system::<S>()
    }

    /// Borrow the instance of `S` mutably.
    ///
    /// # Panics
    ///
    /// Panics if `S` was never registered.
    pub fn system_mut<S: System>(&mut self) -> &mut S {
        self.systems.system_mut::<S>()
    }

    // ==================== Events ====================

    /// Append an event to its type's queue.
    pub fn send_event<E: Event>(&mut self, event: E) {
        self.events.send(event);
    }

    /// Take every pending event of type `E`, in send order.
    ///
    /// The returned iterator owns the events, so a subscriber system can
    /// keep mutating this world while consuming it.
    pub fn drain_events<E: Event>(&mut self) -> impl Iterator<Item = E> + use<E> {
        self.events.drain::<E>()
    }

    /// Number of pending events of type `E`.
    #[must_use]
    pub fn pending_events<E: Event>(&self) -> usize {
        self.events.pending::<E>()
    }

    /// Discard every pending event of every type.
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    // ==================== Internals ====================

    /// Flip one signature bit and push the new signature through the
    /// system registry. The single place membership is re-derived.
    fn apply_signature_bit(&mut self, entity: Entity, ty: ComponentTypeId, present: bool) {
        let mut signature = self.entities.signature(entity);
        if present {
            signature.set(ty);
        } else {
            signature.clear(ty);
        }
        self.entities.set_signature(entity, signature);
        self.systems.entity_signature_changed(entity, signature);
    }
}
