//! Systems and the registry that routes entities to them.
//!
//! A system declares what it needs as a [`Signature`]; the manager keeps
//! every system's membership in lock-step with entity signatures. The
//! membership hooks run synchronously the moment membership changes, so a
//! system can maintain auxiliary caches (the one camera entity, a handle
//! table) without waiting for the next tick.

use std::any::{Any, TypeId, type_name};
use std::marker::PhantomData;

use hashbrown::HashMap;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::entity::Entity;
use crate::signature::Signature;
use crate::world::World;

/// Per-tick logic over the entities matching a required signature.
///
/// Systems are constructed by the registry, receive their runtime wiring
/// once through [`initialize`](Self::initialize), and are then driven every
/// tick with the members matching their signature.
pub trait System: 'static {
    /// One-time wiring passed by the composing application.
    type Config;

    /// One-time setup. Returns `false` to reject the configuration; the
    /// system stays unusable until a later call succeeds.
    fn initialize(&mut self, config: Self::Config) -> bool;

    /// Per-tick logic. `members` is the membership at the start of the
    /// call, in insertion order.
    fn update(&mut self, world: &mut World, members: &[Entity], dt: f32);

    /// Called the moment an entity starts matching this system's signature.
    fn on_entity_added(&mut self, _entity: Entity) {}

    /// Called the moment an entity stops matching, or is destroyed.
    fn on_entity_removed(&mut self, _entity: Entity) {}
}

/// Object-safe face of a [`System`], stored behind a box in the manager.
pub(crate) trait AnySystem {
    fn update_erased(&mut self, world: &mut World, members: &[Entity], dt: f32);
    fn added(&mut self, entity: Entity);
    fn removed(&mut self, entity: Entity);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<S: System> AnySystem for S {
    fn update_erased(&mut self, world: &mut World, members: &[Entity], dt: f32) {
        self.update(world, members, dt);
    }

    fn added(&mut self, entity: Entity) {
        self.on_entity_added(entity);
    }

    fn removed(&mut self, entity: Entity) {
        self.on_entity_removed(entity);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Insertion-ordered set of member entities.
///
/// Iteration order is the order entities joined, stable across ticks until
/// membership itself changes.
#[derive(Default)]
pub struct MemberSet {
    order: Vec<Entity>,
    slots: FxHashMap<Entity, usize>,
}

impl MemberSet {
    /// Add an entity; returns `false` if it was already a member.
    pub(crate) fn insert(&mut self, entity: Entity) -> bool {
        if self.slots.contains_key(&entity) {
            return false;
        }
        self.slots.insert(entity, self.order.len());
        self.order.push(entity);
        true
    }

    /// Remove an entity; returns `false` if it was not a member. The order
    /// of the remaining members is preserved.
    pub(crate) fn remove(&mut self, entity: Entity) -> bool {
        let Some(slot) = self.slots.remove(&entity) else {
            return false;
        };
        self.order.remove(slot);
        for (index, &member) in self.order.iter().enumerate().skip(slot) {
            self.slots.insert(member, index);
        }
        true
    }

    /// Check whether the entity is a member.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.slots.contains_key(&entity)
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check whether there are no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate members in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.order.iter().copied()
    }

    /// Members in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[Entity] {
        &self.order
    }
}

pub(crate) struct SystemEntry {
    pub(crate) system: Box<dyn AnySystem>,
    pub(crate) signature: Option<Signature>,
    pub(crate) members: MemberSet,
    pub(crate) initialized: bool,
    pub(crate) name: &'static str,
}

/// Owns one instance per registered system type, each system's required
/// signature and its membership set.
#[derive(Default)]
pub struct SystemManager {
    entries: HashMap<TypeId, SystemEntry>,
}

impl SystemManager {
    /// Create an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct and store the one instance of `S`.
    ///
    /// # Panics
    ///
    /// Panics if `S` is already registered.
    pub fn register<S: System + Default>(&mut self) {
        assert!(
            !self.entries.contains_key(&TypeId::of::<S>()),
            "system {} registered twice",
            type_name::<S>()
        );
        self.entries.insert(
            TypeId::of::<S>(),
            SystemEntry {
                system: Box::new(S::default()),
                signature: None,
                members: MemberSet::default(),
                initialized: false,
                name: type_name::<S>(),
            },
        );
        debug!(system = type_name::<S>(), "registered system");
    }

    /// Set the required signature of `S`; from this point on the system
    /// participates in membership recomputation.
    ///
    /// # Panics
    ///
    /// Panics if `S` was never registered.
    pub fn set_signature<S: System>(&mut self, signature: Signature) {
        self.entry_mut::<S>().signature = Some(signature);
    }

    /// Run `S`'s one-time setup, marking it updatable on success.
    ///
    /// # Panics
    ///
    /// Panics if `S` was never registered.
    pub fn initialize<S: System>(&mut self, config: S::Config) -> bool {
        let entry = self.entry_mut::<S>();
        let system = entry
            .system
            .as_any_mut()
            .downcast_mut::<S>()
            .expect("system entry stored under wrong type id");
        let ok = system.initialize(config);
        entry.initialized = ok;
        if !ok {
            debug!(system = entry.name, "system rejected its configuration");
        }
        ok
    }

    /// Recompute the membership of every system for `entity`.
    ///
    /// A system with no required signature yet matches nothing; entities
    /// only flow in once the signature is set. Adding a present member and
    /// removing an absent one are both no-ops, and the hooks fire only on
    /// an actual change.
    pub fn entity_signature_changed(&mut self, entity: Entity, signature: Signature) {
        for entry in self.entries.values_mut() {
            let matches = entry
                .signature
                .is_some_and(|required| signature.contains_all(required));
            if matches {
                if entry.members.insert(entity) {
                    trace!(system = entry.name, %entity, "entity joined system");
                    entry.system.added(entity);
                }
            } else if entry.members.remove(entity) {
                trace!(system = entry.name, %entity, "entity left system");
                entry.system.removed(entity);
            }
        }
    }

    /// Drop `entity` from every membership set.
    pub fn entity_destroyed(&mut self, entity: Entity) {
        for entry in self.entries.values_mut() {
            if entry.members.remove(entity) {
                entry.system.removed(entity);
            }
        }
    }

    /// Membership of `S`, in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if `S` was never registered.
    #[must_use]
    pub fn members<S: System>(&self) -> &MemberSet {
        &self.entry::<S>().members
    }

    /// Borrow the instance of `S`.
    ///
    /// # Panics
    ///
    /// Panics if `S` was never registered.
    #[must_use]
    pub fn system<S: System>(&self) -> &S {
        self.entry::<S>()
            .system
            .as_any()
            .downcast_ref()
            .expect("system entry stored under wrong type id")
    }

    /// Borrow the instance of `S` mutably.
    ///
    /// # Panics
    ///
    /// Panics if `S` was never registered.
    pub fn system_mut<S: System>(&mut self) -> &mut S {
        self.entry_mut::<S>()
            .system
            .as_any_mut()
            .downcast_mut()
            .expect("system entry stored under wrong type id")
    }

    /// Number of registered systems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether no systems are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn take<S: System>(&mut self) -> SystemEntry {
        self.entries
            .remove(&TypeId::of::<S>())
            .unwrap_or_else(|| panic!("system {} is not registered", type_name::<S>()))
    }

    pub(crate) fn restore(&mut self, type_id: TypeId, entry: SystemEntry) {
        self.entries.insert(type_id, entry);
    }

    fn entry<S: System>(&self) -> &SystemEntry {
        self.entries
            .get(&TypeId::of::<S>())
            .unwrap_or_else(|| panic!("system {} is not registered", type_name::<S>()))
    }

    fn entry_mut<S: System>(&mut self) -> &mut SystemEntry {
        self.entries
            .get_mut(&TypeId::of::<S>())
            .unwrap_or_else(|| panic!("system {} is not registered", type_name::<S>()))
    }
}

/// Zero-sized typed handle to a registered system.
///
/// Returned by [`World::register_system`]; forwards lifecycle calls to the
/// world that owns the instance.
pub struct SystemHandle<S: System> {
    _marker: PhantomData<fn() -> S>,
}

impl<S: System> SystemHandle<S> {
    pub(crate) const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    /// Run the system's one-time setup.
    pub fn initialize(self, world: &mut World, config: S::Config) -> bool {
        world.initialize_system::<S>(config)
    }

    /// Run the system for one tick.
    ///
    /// # Panics
    ///
    /// Panics if the system has not been successfully initialized.
    pub fn update(self, world: &mut World, dt: f32) {
        world.run_system::<S>(dt);
    }
}

impl<S: System> Clone for SystemHandle<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: System> Copy for SystemHandle<S> {}
