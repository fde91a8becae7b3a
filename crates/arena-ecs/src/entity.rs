//! Entity handles and the allocator that recycles them.
//!
//! Entities are plain integer handles with no payload of their own; all
//! per-entity state lives in the component storages and the signature table.
//! Destroyed handles go back onto a stack, so the most recently freed handle
//! is reissued first.

use std::fmt;

use tracing::trace;

use crate::signature::Signature;

/// Maximum number of simultaneously live entities.
pub const MAX_ENTITIES: usize = 4096;

/// A handle identifying one entity.
///
/// Handles are dense integers in `[0, MAX_ENTITIES)`. A destroyed handle
/// must not be used again until the allocator reissues it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity(u32);

impl Entity {
    /// Create a handle from a raw index.
    #[must_use]
    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw index value.
    #[must_use]
    pub const fn as_raw(self) -> u32 {
        self.0
    }

    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Allocator for entity handles plus the per-entity signature table.
///
/// The free list is seeded with every handle in descending order, so the
/// first allocations come out as `0, 1, 2, …` while destroyed handles are
/// reused in stack order.
pub struct EntityManager {
    /// Free handles; the top of the stack is allocated next.
    free: Vec<Entity>,
    /// Signature of each entity, indexed by handle.
    signatures: Vec<Signature>,
    /// Liveness of each handle, indexed by handle.
    live: Vec<bool>,
    /// Number of currently live entities.
    live_count: usize,
}

impl Default for EntityManager {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityManager {
    /// Create a manager with every handle on the free list.
    #[must_use]
    pub fn new() -> Self {
        let free = (0..MAX_ENTITIES as u32).rev().map(Entity::from_raw).collect();
        Self {
            free,
            signatures: vec![Signature::EMPTY; MAX_ENTITIES],
            live: vec![false; MAX_ENTITIES],
            live_count: 0,
        }
    }

    /// Allocate a fresh handle with an empty signature.
    ///
    /// # Panics
    ///
    /// Panics if [`MAX_ENTITIES`] entities are already live.
    pub fn create(&mut self) -> Entity {
        assert!(
            self.live_count < MAX_ENTITIES,
            "cannot create entity: {MAX_ENTITIES} entities are already live"
        );
        let entity = self
            .free
            .pop()
            .expect("free list empty while below the entity ceiling");
        self.signatures[entity.index()] = Signature::EMPTY;
        self.live[entity.index()] = true;
        self.live_count += 1;
        trace!(%entity, "created entity");
        entity
    }

    /// Clear the entity's signature and return its handle to the free list.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is not currently live; destroying a handle twice
    /// is a bug in the caller.
    pub fn destroy(&mut self, entity: Entity) {
        let index = self.checked_index(entity);
        assert!(self.live[index], "destroy of dead entity {entity:?}");
        self.live[index] = false;
        self.signatures[index] = Signature::EMPTY;
        self.free.push(entity);
        self.live_count -= 1;
        trace!(%entity, "destroyed entity");
    }

    /// Overwrite the entity's signature.
    ///
    /// # Panics
    ///
    /// Panics if the handle is out of range.
    pub fn set_signature(&mut self, entity: Entity, signature: Signature) {
        let index = self.checked_index(entity);
        self.signatures[index] = signature;
    }

    /// Get the entity's current signature.
    ///
    /// # Panics
    ///
    /// Panics if the handle is out of range.
    #[must_use]
    pub fn signature(&self, entity: Entity) -> Signature {
        self.signatures[self.checked_index(entity)]
    }

    /// Check whether the handle is currently live.
    #[must_use]
    pub fn is_live(&self, entity: Entity) -> bool {
        entity.index() < MAX_ENTITIES && self.live[entity.index()]
    }

    /// Number of currently live entities.
    #[must_use]
    pub const fn live_count(&self) -> usize {
        self.live_count
    }

    /// Iterate over all live handles in handle order.
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.live
            .iter()
            .enumerate()
            .filter_map(|(id, &live)| live.then(|| Entity::from_raw(id as u32)))
    }

    fn checked_index(&self, entity: Entity) -> usize {
        let index = entity.index();
        assert!(index < MAX_ENTITIES, "entity handle {entity:?} out of range");
        index
    }
}
