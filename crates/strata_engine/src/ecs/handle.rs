//! Entity handles and the registry that resolves them
//!
//! Handles carry a slot index plus a generation counter. Releasing a handle
//! bumps the slot's generation, so an old handle can never resolve to whatever
//! object later reuses the slot.

use std::sync::atomic::{AtomicU64, Ordering};

use slotmap::{Key, SlotMap};

slotmap::new_key_type! {
    /// Slot index and generation inside one registry
    struct SlotKey;
}

/// Non-owning, copyable identifier of an entity
///
/// Two handles compare equal iff they were returned by the same allocation,
/// also across registries: every handle carries the id of the registry that
/// issued it. [`EntityHandle::null`] never resolves to a live entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityHandle {
    registry: u64,
    key: SlotKey,
}

impl EntityHandle {
    /// Handle value that never resolves
    pub fn null() -> Self {
        Self::default()
    }

    /// Whether this is the null handle
    pub fn is_null(&self) -> bool {
        self.key.is_null()
    }
}

// Id 0 is reserved for the null handle
static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(1);

/// Allocates handles and resolves them back to the objects they identify
///
/// Handles are unique process-wide: a handle issued by one registry never
/// resolves in another, even when both use the same slot. Resolution and
/// release are O(1). Running out of slot indices (2^32 - 1 live objects) is
/// fatal and panics inside the slot map.
#[derive(Debug)]
pub struct HandleRegistry<T> {
    id: u64,
    slots: SlotMap<SlotKey, T>,
}

impl<T> HandleRegistry<T> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a registry with room for `capacity` live objects
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
            slots: SlotMap::with_capacity_and_key(capacity),
        }
    }

    /// Allocate a fresh handle and store the object built for it
    ///
    /// The constructor receives the handle so the object can know its own identity.
    pub fn allocate(&mut self, build: impl FnOnce(EntityHandle) -> T) -> EntityHandle {
        let registry = self.id;
        let key = self
            .slots
            .insert_with_key(|key| build(EntityHandle { registry, key }));
        EntityHandle { registry, key }
    }

    fn key_of(&self, handle: EntityHandle) -> Option<SlotKey> {
        (handle.registry == self.id).then_some(handle.key)
    }

    /// Resolve a handle to its object, `None` once released
    pub fn resolve(&self, handle: EntityHandle) -> Option<&T> {
        self.key_of(handle).and_then(|key| self.slots.get(key))
    }

    /// Mutable variant of [`HandleRegistry::resolve`]
    pub fn resolve_mut(&mut self, handle: EntityHandle) -> Option<&mut T> {
        self.key_of(handle).and_then(|key| self.slots.get_mut(key))
    }

    /// Whether the handle still resolves
    pub fn contains(&self, handle: EntityHandle) -> bool {
        self.key_of(handle).is_some_and(|key| self.slots.contains_key(key))
    }

    /// Invalidate a handle permanently and hand back its object
    ///
    /// Releasing an already released (or null) handle returns `None`.
    pub fn release(&mut self, handle: EntityHandle) -> Option<T> {
        self.key_of(handle).and_then(|key| self.slots.remove(key))
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no objects are live
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<T> Default for HandleRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
