//! Entity lifecycle events
//!
//! Raised by whoever builds or hides entities, never by the
//! [`EntityManager`](crate::ecs::EntityManager) itself.

use super::Event;
use crate::ecs::EntityHandle;

/// An entity is fully assembled and may be picked up by subsystems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityCreatedEvent {
    handle: EntityHandle,
}

impl EntityCreatedEvent {
    /// Event for `handle`
    pub fn new(handle: EntityHandle) -> Self {
        Self { handle }
    }

    /// Affected entity
    pub fn handle(&self) -> EntityHandle {
        self.handle
    }
}

impl Event for EntityCreatedEvent {}

/// Subsystems should stop processing an entity that may stay alive
///
/// Destroyed entities do not need this event; subsystems drop their handles
/// lazily once the handles stop resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityRemovedEvent {
    handle: EntityHandle,
}

impl EntityRemovedEvent {
    /// Event for `handle`
    pub fn new(handle: EntityHandle) -> Self {
        Self { handle }
    }

    /// Affected entity
    pub fn handle(&self) -> EntityHandle {
        self.handle
    }
}

impl Event for EntityRemovedEvent {}
