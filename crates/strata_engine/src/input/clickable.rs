//! Clickable component with connected entities

use std::collections::BTreeSet;

use crate::ecs::{Component, Entity, EntityHandle, EntityManager};

/// Marks an entity as clickable and lists the entities that react with it
///
/// The owner joins its own connection set on creation and cannot be
/// disconnected by hand; only [`ClickableComponent::remove_expired`] drops it,
/// once the owner itself is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickableComponent {
    owner: EntityHandle,
    connected: BTreeSet<EntityHandle>,
}

impl ClickableComponent {
    /// Create a clickable owned by `owner`
    pub fn new(owner: EntityHandle) -> Self {
        Self {
            owner,
            connected: BTreeSet::from([owner]),
        }
    }

    /// Entity this component belongs to
    pub fn owner(&self) -> EntityHandle {
        self.owner
    }

    /// Connect another entity; returns `false` when it already was
    pub fn add_connected(&mut self, handle: EntityHandle) -> bool {
        self.connected.insert(handle)
    }

    /// Disconnect an entity; the owner cannot be disconnected
    pub fn remove_connected(&mut self, handle: EntityHandle) -> bool {
        handle != self.owner && self.connected.remove(&handle)
    }

    /// Whether `handle` is connected
    pub fn is_connected(&self, handle: EntityHandle) -> bool {
        self.connected.contains(&handle)
    }

    /// Every connected handle, owner included
    pub fn connected(&self) -> impl Iterator<Item = EntityHandle> + '_ {
        self.connected.iter().copied()
    }

    /// Drop connections whose entity is gone or marked for destruction
    ///
    /// The owner is no exception. Returns how many connections were dropped.
    pub fn remove_expired(&mut self, manager: &EntityManager) -> usize {
        let before = self.connected.len();
        self.connected
            .retain(|handle| manager.entity(*handle).is_some_and(Entity::is_active));
        before - self.connected.len()
    }
}

impl Component for ClickableComponent {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_is_always_connected() {
        let mut manager = EntityManager::new();
        let owner = manager.create_entity().handle();
        let mut clickable = ClickableComponent::new(owner);

        assert!(clickable.is_connected(owner));
        assert!(!clickable.add_connected(owner));
        assert!(!clickable.remove_connected(owner));
        assert_eq!(clickable.connected().collect::<Vec<_>>(), vec![owner]);
    }

    #[test]
    fn test_connect_and_disconnect() {
        let mut manager = EntityManager::new();
        let owner = manager.create_entity().handle();
        let other = manager.create_entity().handle();
        let mut clickable = ClickableComponent::new(owner);

        assert!(clickable.add_connected(other));
        assert_eq!(clickable.connected().count(), 2);
        assert!(clickable.remove_connected(other));
        assert!(!clickable.remove_connected(other));
        assert!(!clickable.is_connected(other));
    }

    #[test]
    fn test_remove_expired() {
        let mut manager = EntityManager::new();
        let owner = manager.create_entity().handle();
        let alive = manager.create_entity().handle();
        let doomed = manager.create_entity().handle();
        let swept = manager.create_entity().handle();

        let mut clickable = ClickableComponent::new(owner);
        for handle in [alive, doomed, swept, EntityHandle::null()] {
            clickable.add_connected(handle);
        }

        manager.destroy_entity(swept);
        manager.refresh();
        manager.destroy_entity(doomed);

        assert_eq!(clickable.remove_expired(&manager), 3);
        assert!(clickable.is_connected(owner));
        assert!(clickable.is_connected(alive));
        assert_eq!(clickable.connected().count(), 2);
        assert_eq!(clickable.remove_expired(&manager), 0);
    }

    #[test]
    fn test_remove_expired_drops_destroyed_owner() {
        let mut manager = EntityManager::new();
        let owner = manager.create_entity().handle();
        let other = manager.create_entity().handle();
        let mut clickable = ClickableComponent::new(owner);
        clickable.add_connected(other);

        manager.destroy_entity(owner);
        assert_eq!(clickable.remove_expired(&manager), 1);
        assert!(!clickable.is_connected(owner));
        assert_eq!(clickable.connected().collect::<Vec<_>>(), vec![other]);
        assert_eq!(clickable.owner(), owner);
    }
}
