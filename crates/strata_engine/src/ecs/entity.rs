//! Entity implementation

use std::collections::HashSet;

use super::component::{Component, ComponentStore};
use super::{EcsError, EntityHandle};

/// Normalise a group name so that `" Enemies"` and `"enemies"` name the same group
pub fn normalise_group_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// One logical game object owned by the [`EntityManager`](super::EntityManager)
///
/// Everything outside the manager refers to an entity through its
/// [`EntityHandle`]; `&Entity` borrows never outlive a frame phase.
#[derive(Debug)]
pub struct Entity {
    handle: EntityHandle,
    active: bool,
    groups: HashSet<String>,
    components: ComponentStore,
}

impl Entity {
    pub(super) fn new(handle: EntityHandle) -> Self {
        Self {
            handle,
            active: true,
            groups: HashSet::new(),
            components: ComponentStore::new(),
        }
    }

    /// Get the entity handle
    pub fn handle(&self) -> EntityHandle {
        self.handle
    }

    /// Whether the entity is alive, i.e. not marked for destruction
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Mark the entity for destruction
    ///
    /// The entity stays resolvable until the next refresh pass. Calling this
    /// more than once has no further effect.
    pub fn destroy(&mut self) {
        if self.active {
            log::trace!("Entity {:?} marked for destruction", self.handle);
            self.active = false;
        }
    }

    /// Whether the entity claims membership of `group`
    pub fn is_in_group(&self, group: &str) -> bool {
        self.groups.contains(&normalise_group_name(group))
    }

    /// Stop claiming membership of `group`
    ///
    /// The group bucket drops the handle on the next refresh pass.
    pub fn remove_from_group(&mut self, group: &str) {
        self.groups.remove(&normalise_group_name(group));
    }

    /// Claim membership; returns `false` when already a member
    pub(super) fn claim_group(&mut self, normalised: String) -> bool {
        self.groups.insert(normalised)
    }

    /// Normalised names of every group the entity claims
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(String::as_str)
    }

    /// Attach a component, replacing any previous component of the same kind
    pub fn add_component<T: Component>(&mut self, component: T) -> &mut T {
        self.components.insert(component)
    }

    /// Whether a component of kind `T` is attached
    pub fn has_component<T: Component>(&self) -> bool {
        self.components.contains::<T>()
    }

    /// Get the component of kind `T`
    pub fn get_component<T: Component>(&self) -> Result<&T, EcsError> {
        self.components
            .get::<T>()
            .ok_or_else(EcsError::component_not_found::<T>)
    }

    /// Get the component of kind `T` mutably
    pub fn get_component_mut<T: Component>(&mut self) -> Result<&mut T, EcsError> {
        self.components
            .get_mut::<T>()
            .ok_or_else(EcsError::component_not_found::<T>)
    }

    /// Detach the component of kind `T`
    pub fn remove_component<T: Component>(&mut self) -> Option<T> {
        self.components.remove::<T>()
    }

    /// Update all components in attach order
    pub fn update(&mut self, delta_time: f32) {
        self.components.update_all(delta_time);
    }
}
