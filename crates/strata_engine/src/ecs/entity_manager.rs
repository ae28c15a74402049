//! Entity ownership, named groups and the refresh pass

use std::collections::HashMap;

use super::entity::normalise_group_name;
use super::{EcsError, Entity, EntityHandle, HandleRegistry};
use crate::config::EntityConfig;

/// Owns every entity and reclaims destroyed ones
///
/// Destruction is always deferred: [`Entity::destroy`] only clears the active
/// flag and the entity is deallocated by the next [`EntityManager::refresh`].
/// Any handle obtained earlier in a tick therefore resolves until the tick's
/// refresh boundary.
#[derive(Debug, Default)]
pub struct EntityManager {
    entities: HandleRegistry<Entity>,

    /// Creation order, used for update order
    entity_list: Vec<EntityHandle>,

    /// Group buckets keyed by normalised name
    groups: HashMap<String, Vec<EntityHandle>>,
}

impl EntityManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager sized from configuration
    pub fn with_config(config: &EntityConfig) -> Self {
        Self {
            entities: HandleRegistry::with_capacity(config.initial_capacity),
            entity_list: Vec::with_capacity(config.initial_capacity),
            groups: HashMap::new(),
        }
    }

    /// Create a new entity and return it for immediate setup
    ///
    /// No creation event is raised here. Whoever builds the entity raises
    /// [`EntityCreatedEvent`](crate::events::EntityCreatedEvent) once all of its
    /// components are attached, so subscribers never see it half-built.
    pub fn create_entity(&mut self) -> &mut Entity {
        let handle = self.entities.allocate(Entity::new);
        self.entity_list.push(handle);
        log::trace!("Created entity {:?}", handle);

        self.entities
            .resolve_mut(handle)
            .unwrap_or_else(|| unreachable!("entity was allocated above"))
    }

    /// Resolve a handle, `None` once the entity has been swept
    pub fn entity(&self, handle: EntityHandle) -> Option<&Entity> {
        self.entities.resolve(handle)
    }

    /// Mutable variant of [`EntityManager::entity`]
    pub fn entity_mut(&mut self, handle: EntityHandle) -> Option<&mut Entity> {
        self.entities.resolve_mut(handle)
    }

    /// Resolve a handle or report it as not found
    pub fn get(&self, handle: EntityHandle) -> Result<&Entity, EcsError> {
        self.entity(handle).ok_or(EcsError::EntityNotFound(handle))
    }

    /// Mutable variant of [`EntityManager::get`]
    pub fn get_mut(&mut self, handle: EntityHandle) -> Result<&mut Entity, EcsError> {
        self.entity_mut(handle).ok_or(EcsError::EntityNotFound(handle))
    }

    /// Whether the handle still resolves (active or awaiting the sweep)
    pub fn contains(&self, handle: EntityHandle) -> bool {
        self.entities.contains(handle)
    }

    /// Mark an entity for destruction; returns `false` if it no longer resolves
    pub fn destroy_entity(&mut self, handle: EntityHandle) -> bool {
        match self.entities.resolve_mut(handle) {
            Some(entity) => {
                entity.destroy();
                true
            }
            None => false,
        }
    }

    /// Number of entities still resolvable
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether no entity is resolvable
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterate entities in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entity_list
            .iter()
            .filter_map(|handle| self.entities.resolve(*handle))
    }

    /// Refresh, then update every active entity in creation order
    pub fn update(&mut self, delta_time: f32) {
        self.refresh();

        for handle in &self.entity_list {
            if let Some(entity) = self.entities.resolve_mut(*handle) {
                if entity.is_active() {
                    entity.update(delta_time);
                }
            }
        }
    }

    /// Prune group buckets, then deallocate inactive entities
    ///
    /// Pruning has to run first because it inspects the state of entities that
    /// the sweep is about to release.
    pub fn refresh(&mut self) {
        let entities = &self.entities;
        for (group, handles) in &mut self.groups {
            handles.retain(|handle| {
                entities
                    .resolve(*handle)
                    .is_some_and(|entity| entity.is_active() && entity.is_in_group(group))
            });
        }

        let before = self.entity_list.len();
        let registry = &mut self.entities;
        self.entity_list.retain(|handle| {
            let keep = registry.resolve(*handle).is_some_and(Entity::is_active);
            if !keep {
                registry.release(*handle);
            }
            keep
        });

        let swept = before - self.entity_list.len();
        if swept > 0 {
            log::debug!("Refresh swept {} entities, {} remaining", swept, self.entity_list.len());
        }
    }

    /// Add an entity to a group
    ///
    /// The name is normalised first. Adding an entity to a group it already
    /// claims does not duplicate the handle.
    pub fn add_entity_to_group(&mut self, handle: EntityHandle, group: &str) -> Result<(), EcsError> {
        let normalised = normalise_group_name(group);
        let entity = self
            .entities
            .resolve_mut(handle)
            .ok_or(EcsError::EntityNotFound(handle))?;

        if entity.claim_group(normalised.clone()) {
            self.groups.entry(normalised).or_default().push(handle);
        } else {
            // Still claimed, but a previous refresh may have pruned the bucket
            // while the entity was briefly out of the group
            let bucket = self.groups.entry(normalised).or_default();
            if !bucket.contains(&handle) {
                bucket.push(handle);
            }
        }
        Ok(())
    }

    /// Handles in a group, possibly including entities destroyed this tick
    ///
    /// Looking up a name that was never used creates an empty bucket for it
    /// which is kept for the lifetime of the manager. Typo'd names therefore
    /// accumulate empty buckets; they are harmless but never reclaimed.
    pub fn get_group(&mut self, group: &str) -> &[EntityHandle] {
        self.groups.entry(normalise_group_name(group)).or_default()
    }

    /// Number of group buckets, including empty ones
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}
