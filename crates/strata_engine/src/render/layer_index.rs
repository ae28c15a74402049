//! Per-layer ordered entity buckets
//!
//! Buckets are cleaned lazily: a destroyed entity's handle stays in its bucket,
//! inert, until the next [`RenderLayerIndex::refresh`]. That keeps insertion
//! O(1) amortized and teardown free of cross-subsystem notifications.

use crate::ecs::{Entity, EntityHandle, EntityManager};

use super::ordering::{sort_by_z_order, ZOrderAssignmentFn};
use super::RenderLayer;

/// Ordered handles of one layer plus its optional custom ordering
#[derive(Default)]
struct LayerBucket {
    handles: Vec<EntityHandle>,
    ordering: Option<ZOrderAssignmentFn>,
}

/// Ordered handle sequences for every render layer
pub struct RenderLayerIndex {
    buckets: [LayerBucket; RenderLayer::COUNT],
}

impl RenderLayerIndex {
    /// Create an index with empty buckets and default ordering everywhere
    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
        }
    }

    fn bucket(&self, layer: RenderLayer) -> &LayerBucket {
        &self.buckets[layer.index()]
    }

    fn bucket_mut(&mut self, layer: RenderLayer) -> &mut LayerBucket {
        &mut self.buckets[layer.index()]
    }

    /// Append a handle to a layer without re-sorting
    pub fn insert(&mut self, layer: RenderLayer, handle: EntityHandle) {
        self.bucket_mut(layer).handles.push(handle);
    }

    /// Remove every occurrence of a handle from a layer, returning how many were removed
    pub fn remove(&mut self, layer: RenderLayer, handle: EntityHandle) -> usize {
        let handles = &mut self.bucket_mut(layer).handles;
        let before = handles.len();
        handles.retain(|h| *h != handle);
        before - handles.len()
    }

    /// Remove a handle from every layer, returning how many entries were removed
    pub fn remove_everywhere(&mut self, handle: EntityHandle) -> usize {
        RenderLayer::ALL
            .iter()
            .map(|layer| self.remove(*layer, handle))
            .sum()
    }

    /// Drop handles whose entity no longer resolves or is marked for destruction
    ///
    /// Destroyed entities never become active again, so their entries can go
    /// before the manager's sweep. Never fails and is cheap enough to call
    /// every frame.
    pub fn refresh(&mut self, layer: RenderLayer, manager: &EntityManager) -> usize {
        let handles = &mut self.bucket_mut(layer).handles;
        let before = handles.len();
        handles.retain(|handle| manager.entity(*handle).is_some_and(Entity::is_active));
        let dropped = before - handles.len();
        if dropped > 0 {
            log::trace!("Dropped {} expired handles from {:?}", dropped, layer);
        }
        dropped
    }

    /// Apply the layer's ordering function, or the default z-order sort
    pub fn sort(&mut self, layer: RenderLayer, manager: &EntityManager) {
        let bucket = self.bucket_mut(layer);
        match bucket.ordering.as_mut() {
            Some(ordering) => ordering(bucket.handles.as_mut_slice(), manager),
            None => sort_by_z_order(&mut bucket.handles, manager),
        }
    }

    /// Replace the ordering function of one layer; used from the next sort on
    pub fn set_ordering(&mut self, layer: RenderLayer, ordering: ZOrderAssignmentFn) {
        self.bucket_mut(layer).ordering = Some(ordering);
    }

    /// Go back to the default z-order sort for one layer
    pub fn clear_ordering(&mut self, layer: RenderLayer) {
        self.bucket_mut(layer).ordering = None;
    }

    /// Whether the layer uses a custom ordering function
    pub fn has_custom_ordering(&self, layer: RenderLayer) -> bool {
        self.bucket(layer).ordering.is_some()
    }

    /// Current handle sequence of a layer, possibly containing expired handles
    pub fn handles(&self, layer: RenderLayer) -> &[EntityHandle] {
        &self.bucket(layer).handles
    }

    /// Whether a layer holds the handle
    pub fn contains(&self, layer: RenderLayer, handle: EntityHandle) -> bool {
        self.bucket(layer).handles.contains(&handle)
    }

    /// Number of entries across all layers
    pub fn len(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.handles.len()).sum()
    }

    /// Whether every layer is empty
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(|bucket| bucket.handles.is_empty())
    }
}

impl Default for RenderLayerIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RenderLayerIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for layer in RenderLayer::ALL {
            map.entry(&layer, &self.handles(layer).len());
        }
        map.finish()
    }
}
