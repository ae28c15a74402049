//! Draw ordering within a render layer
//!
//! Frame-to-frame orderings are almost sorted already, only entities whose
//! z-order just changed are out of place, so the default order is a stable
//! insertion sort: near linear on that input and it never reorders ties.

use crate::ecs::components::RenderInformationComponent;
use crate::ecs::{EntityHandle, EntityManager};

/// Custom ordering for one layer: reorder the layer's handles in place
///
/// The function must produce a deterministic total order. Handles in the slice
/// have been refreshed and resolve through the manager.
pub type ZOrderAssignmentFn = Box<dyn FnMut(&mut [EntityHandle], &EntityManager)>;

/// Stable insertion sort by a key extracted once per element
///
/// Elements with equal keys keep their relative order. Keys that do not compare
/// (NaN) never move past their neighbours.
pub fn insertion_sort_by_key<T, K, F>(items: &mut [T], mut key: F)
where
    K: PartialOrd,
    F: FnMut(&T) -> K,
{
    if items.len() < 2 {
        return;
    }

    let mut keys: Vec<K> = items.iter().map(&mut key).collect();
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && keys[j - 1] > keys[j] {
            keys.swap(j - 1, j);
            items.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// Z-order of an entity for sorting
///
/// Entities that no longer resolve or lack render information sort first.
pub fn z_order_of(manager: &EntityManager, handle: EntityHandle) -> f32 {
    manager
        .entity(handle)
        .and_then(|entity| entity.get_component::<RenderInformationComponent>().ok())
        .map_or(f32::NEG_INFINITY, RenderInformationComponent::z_order)
}

/// Default layer ordering: ascending z-order, ties in insertion order
pub fn sort_by_z_order(handles: &mut [EntityHandle], manager: &EntityManager) {
    insertion_sort_by_key(handles, |handle| z_order_of(manager, *handle));
}
