//! Component trait and the per-entity component store

use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Upcast helper so boxed components can be downcast to their concrete kind
pub trait AsAny: Any {
    /// Borrow as `&dyn Any`
    fn as_any(&self) -> &dyn Any;
    /// Borrow as `&mut dyn Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Convert a boxed value into `Box<dyn Any>`
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Data or behaviour attached to an entity, at most one per concrete type
pub trait Component: AsAny {
    /// Per-frame update, called in the order components were attached
    fn update(&mut self, _delta_time: f32) {}
}

/// Heterogeneous component collection keyed by component kind
///
/// Attach order is preserved because per-entity update order is load-bearing.
#[derive(Default)]
pub struct ComponentStore {
    components: HashMap<TypeId, Box<dyn Component>>,
    order: Vec<TypeId>,
}

impl ComponentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a component, replacing any previous one of the same kind in place
    pub fn insert<T: Component>(&mut self, component: T) -> &mut T {
        let type_id = TypeId::of::<T>();
        if self.components.insert(type_id, Box::new(component)).is_some() {
            log::debug!("Replaced existing {} component", std::any::type_name::<T>());
        } else {
            self.order.push(type_id);
        }

        self.get_mut::<T>()
            .unwrap_or_else(|| unreachable!("component was inserted above"))
    }

    /// Whether a component of kind `T` is attached
    pub fn contains<T: Component>(&self) -> bool {
        self.components.contains_key(&TypeId::of::<T>())
    }

    /// Borrow the component of kind `T`
    pub fn get<T: Component>(&self) -> Option<&T> {
        self.components
            .get(&TypeId::of::<T>())
            .and_then(|component| (**component).as_any().downcast_ref::<T>())
    }

    /// Mutably borrow the component of kind `T`
    pub fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.components
            .get_mut(&TypeId::of::<T>())
            .and_then(|component| (**component).as_any_mut().downcast_mut::<T>())
    }

    /// Detach and return the component of kind `T`
    pub fn remove<T: Component>(&mut self) -> Option<T> {
        let type_id = TypeId::of::<T>();
        let boxed = self.components.remove(&type_id)?;
        self.order.retain(|id| *id != type_id);

        boxed.into_any().downcast::<T>().ok().map(|component| *component)
    }

    /// Update every component in attach order
    pub fn update_all(&mut self, delta_time: f32) {
        for type_id in &self.order {
            if let Some(component) = self.components.get_mut(type_id) {
                component.update(delta_time);
            }
        }
    }

    /// Number of attached components
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether nothing is attached
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl std::fmt::Debug for ComponentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentStore")
            .field("count", &self.order.len())
            .finish()
    }
}
