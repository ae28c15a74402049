//! Entity-Component-System implementation
//!
//! Entities are owned by the [`EntityManager`] and referenced everywhere else
//! through generational [`EntityHandle`]s resolved by a [`HandleRegistry`].

pub mod handle;
pub mod entity;
pub mod entity_manager;
pub mod component;
pub mod components;
pub mod systems;

pub use handle::{EntityHandle, HandleRegistry};
pub use entity::Entity;
pub use entity_manager::EntityManager;
pub use component::Component;

use thiserror::Error;

/// Errors surfaced by entity and component queries
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The handle is null or its entity has been swept
    #[error("Entity not found: {0:?}")]
    EntityNotFound(EntityHandle),

    /// The entity has no component of the requested kind
    #[error("Component not found: {component}")]
    ComponentNotFound {
        /// Type name of the requested component
        component: &'static str,
    },
}

impl EcsError {
    /// Not-found error for component kind `T`
    pub fn component_not_found<T: 'static>() -> Self {
        Self::ComponentNotFound {
            component: std::any::type_name::<T>(),
        }
    }
}
