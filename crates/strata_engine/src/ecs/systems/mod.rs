//! Systems that operate on entities owned by the [`EntityManager`](crate::ecs::EntityManager)

pub mod render_system;

pub use render_system::{RenderStats, RenderSystem};
