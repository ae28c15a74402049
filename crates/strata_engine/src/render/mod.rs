//! Layered render ordering
//!
//! The core keeps, per [`RenderLayer`], an ordered bucket of entity handles and
//! decides draw order. Pixels are produced by an external [`RenderTarget`].
//!
//! ## Architecture
//!
//! - **RenderLayerIndex**: per-layer handle buckets with pluggable ordering
//! - **ordering**: stable insertion sort by z-order, the default policy
//! - **View**: visible world region handed to culling and drawing
//! - **RenderTarget / Drawable**: the boundary to the drawing surface
//!
//! The event-driven glue lives in [`RenderSystem`](crate::ecs::systems::RenderSystem).

pub mod layer;
pub mod layer_index;
pub mod ordering;
pub mod target;
pub mod view;

pub use layer::RenderLayer;
pub use layer_index::RenderLayerIndex;
pub use ordering::ZOrderAssignmentFn;
pub use target::{Drawable, RenderTarget};
pub use view::View;
