//! ECS Components module
//!
//! Components the core itself reads. Gameplay components live in user code.

pub mod transform;
pub mod render_information;
pub mod render;

pub use transform::TransformComponent;
pub use render_information::RenderInformationComponent;
pub use render::{RenderComponent, SpriteDrawable};
