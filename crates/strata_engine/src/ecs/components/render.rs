//! Render-capable component
//!
//! Holds the entity-owned drawable state that the render system hands to the
//! drawing surface.

use crate::ecs::Component;
use crate::foundation::math::{Rect, Vec2};
use crate::render::Drawable;

/// Component carrying an entity's drawable
pub struct RenderComponent {
    drawable: Box<dyn Drawable>,
}

impl RenderComponent {
    /// Wrap a drawable
    pub fn new(drawable: impl Drawable) -> Self {
        Self {
            drawable: Box::new(drawable),
        }
    }

    /// The drawable handed to the surface
    pub fn drawable(&self) -> &dyn Drawable {
        self.drawable.as_ref()
    }

    /// Downcast the drawable to a concrete kind
    pub fn drawable_as<T: Drawable>(&self) -> Option<&T> {
        (*self.drawable).as_any().downcast_ref::<T>()
    }

    /// Mutably downcast the drawable to a concrete kind
    pub fn drawable_as_mut<T: Drawable>(&mut self) -> Option<&mut T> {
        (*self.drawable).as_any_mut().downcast_mut::<T>()
    }
}

impl Component for RenderComponent {}

impl std::fmt::Debug for RenderComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderComponent")
            .field("local_bounds", &self.drawable.local_bounds())
            .finish()
    }
}

/// Textured rectangle, the most common drawable
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteDrawable {
    /// Key of the texture in the surface's resource store
    pub texture: String,
    /// Size in local units, anchored at the local origin
    pub size: Vec2,
}

impl SpriteDrawable {
    /// Create a sprite of `size` showing `texture`
    pub fn new(texture: impl Into<String>, size: Vec2) -> Self {
        Self {
            texture: texture.into(),
            size,
        }
    }
}

impl Drawable for SpriteDrawable {
    fn local_bounds(&self) -> Rect {
        Rect::new(Vec2::zeros(), self.size)
    }
}
