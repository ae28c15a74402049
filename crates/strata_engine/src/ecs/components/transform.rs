//! Transform component for 2D entities
//!
//! Pure data: position and scale in world space. Rotation is left to the
//! drawing surface since culling works on axis-aligned bounds.

use crate::ecs::Component;
use crate::foundation::math::{Rect, Vec2};

/// World placement of an entity
#[derive(Debug, Clone, PartialEq)]
pub struct TransformComponent {
    /// World space position of the local origin
    pub position: Vec2,

    /// Scale factors applied to local coordinates
    pub scale: Vec2,
}

impl Component for TransformComponent {}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            scale: Vec2::new(1.0, 1.0),
        }
    }
}

impl TransformComponent {
    /// Create from position only
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Move by `offset`
    pub fn translate(&mut self, offset: Vec2) {
        self.position += offset;
    }

    /// Map a local point into world space
    pub fn transform_point(&self, local: Vec2) -> Vec2 {
        self.position + local.component_mul(&self.scale)
    }

    /// Map a local rectangle into world space
    pub fn transform_rect(&self, local: &Rect) -> Rect {
        let corner = self.transform_point(local.position);
        Rect::new(corner, local.size.component_mul(&self.scale))
    }
}
