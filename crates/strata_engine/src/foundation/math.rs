//! Math utilities and types
//!
//! Provides the 2D math types used by views, transforms and culling.

use serde::{Deserialize, Serialize};

pub use nalgebra::Vector2;

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// Axis-aligned rectangle in world units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub position: Vec2,

    /// Width and height, never negative for rectangles built through [`Rect::new`]
    pub size: Vec2,
}

impl Rect {
    /// Create a rectangle from its top-left corner and size
    ///
    /// Negative extents are folded so that `position` is always the minimum corner.
    pub fn new(position: Vec2, size: Vec2) -> Self {
        let min = Vec2::new(
            position.x.min(position.x + size.x),
            position.y.min(position.y + size.y),
        );
        Self {
            position: min,
            size: Vec2::new(size.x.abs(), size.y.abs()),
        }
    }

    /// Create a rectangle centered on `center`
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self::new(center - size * 0.5, size)
    }

    /// Minimum corner
    pub fn min(&self) -> Vec2 {
        self.position
    }

    /// Maximum corner
    pub fn max(&self) -> Vec2 {
        self.position + self.size
    }

    /// Whether the two rectangles overlap with a non-empty area
    pub fn intersects(&self, other: &Self) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        a_min.x < b_max.x && b_min.x < a_max.x && a_min.y < b_max.y && b_min.y < a_max.y
    }

    /// Whether `point` lies inside the rectangle (max edges exclusive)
    pub fn contains(&self, point: Vec2) -> bool {
        let (min, max) = (self.min(), self.max());
        point.x >= min.x && point.x < max.x && point.y >= min.y && point.y < max.y
    }
}
