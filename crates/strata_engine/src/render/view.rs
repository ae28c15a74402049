//! 2D camera view

use serde::{Deserialize, Serialize};

use crate::foundation::math::{Rect, Vec2};

/// Visible region of the world for one render layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct View {
    /// World position at the middle of the screen
    pub center: Vec2,
    /// Visible width and height in world units
    pub size: Vec2,
}

impl View {
    /// Create a view from its center and size
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self { center, size }
    }

    /// View whose top-left corner sits at the world origin
    pub fn from_size(size: Vec2) -> Self {
        Self::new(size * 0.5, size)
    }

    /// Visible world rectangle
    pub fn bounds(&self) -> Rect {
        Rect::from_center(self.center, self.size)
    }

    /// Move the view by `offset`
    pub fn move_by(&mut self, offset: Vec2) {
        self.center += offset;
    }

    /// Scale the visible area, factors above one zoom out
    pub fn zoom(&mut self, factor: f32) {
        self.size *= factor;
    }
}
