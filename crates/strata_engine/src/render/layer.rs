//! Render layer declaration

use serde::{Deserialize, Serialize};

/// Named draw bucket, composited in declaration order
///
/// Layers declared first are drawn first and therefore end up underneath.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RenderLayer {
    /// Terrain, sky and other backdrops
    Background,
    /// Game objects
    Foreground,
    /// Interface drawn on top of everything else
    Gui,
}

impl RenderLayer {
    /// Number of layers
    pub const COUNT: usize = 3;

    /// Every layer in draw order
    pub const ALL: [Self; Self::COUNT] = [Self::Background, Self::Foreground, Self::Gui];

    /// Position of the layer in draw order
    pub const fn index(self) -> usize {
        self as usize
    }
}
