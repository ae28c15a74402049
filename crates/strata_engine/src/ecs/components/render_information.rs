//! Render configuration of an entity
//!
//! Declares which layer an entity is drawn in and where it sorts within that
//! layer. Entities without this component are never indexed for drawing.

use crate::ecs::Component;
use crate::render::RenderLayer;

/// Layer membership and z-order of a drawable entity
#[derive(Debug, Clone, PartialEq)]
pub struct RenderInformationComponent {
    layer: RenderLayer,
    z_order: f32,
}

impl RenderInformationComponent {
    /// Create render information for `layer` with z-order 0
    pub fn new(layer: RenderLayer) -> Self {
        Self { layer, z_order: 0.0 }
    }

    /// Create render information with an explicit z-order
    pub fn with_z_order(layer: RenderLayer, z_order: f32) -> Self {
        Self { layer, z_order }
    }

    /// Layer the entity is indexed under
    ///
    /// Fixed for the entity's lifetime since the render system reads it once,
    /// when the creation event arrives.
    pub fn layer(&self) -> RenderLayer {
        self.layer
    }

    /// Sort key within the layer, lower values are drawn first
    pub fn z_order(&self) -> f32 {
        self.z_order
    }

    /// Change the sort key; picked up by the next sort of the layer
    pub fn set_z_order(&mut self, z_order: f32) {
        self.z_order = z_order;
    }
}

impl Component for RenderInformationComponent {}
