//! Tiled terrain
//!
//! A terrain turns an already parsed tile map into one entity per map layer.
//! Every layer entity is drawn in [`RenderLayer::Foreground`] with a z-order
//! equal to the layer's position in the map, so later layers cover earlier
//! ones until [`TiledTerrain::swap_render_layer_order`] says otherwise.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ecs::components::{RenderComponent, RenderInformationComponent, TransformComponent};
use crate::ecs::{EcsError, EntityHandle, EntityManager};
use crate::events::{EntityCreatedEvent, EventBus};
use crate::foundation::math::{Rect, Vec2};
use crate::render::{Drawable, RenderLayer};

/// Tile id marking an empty cell
pub const EMPTY_TILE: u32 = 0;

/// Errors raised while building or reordering a terrain
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TerrainError {
    /// A layer index outside `0..layer_count`
    #[error("Layer index {index} out of range, terrain has {layer_count} layers")]
    LayerIndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of layers in the terrain
        layer_count: usize,
    },

    /// A layer whose tile count does not match the map size
    #[error("Layer '{layer}' has {actual} tiles, expected {expected}")]
    TileCountMismatch {
        /// Name of the offending layer
        layer: String,
        /// `columns * rows` of the map
        expected: usize,
        /// Tiles actually supplied
        actual: usize,
    },

    /// A layer entity could not be resolved
    #[error(transparent)]
    Ecs(#[from] EcsError),
}

/// One parsed layer of a tile map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileLayerData {
    /// Layer name as authored in the map
    pub name: String,
    /// Raw tile ids in row-major order, [`EMPTY_TILE`] for empty cells
    pub tiles: Vec<u32>,
}

/// Parsed tile map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileMapData {
    /// Number of tile columns
    pub columns: u32,
    /// Number of tile rows
    pub rows: u32,
    /// Size of one tile in world units
    pub tile_size: Vec2,
    /// Layers from bottom to top
    pub layers: Vec<TileLayerData>,
}

impl TileMapData {
    /// Number of cells in every layer
    pub fn cell_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }
}

/// Drawable holding one layer's tile grid
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayerDrawable {
    name: String,
    columns: u32,
    rows: u32,
    tile_size: Vec2,
    tiles: Vec<u32>,
}

impl TileLayerDrawable {
    /// Layer name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Grid dimensions as `(columns, rows)`
    pub fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Size of one tile in local units
    pub fn tile_size(&self) -> Vec2 {
        self.tile_size
    }

    /// Tile id at a cell, `None` for empty cells and cells outside the grid
    pub fn tile(&self, column: u32, row: u32) -> Option<u32> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        let id = self.tiles[row as usize * self.columns as usize + column as usize];
        (id != EMPTY_TILE).then_some(id)
    }

    /// Non-empty cells as `(column, row, id)` in row-major order
    pub fn occupied_tiles(&self) -> impl Iterator<Item = (u32, u32, u32)> + '_ {
        let columns = self.columns as usize;
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, id)| **id != EMPTY_TILE)
            .map(move |(i, id)| ((i % columns) as u32, (i / columns) as u32, *id))
    }
}

impl Drawable for TileLayerDrawable {
    fn local_bounds(&self) -> Rect {
        Rect::new(
            Vec2::zeros(),
            Vec2::new(
                self.columns as f32 * self.tile_size.x,
                self.rows as f32 * self.tile_size.y,
            ),
        )
    }
}

/// Ordered set of layer entities built from a tile map
#[derive(Debug, Clone)]
pub struct TiledTerrain {
    position: Vec2,
    columns: u32,
    rows: u32,
    tile_size: Vec2,
    layers: Vec<EntityHandle>,
}

impl TiledTerrain {
    /// Create an empty terrain placed at `position`
    pub fn new(position: Vec2, columns: u32, rows: u32, tile_size: Vec2) -> Self {
        Self {
            position,
            columns,
            rows,
            tile_size,
            layers: Vec::new(),
        }
    }

    /// Build a terrain with one entity per layer of `map`
    ///
    /// Layers are validated up front, nothing is created when one is malformed.
    pub fn from_map(
        map: &TileMapData,
        position: Vec2,
        manager: &mut EntityManager,
        bus: &EventBus,
    ) -> Result<Self, TerrainError> {
        let mut terrain = Self::new(position, map.columns, map.rows, map.tile_size);
        for layer in &map.layers {
            terrain.check_tile_count(layer)?;
        }
        for layer in &map.layers {
            terrain.add_tile_map_layer(layer, manager, bus)?;
        }
        log::debug!(
            "Built terrain of {}x{} tiles with {} layers",
            map.columns,
            map.rows,
            terrain.layer_count()
        );
        Ok(terrain)
    }

    fn check_tile_count(&self, layer: &TileLayerData) -> Result<(), TerrainError> {
        let expected = self.columns as usize * self.rows as usize;
        if layer.tiles.len() == expected {
            Ok(())
        } else {
            Err(TerrainError::TileCountMismatch {
                layer: layer.name.clone(),
                expected,
                actual: layer.tiles.len(),
            })
        }
    }

    /// Create the entity of one more layer on top of the existing ones
    ///
    /// The creation event is raised only after every component is attached,
    /// so the render system sees a complete entity.
    pub fn add_tile_map_layer(
        &mut self,
        layer: &TileLayerData,
        manager: &mut EntityManager,
        bus: &EventBus,
    ) -> Result<EntityHandle, TerrainError> {
        self.check_tile_count(layer)?;

        let z_order = self.layers.len() as f32;
        let entity = manager.create_entity();
        entity.add_component(TransformComponent::from_position(self.position));
        entity.add_component(RenderInformationComponent::with_z_order(
            RenderLayer::Foreground,
            z_order,
        ));
        entity.add_component(RenderComponent::new(TileLayerDrawable {
            name: layer.name.clone(),
            columns: self.columns,
            rows: self.rows,
            tile_size: self.tile_size,
            tiles: layer.tiles.clone(),
        }));

        let handle = entity.handle();
        self.layers.push(handle);
        bus.raise(&EntityCreatedEvent::new(handle));
        Ok(handle)
    }

    /// Handle of the layer at `index`, or the null handle when out of range
    pub fn layer(&self, index: usize) -> EntityHandle {
        self.layers.get(index).copied().unwrap_or_else(EntityHandle::null)
    }

    /// Number of layers
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// World position of the terrain's top-left corner
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// World-space area covered by the tile grid
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.position,
            Vec2::new(
                self.columns as f32 * self.tile_size.x,
                self.rows as f32 * self.tile_size.y,
            ),
        )
    }

    /// Swap the draw order of two layers
    ///
    /// Only the z-orders change; the next sort of the foreground layer applies
    /// the new order. Swapping a layer with itself does nothing.
    pub fn swap_render_layer_order(
        &self,
        first: usize,
        second: usize,
        manager: &mut EntityManager,
    ) -> Result<(), TerrainError> {
        let layer_count = self.layers.len();
        for index in [first, second] {
            if index >= layer_count {
                return Err(TerrainError::LayerIndexOutOfRange { index, layer_count });
            }
        }
        if first == second {
            return Ok(());
        }

        let (a, b) = (self.layers[first], self.layers[second]);
        let z_a = manager.get(a)?.get_component::<RenderInformationComponent>()?.z_order();
        let z_b = manager.get(b)?.get_component::<RenderInformationComponent>()?.z_order();

        manager
            .get_mut(a)?
            .get_component_mut::<RenderInformationComponent>()?
            .set_z_order(z_b);
        manager
            .get_mut(b)?
            .get_component_mut::<RenderInformationComponent>()?
            .set_z_order(z_a);
        Ok(())
    }
}
