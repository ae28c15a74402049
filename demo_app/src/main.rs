//! Headless scene demo: builds a small layered scene, runs a frame loop and
//! logs what would be drawn

use strata_engine::ecs::component::AsAny;
use strata_engine::ecs::components::SpriteDrawable;
use strata_engine::foundation::logging;
use strata_engine::prelude::*;
use strata_engine::render::target::intersects_view;
use strata_engine::terrain::{TileLayerData, TileLayerDrawable, TileMapData, TiledTerrain};

const FRAME_TIME: f32 = 1.0 / 60.0;
const FRAMES: usize = 4;

/// Surface that culls by bounds and logs every draw call
#[derive(Default)]
struct LoggingSurface {
    draw_calls: Vec<String>,
}

impl RenderTarget for LoggingSurface {
    fn is_visible(&self, entity: &Entity, view: &View) -> bool {
        intersects_view(entity, view)
    }

    fn draw(&mut self, entity: &Entity, drawable: &dyn Drawable, _view: &View) {
        let description = if let Some(sprite) = drawable.as_any().downcast_ref::<SpriteDrawable>() {
            format!("sprite '{}'", sprite.texture)
        } else if let Some(layer) = drawable.as_any().downcast_ref::<TileLayerDrawable>() {
            format!("tile layer '{}' ({} tiles)", layer.name(), layer.occupied_tiles().count())
        } else {
            "unknown drawable".to_string()
        };
        log::info!("  draw {:?}: {}", entity.handle(), description);
        self.draw_calls.push(description);
    }
}

/// Marker that accumulates the time it has been updated for
#[derive(Debug, Default)]
struct Beacon {
    elapsed: f32,
}

impl Component for Beacon {
    fn update(&mut self, delta_time: f32) {
        self.elapsed += delta_time;
    }
}

fn spawn_sprite(
    entities: &mut EntityManager,
    bus: &EventBus,
    texture: &str,
    layer: RenderLayer,
    z_order: f32,
    position: Vec2,
) -> EntityHandle {
    let entity = entities.create_entity();
    entity.add_component(TransformComponent::from_position(position));
    entity.add_component(RenderInformationComponent::with_z_order(layer, z_order));
    entity.add_component(RenderComponent::new(SpriteDrawable::new(texture, Vec2::new(64.0, 64.0))));
    let handle = entity.handle();
    bus.raise(&EntityCreatedEvent::new(handle));
    handle
}

fn demo_map() -> TileMapData {
    TileMapData {
        columns: 4,
        rows: 2,
        tile_size: Vec2::new(32.0, 32.0),
        layers: vec![
            TileLayerData {
                name: "ground".into(),
                tiles: vec![1; 8],
            },
            TileLayerData {
                name: "rocks".into(),
                tiles: vec![0, 3, 0, 0, 3, 0, 0, 3],
            },
        ],
    }
}

fn load_config() -> Result<EngineConfig, ConfigError> {
    match std::env::args().nth(1) {
        Some(path) => EngineConfig::load_from_file(&path),
        None => Ok(EngineConfig::default()),
    }
}

fn run(config: &EngineConfig) -> Result<(), Box<dyn std::error::Error>> {
    let bus = EventBus::new();
    let mut entities = EntityManager::with_config(&config.entities);
    let mut render_system = RenderSystem::new(&bus, &config.render);
    let mut surface = LoggingSurface::default();

    let sky = spawn_sprite(&mut entities, &bus, "sky", RenderLayer::Background, 0.0, Vec2::zeros());
    let ship = spawn_sprite(&mut entities, &bus, "ship", RenderLayer::Foreground, 10.0, Vec2::new(200.0, 150.0));
    let wreck = spawn_sprite(&mut entities, &bus, "wreck", RenderLayer::Foreground, 5.0, Vec2::new(300.0, 150.0));
    spawn_sprite(&mut entities, &bus, "score", RenderLayer::Gui, 0.0, Vec2::new(16.0, 16.0));
    spawn_sprite(&mut entities, &bus, "offscreen", RenderLayer::Foreground, 1.0, Vec2::new(-500.0, -500.0));

    entities.get_mut(sky)?.add_component(Beacon::default());
    entities.add_entity_to_group(ship, "Ships")?;
    entities.add_entity_to_group(wreck, "ships")?;

    let terrain = TiledTerrain::from_map(&demo_map(), Vec2::new(0.0, 400.0), &mut entities, &bus)?;
    // Rocks under the ground layer until the second frame
    terrain.swap_render_layer_order(0, 1, &mut entities)?;

    for frame in 0..FRAMES {
        if frame == 1 {
            terrain.swap_render_layer_order(0, 1, &mut entities)?;
        }
        if frame == 2 {
            log::info!("Destroying {:?} without a removal event", wreck);
            entities.destroy_entity(wreck);
        }

        entities.update(FRAME_TIME);
        render_system.view_mut(RenderLayer::Background).move_by(Vec2::new(4.0, 0.0));

        surface.draw_calls.clear();
        let stats = render_system.render(&entities, &mut surface);
        log::info!(
            "Frame {}: {} drawn, {} culled, {} ships in group",
            frame,
            stats.drawn,
            stats.culled,
            entities.get_group("ships").len()
        );
    }

    let beacon = entities.get(sky)?.get_component::<Beacon>()?;
    log::info!("Beacon ran for {:.3}s over {} frames", beacon.elapsed, FRAMES);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    logging::init_with_filter(&config.logging.filter);

    log::info!("Starting Strata scene demo");
    match run(&config) {
        Ok(()) => {
            log::info!("Scene demo completed successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Scene demo failed: {}", e);
            Err(e)
        }
    }
}
