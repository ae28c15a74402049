//! End-to-end entity lifecycle and render ordering scenarios

use std::cell::RefCell;
use std::rc::Rc;

use strata_engine::ecs::components::SpriteDrawable;
use strata_engine::ecs::systems::RenderStats;
use strata_engine::input::ClickableComponent;
use strata_engine::prelude::*;
use strata_engine::terrain::{TileLayerData, TileMapData, TiledTerrain};

/// Surface that draws everything and records the order
#[derive(Default)]
struct RecordingTarget {
    frames: Vec<Vec<EntityHandle>>,
}

impl RecordingTarget {
    fn last_frame(&self) -> &[EntityHandle] {
        self.frames.last().map(Vec::as_slice).unwrap_or_default()
    }
}

impl RenderTarget for RecordingTarget {
    fn is_visible(&self, _entity: &Entity, _view: &View) -> bool {
        true
    }

    fn draw(&mut self, entity: &Entity, _drawable: &dyn Drawable, _view: &View) {
        if let Some(frame) = self.frames.last_mut() {
            frame.push(entity.handle());
        }
    }
}

struct Scene {
    bus: EventBus,
    entities: EntityManager,
    render: RenderSystem,
    target: RecordingTarget,
}

impl Scene {
    fn new() -> Self {
        let bus = EventBus::new();
        let render = RenderSystem::new(&bus, &RenderConfig::default());
        Self {
            bus,
            entities: EntityManager::new(),
            render,
            target: RecordingTarget::default(),
        }
    }

    fn spawn(&mut self, layer: RenderLayer, z_order: f32) -> EntityHandle {
        let entity = self.entities.create_entity();
        entity.add_component(RenderInformationComponent::with_z_order(layer, z_order));
        entity.add_component(RenderComponent::new(SpriteDrawable::new("sprite", Vec2::new(8.0, 8.0))));
        let handle = entity.handle();
        self.bus.raise(&EntityCreatedEvent::new(handle));
        handle
    }

    fn frame(&mut self) -> RenderStats {
        self.entities.update(1.0 / 60.0);
        self.target.frames.push(Vec::new());
        self.render.render(&self.entities, &mut self.target)
    }
}

#[test]
fn test_layers_draw_in_declaration_order_then_by_z() {
    let mut scene = Scene::new();
    let background = scene.spawn(RenderLayer::Background, 0.0);
    let far = scene.spawn(RenderLayer::Foreground, 5.0);
    let near = scene.spawn(RenderLayer::Foreground, 2.0);

    scene.frame();

    assert_eq!(scene.render.layer_handles(RenderLayer::Background), vec![background]);
    assert_eq!(scene.target.last_frame(), &[background, near, far]);
}

#[test]
fn test_sort_is_stable_across_insertions() {
    let mut scene = Scene::new();
    let three = scene.spawn(RenderLayer::Gui, 3.0);
    let one = scene.spawn(RenderLayer::Gui, 1.0);
    let two = scene.spawn(RenderLayer::Gui, 2.0);
    scene.frame();
    assert_eq!(scene.target.last_frame(), &[one, two, three]);

    let late_one = scene.spawn(RenderLayer::Gui, 1.0);
    scene.frame();
    assert_eq!(scene.target.last_frame(), &[one, late_one, two, three]);
}

#[test]
fn test_destroyed_entity_gone_after_one_render() {
    let mut scene = Scene::new();
    let doomed = scene.spawn(RenderLayer::Foreground, 0.0);
    let survivor = scene.spawn(RenderLayer::Foreground, 1.0);
    scene.frame();
    assert_eq!(scene.target.last_frame(), &[doomed, survivor]);

    // No removal event is raised
    assert!(scene.entities.destroy_entity(doomed));
    scene.frame();

    assert_eq!(scene.target.last_frame(), &[survivor]);
    assert!(!scene.render.is_indexed(doomed));
    assert!(scene.entities.entity(doomed).is_none());
}

#[test]
fn test_handles_stay_valid_until_refresh() {
    let mut entities = EntityManager::new();
    let handle = entities.create_entity().handle();

    entities.entity_mut(handle).unwrap().destroy();
    let entity = entities.get(handle).unwrap();
    assert!(!entity.is_active());

    entities.refresh();
    assert_eq!(entities.get(handle).unwrap_err(), EcsError::EntityNotFound(handle));

    // A reused slot does not revive the old handle
    let replacement = entities.create_entity().handle();
    assert_ne!(replacement, handle);
    assert!(entities.entity(handle).is_none());

    // Destroying a swept entity is a no-op
    assert!(!entities.destroy_entity(handle));
    entities.refresh();
    assert!(entities.contains(replacement));
}

#[test]
fn test_groups_only_hold_active_members() {
    let mut entities = EntityManager::new();
    let stays = entities.create_entity().handle();
    let leaves = entities.create_entity().handle();
    let dies = entities.create_entity().handle();
    for handle in [stays, leaves, dies] {
        entities.add_entity_to_group(handle, "Enemies ").unwrap();
    }

    entities.entity_mut(leaves).unwrap().remove_from_group("enemies");
    entities.destroy_entity(dies);
    entities.update(0.016);

    assert_eq!(entities.get_group("ENEMIES"), &[stays]);
    assert!(entities.get_group("nobody").is_empty());
}

#[test]
fn test_events_reach_subscribers_in_order() {
    let bus = EventBus::new();
    let seen = Rc::new(RefCell::new(Vec::new()));

    let first = seen.clone();
    let token = bus.subscribe(move |event: &EntityCreatedEvent| first.borrow_mut().push(("first", event.handle())));
    let second = seen.clone();
    let _guard = bus.subscribe_scoped(move |event: &EntityCreatedEvent| second.borrow_mut().push(("second", event.handle())));

    let mut entities = EntityManager::new();
    let handle = entities.create_entity().handle();
    assert_eq!(bus.raise(&EntityCreatedEvent::new(handle)), 2);
    assert_eq!(*seen.borrow(), vec![("first", handle), ("second", handle)]);

    assert!(bus.unsubscribe(token));
    assert!(!bus.unsubscribe(token));
    assert_eq!(bus.raise(&EntityCreatedEvent::new(handle)), 1);
}

#[test]
fn test_terrain_layers_render_in_swapped_order() {
    let mut scene = Scene::new();
    let map = TileMapData {
        columns: 2,
        rows: 2,
        tile_size: Vec2::new(32.0, 32.0),
        layers: vec![
            TileLayerData {
                name: "ground".into(),
                tiles: vec![1, 1, 1, 1],
            },
            TileLayerData {
                name: "trees".into(),
                tiles: vec![0, 4, 4, 0],
            },
        ],
    };
    let terrain = TiledTerrain::from_map(&map, Vec2::zeros(), &mut scene.entities, &scene.bus).unwrap();
    let (ground, trees) = (terrain.layer(0), terrain.layer(1));

    scene.frame();
    assert_eq!(scene.target.last_frame(), &[ground, trees]);

    terrain.swap_render_layer_order(0, 1, &mut scene.entities).unwrap();
    scene.frame();
    assert_eq!(scene.target.last_frame(), &[trees, ground]);
}

#[test]
fn test_clickable_forgets_destroyed_connections() {
    let mut entities = EntityManager::new();
    let button = entities.create_entity().handle();
    let label = entities.create_entity().handle();
    let mut clickable = ClickableComponent::new(button);
    clickable.add_connected(label);
    entities.get_mut(button).unwrap().add_component(clickable);

    entities.destroy_entity(label);
    entities.update(0.016);

    let mut clickable = entities
        .get_mut(button)
        .unwrap()
        .remove_component::<ClickableComponent>()
        .unwrap();
    assert_eq!(clickable.remove_expired(&entities), 1);
    assert_eq!(clickable.connected().collect::<Vec<_>>(), vec![button]);
}
