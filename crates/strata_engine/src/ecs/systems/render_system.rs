//! # Render System
//!
//! Keeps the render layer index in sync with entity lifecycle events and draws
//! every indexed entity, layer by layer, in sorted order.
//!
//! An entity's membership in the index moves `absent → indexed` when its
//! [`EntityCreatedEvent`] arrives and back to `absent` either on an
//! [`EntityRemovedEvent`] or, lazily, once its handle stops resolving. The
//! creation event only carries a handle, so newly created entities are queued
//! and placed in their layer the next time the system sees the entity manager.
//!
//! Events may arrive at any time, including from inside a render pass. The
//! change queue is never borrowed across a call into user code, so no event is
//! lost; a removal that finds the index busy is queued and applied at the next
//! sync.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::RenderConfig;
use crate::ecs::components::{RenderComponent, RenderInformationComponent};
use crate::ecs::{EntityHandle, EntityManager};
use crate::events::{EntityCreatedEvent, EntityRemovedEvent, EventBus, Subscription};
use crate::render::{RenderLayer, RenderLayerIndex, RenderTarget, View};

/// Lifecycle change waiting for the next sync
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndexChange {
    Created(EntityHandle),
    Removed(EntityHandle),
}

/// Per-frame draw counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Entities handed to the surface
    pub drawn: usize,
    /// Entities rejected by the surface's visibility test
    pub culled: usize,
    /// Indexed entities without a render component
    pub skipped: usize,
    /// Expired handles dropped by the refresh at the start of the pass
    pub expired: usize,
}

/// Event-driven glue between the entity manager and the drawing surface
pub struct RenderSystem {
    index: Rc<RefCell<RenderLayerIndex>>,
    changes: Rc<RefCell<Vec<IndexChange>>>,
    draw_list: Vec<EntityHandle>,
    views: [View; RenderLayer::COUNT],
    enabled: bool,
    log_draw_stats: bool,
    last_stats: RenderStats,

    // Released on drop, which unsubscribes both callbacks
    _entity_created: Subscription,
    _entity_removed: Subscription,
}

impl RenderSystem {
    /// Create the system and subscribe it to lifecycle events on `bus`
    pub fn new(bus: &EventBus, config: &RenderConfig) -> Self {
        let index = Rc::new(RefCell::new(RenderLayerIndex::new()));
        let changes = Rc::new(RefCell::new(Vec::new()));

        let created = Rc::clone(&changes);
        let entity_created = bus.subscribe_scoped(move |event: &EntityCreatedEvent| {
            created.borrow_mut().push(IndexChange::Created(event.handle()));
        });

        let (removed_index, removed) = (Rc::clone(&index), Rc::clone(&changes));
        let entity_removed = bus.subscribe_scoped(move |event: &EntityRemovedEvent| {
            let handle = event.handle();
            removed
                .borrow_mut()
                .retain(|change| *change != IndexChange::Created(handle));
            match removed_index.try_borrow_mut() {
                Ok(mut index) => {
                    index.remove_everywhere(handle);
                }
                Err(_) => {
                    log::trace!("Render index busy, deferred removal of {:?}", handle);
                    removed.borrow_mut().push(IndexChange::Removed(handle));
                }
            };
        });

        Self {
            index,
            changes,
            draw_list: Vec::new(),
            views: [View::from_size(config.viewport_size); RenderLayer::COUNT],
            enabled: true,
            log_draw_stats: config.log_draw_stats,
            last_stats: RenderStats::default(),
            _entity_created: entity_created,
            _entity_removed: entity_removed,
        }
    }

    /// Enable or disable drawing
    ///
    /// A disabled system still consumes lifecycle events on every `render()`.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Check if the system is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Index an entity under the layer its render information declares
    ///
    /// Entities without render information are left out silently, non-visual
    /// entities are common. Returns whether the entity was indexed.
    pub fn add_render_entity(&mut self, manager: &EntityManager, handle: EntityHandle) -> bool {
        let layer = match manager
            .entity(handle)
            .map(|entity| entity.get_component::<RenderInformationComponent>())
        {
            Some(Ok(info)) => info.layer(),
            Some(Err(_)) => {
                log::trace!("Entity {:?} has no render information, not indexed", handle);
                return false;
            }
            None => return false,
        };

        self.index.borrow_mut().insert(layer, handle);
        true
    }

    /// Stop drawing an entity that stays alive
    ///
    /// Equivalent to raising [`EntityRemovedEvent`] for it.
    pub fn remove_render_entity(&mut self, handle: EntityHandle) -> usize {
        self.changes
            .borrow_mut()
            .retain(|change| *change != IndexChange::Created(handle));
        self.index.borrow_mut().remove_everywhere(handle)
    }

    /// Apply every lifecycle change announced since the last sync, in order
    pub fn sync(&mut self, manager: &EntityManager) {
        let changes = std::mem::take(&mut *self.changes.borrow_mut());
        for change in changes {
            match change {
                IndexChange::Created(handle) => {
                    self.add_render_entity(manager, handle);
                }
                IndexChange::Removed(handle) => {
                    self.index.borrow_mut().remove_everywhere(handle);
                }
            }
        }
    }

    /// Replace the ordering function of one layer
    ///
    /// Takes effect on the next sort; the current order is left as is.
    pub fn set_z_order_assignment_function(
        &mut self,
        layer: RenderLayer,
        function: impl FnMut(&mut [EntityHandle], &EntityManager) + 'static,
    ) {
        self.index.borrow_mut().set_ordering(layer, Box::new(function));
    }

    /// Restore the default z-order sort for one layer
    pub fn reset_z_order_assignment_function(&mut self, layer: RenderLayer) {
        self.index.borrow_mut().clear_ordering(layer);
    }

    /// Replace the view of one layer
    pub fn set_view(&mut self, layer: RenderLayer, view: View) {
        self.views[layer.index()] = view;
    }

    /// View of one layer
    pub fn view(&self, layer: RenderLayer) -> &View {
        &self.views[layer.index()]
    }

    /// Mutable view of one layer, preferred over replacing it
    pub fn view_mut(&mut self, layer: RenderLayer) -> &mut View {
        &mut self.views[layer.index()]
    }

    /// Current order of a layer, as of the last sort
    pub fn layer_handles(&self, layer: RenderLayer) -> Vec<EntityHandle> {
        self.index.borrow().handles(layer).to_vec()
    }

    /// Whether any layer holds the handle
    pub fn is_indexed(&self, handle: EntityHandle) -> bool {
        let index = self.index.borrow();
        RenderLayer::ALL
            .iter()
            .any(|layer| index.contains(*layer, handle))
    }

    /// Number of announced entities waiting for the next sync
    pub fn pending_count(&self) -> usize {
        self.changes
            .borrow()
            .iter()
            .filter(|change| matches!(change, IndexChange::Created(_)))
            .count()
    }

    /// Counters of the last render pass
    pub fn last_stats(&self) -> RenderStats {
        self.last_stats
    }

    /// Draw all indexed entities
    ///
    /// Lifecycle changes are applied first, also when the system is disabled.
    /// Layers are then visited in declaration order. Each layer is refreshed,
    /// then ordered, then every entity the surface reports as visible is drawn
    /// through its render component. Events raised by the surface while a
    /// layer is drawn change the index right away but not the list being drawn.
    pub fn render(&mut self, manager: &EntityManager, target: &mut dyn RenderTarget) -> RenderStats {
        self.sync(manager);
        if !self.enabled {
            return RenderStats::default();
        }

        let mut stats = RenderStats::default();
        for layer in RenderLayer::ALL {
            {
                let mut index = self.index.borrow_mut();
                stats.expired += index.refresh(layer, manager);
                index.sort(layer, manager);
                self.draw_list.clear();
                self.draw_list.extend_from_slice(index.handles(layer));
            }

            let view = &self.views[layer.index()];
            for handle in &self.draw_list {
                let Some(entity) = manager.entity(*handle) else {
                    continue;
                };
                let Ok(render) = entity.get_component::<RenderComponent>() else {
                    stats.skipped += 1;
                    continue;
                };

                if target.is_visible(entity, view) {
                    target.draw(entity, render.drawable(), view);
                    stats.drawn += 1;
                } else {
                    stats.culled += 1;
                }
            }
        }

        if self.log_draw_stats {
            log::debug!(
                "Render pass: {} drawn, {} culled, {} skipped, {} expired",
                stats.drawn,
                stats.culled,
                stats.skipped,
                stats.expired
            );
        }
        self.last_stats = stats;
        stats
    }
}

impl std::fmt::Debug for RenderSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSystem")
            .field("index", &self.index.borrow())
            .field("enabled", &self.enabled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::SpriteDrawable;
    use crate::ecs::Entity;
    use crate::foundation::math::Vec2;
    use crate::render::Drawable;

    /// Surface that records draw order and hides a configurable set of entities
    #[derive(Default)]
    struct RecordingTarget {
        drawn: Vec<EntityHandle>,
        hidden: Vec<EntityHandle>,
    }

    impl RenderTarget for RecordingTarget {
        fn is_visible(&self, entity: &Entity, _view: &View) -> bool {
            !self.hidden.contains(&entity.handle())
        }

        fn draw(&mut self, entity: &Entity, _drawable: &dyn Drawable, _view: &View) {
            self.drawn.push(entity.handle());
        }
    }

    fn spawn(manager: &mut EntityManager, bus: &EventBus, layer: RenderLayer, z: f32) -> EntityHandle {
        let entity = manager.create_entity();
        entity.add_component(RenderInformationComponent::with_z_order(layer, z));
        entity.add_component(RenderComponent::new(SpriteDrawable::new("test", Vec2::new(1.0, 1.0))));
        let handle = entity.handle();
        bus.raise(&EntityCreatedEvent::new(handle));
        handle
    }

    #[test]
    fn test_creation_event_indexes_by_layer() {
        let bus = EventBus::new();
        let mut manager = EntityManager::new();
        let mut system = RenderSystem::new(&bus, &RenderConfig::default());

        let bg = spawn(&mut manager, &bus, RenderLayer::Background, 0.0);
        let gui = spawn(&mut manager, &bus, RenderLayer::Gui, 0.0);
        assert_eq!(system.pending_count(), 2);

        system.sync(&manager);
        assert_eq!(system.pending_count(), 0);
        assert_eq!(system.layer_handles(RenderLayer::Background), vec![bg]);
        assert_eq!(system.layer_handles(RenderLayer::Gui), vec![gui]);
        assert!(system.layer_handles(RenderLayer::Foreground).is_empty());
    }

    #[test]
    fn test_entity_without_render_information_is_invisible() {
        let bus = EventBus::new();
        let mut manager = EntityManager::new();
        let mut system = RenderSystem::new(&bus, &RenderConfig::default());

        let logic_only = manager.create_entity().handle();
        bus.raise(&EntityCreatedEvent::new(logic_only));
        system.sync(&manager);

        assert!(!system.is_indexed(logic_only));
        assert!(!system.add_render_entity(&manager, logic_only));
    }

    #[test]
    fn test_removal_event_hides_live_entity() {
        let bus = EventBus::new();
        let mut manager = EntityManager::new();
        let mut system = RenderSystem::new(&bus, &RenderConfig::default());
        let mut target = RecordingTarget::default();

        let handle = spawn(&mut manager, &bus, RenderLayer::Foreground, 0.0);
        system.render(&manager, &mut target);
        assert_eq!(target.drawn, vec![handle]);

        bus.raise(&EntityRemovedEvent::new(handle));
        assert!(!system.is_indexed(handle));
        assert!(manager.contains(handle));

        target.drawn.clear();
        system.render(&manager, &mut target);
        assert!(target.drawn.is_empty());

        // Re-announcing brings it back
        bus.raise(&EntityCreatedEvent::new(handle));
        system.render(&manager, &mut target);
        assert_eq!(target.drawn, vec![handle]);
    }

    #[test]
    fn test_removal_before_sync_cancels_creation() {
        let bus = EventBus::new();
        let mut manager = EntityManager::new();
        let mut system = RenderSystem::new(&bus, &RenderConfig::default());

        let handle = spawn(&mut manager, &bus, RenderLayer::Foreground, 0.0);
        bus.raise(&EntityRemovedEvent::new(handle));
        system.sync(&manager);
        assert!(!system.is_indexed(handle));
    }

    #[test]
    fn test_destroyed_entity_disappears_without_removal_event() {
        let bus = EventBus::new();
        let mut manager = EntityManager::new();
        let mut system = RenderSystem::new(&bus, &RenderConfig::default());
        let mut target = RecordingTarget::default();

        let doomed = spawn(&mut manager, &bus, RenderLayer::Foreground, 0.0);
        let survivor = spawn(&mut manager, &bus, RenderLayer::Foreground, 1.0);
        system.render(&manager, &mut target);

        manager.destroy_entity(doomed);
        target.drawn.clear();
        let stats = system.render(&manager, &mut target);

        assert_eq!(stats.expired, 1);
        assert_eq!(target.drawn, vec![survivor]);
        assert_eq!(system.layer_handles(RenderLayer::Foreground), vec![survivor]);
    }

    #[test]
    fn test_culling_and_stats() {
        let bus = EventBus::new();
        let mut manager = EntityManager::new();
        let mut system = RenderSystem::new(&bus, &RenderConfig::default());

        let shown = spawn(&mut manager, &bus, RenderLayer::Foreground, 0.0);
        let hidden = spawn(&mut manager, &bus, RenderLayer::Foreground, 1.0);
        let bare = manager.create_entity();
        bare.add_component(RenderInformationComponent::new(RenderLayer::Foreground));
        let bare = bare.handle();
        bus.raise(&EntityCreatedEvent::new(bare));

        let mut target = RecordingTarget {
            hidden: vec![hidden],
            ..Default::default()
        };
        let stats = system.render(&manager, &mut target);

        assert_eq!(target.drawn, vec![shown]);
        assert_eq!(
            stats,
            RenderStats {
                drawn: 1,
                culled: 1,
                skipped: 1,
                expired: 0
            }
        );
        assert_eq!(system.last_stats(), stats);
    }

    #[test]
    fn test_custom_ordering_takes_effect_on_next_sort() {
        let bus = EventBus::new();
        let mut manager = EntityManager::new();
        let mut system = RenderSystem::new(&bus, &RenderConfig::default());
        let mut target = RecordingTarget::default();

        let a = spawn(&mut manager, &bus, RenderLayer::Gui, 1.0);
        let b = spawn(&mut manager, &bus, RenderLayer::Gui, 2.0);
        system.render(&manager, &mut target);
        assert_eq!(target.drawn, vec![a, b]);

        system.set_z_order_assignment_function(RenderLayer::Gui, |handles, _| handles.reverse());
        // Not retroactive
        assert_eq!(system.layer_handles(RenderLayer::Gui), vec![a, b]);

        target.drawn.clear();
        system.render(&manager, &mut target);
        assert_eq!(target.drawn, vec![b, a]);

        system.reset_z_order_assignment_function(RenderLayer::Gui);
        target.drawn.clear();
        system.render(&manager, &mut target);
        assert_eq!(target.drawn, vec![a, b]);
    }

    #[test]
    fn test_disabled_system_draws_nothing() {
        let bus = EventBus::new();
        let mut manager = EntityManager::new();
        let mut system = RenderSystem::new(&bus, &RenderConfig::default());
        let mut target = RecordingTarget::default();
        spawn(&mut manager, &bus, RenderLayer::Foreground, 0.0);

        system.set_enabled(false);
        assert!(!system.is_enabled());
        assert_eq!(system.render(&manager, &mut target), RenderStats::default());
        assert!(target.drawn.is_empty());
    }

    #[test]
    fn test_disabled_system_still_consumes_announcements() {
        let bus = EventBus::new();
        let mut manager = EntityManager::new();
        let mut system = RenderSystem::new(&bus, &RenderConfig::default());
        let mut target = RecordingTarget::default();
        system.set_enabled(false);

        let swept = spawn(&mut manager, &bus, RenderLayer::Foreground, 0.0);
        manager.destroy_entity(swept);
        manager.refresh();
        let live = spawn(&mut manager, &bus, RenderLayer::Foreground, 1.0);
        assert_eq!(system.pending_count(), 2);

        system.render(&manager, &mut target);
        assert_eq!(system.pending_count(), 0);
        assert!(!system.is_indexed(swept));
        assert!(system.is_indexed(live));
        assert!(target.drawn.is_empty());

        system.set_enabled(true);
        system.render(&manager, &mut target);
        assert_eq!(target.drawn, vec![live]);
    }

    /// Surface that announces lifecycle changes from inside its first draw call
    struct AnnouncingTarget {
        bus: EventBus,
        create: Option<EntityHandle>,
        remove: Option<EntityHandle>,
        drawn: Vec<EntityHandle>,
    }

    impl RenderTarget for AnnouncingTarget {
        fn is_visible(&self, _entity: &Entity, _view: &View) -> bool {
            true
        }

        fn draw(&mut self, entity: &Entity, _drawable: &dyn Drawable, _view: &View) {
            self.drawn.push(entity.handle());
            if let Some(handle) = self.create.take() {
                self.bus.raise(&EntityCreatedEvent::new(handle));
            }
            if let Some(handle) = self.remove.take() {
                self.bus.raise(&EntityRemovedEvent::new(handle));
            }
        }
    }

    #[test]
    fn test_events_raised_while_drawing_are_applied() {
        let bus = EventBus::new();
        let mut manager = EntityManager::new();
        let mut system = RenderSystem::new(&bus, &RenderConfig::default());

        let hidden = spawn(&mut manager, &bus, RenderLayer::Foreground, 0.0);
        let kept = spawn(&mut manager, &bus, RenderLayer::Foreground, 1.0);
        let late = manager.create_entity();
        late.add_component(RenderInformationComponent::with_z_order(RenderLayer::Foreground, 2.0));
        late.add_component(RenderComponent::new(SpriteDrawable::new("late", Vec2::new(1.0, 1.0))));
        let late = late.handle();

        let mut target = AnnouncingTarget {
            bus: bus.clone(),
            create: Some(late),
            remove: Some(hidden),
            drawn: Vec::new(),
        };
        system.render(&manager, &mut target);
        assert_eq!(target.drawn, vec![hidden, kept]);
        assert!(!system.is_indexed(hidden));
        assert_eq!(system.pending_count(), 1);

        for _ in 0..2 {
            target.drawn.clear();
            system.render(&manager, &mut target);
            assert_eq!(target.drawn, vec![kept, late]);
        }
    }

    #[test]
    fn test_removal_raised_while_sorting_is_deferred() {
        let bus = EventBus::new();
        let mut manager = EntityManager::new();
        let mut system = RenderSystem::new(&bus, &RenderConfig::default());
        let mut target = RecordingTarget::default();

        let hidden = spawn(&mut manager, &bus, RenderLayer::Gui, 0.0);
        let kept = spawn(&mut manager, &bus, RenderLayer::Gui, 1.0);

        let ordering_bus = bus.clone();
        let mut victim = Some(hidden);
        system.set_z_order_assignment_function(RenderLayer::Gui, move |_, _| {
            if let Some(handle) = victim.take() {
                ordering_bus.raise(&EntityRemovedEvent::new(handle));
            }
        });

        // The index is busy during the sort, so the removal lands next pass
        system.render(&manager, &mut target);
        assert_eq!(target.drawn, vec![hidden, kept]);

        target.drawn.clear();
        system.render(&manager, &mut target);
        assert_eq!(target.drawn, vec![kept]);
        assert!(!system.is_indexed(hidden));
    }

    #[test]
    fn test_drop_unsubscribes() {
        let bus = EventBus::new();
        let system = RenderSystem::new(&bus, &RenderConfig::default());
        assert_eq!(bus.subscriber_count::<EntityCreatedEvent>(), 1);
        assert_eq!(bus.subscriber_count::<EntityRemovedEvent>(), 1);

        drop(system);
        assert_eq!(bus.subscriber_count::<EntityCreatedEvent>(), 0);
        assert_eq!(bus.subscriber_count::<EntityRemovedEvent>(), 0);
    }

    #[test]
    fn test_views_per_layer() {
        let bus = EventBus::new();
        let mut system = RenderSystem::new(
            &bus,
            &RenderConfig {
                viewport_size: Vec2::new(100.0, 50.0),
                ..Default::default()
            },
        );

        assert_eq!(system.view(RenderLayer::Gui).size, Vec2::new(100.0, 50.0));
        system.view_mut(RenderLayer::Background).move_by(Vec2::new(10.0, 0.0));
        system.set_view(RenderLayer::Gui, View::new(Vec2::zeros(), Vec2::new(1.0, 1.0)));

        assert_eq!(system.view(RenderLayer::Background).center, Vec2::new(60.0, 25.0));
        assert_eq!(system.view(RenderLayer::Foreground).center, Vec2::new(50.0, 25.0));
        assert_eq!(system.view(RenderLayer::Gui).size, Vec2::new(1.0, 1.0));
    }
}
