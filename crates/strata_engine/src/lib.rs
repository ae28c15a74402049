//! # Strata Engine
//!
//! Runtime core of an entity-component framework for real-time 2D applications.
//!
//! ## Features
//!
//! - **Handle-based ownership**: entities live in a generational slot map and are
//!   referenced everywhere else through copyable [`ecs::EntityHandle`]s
//! - **Deferred destruction**: destroyed entities stay resolvable until the next
//!   refresh pass, which also prunes stale group memberships
//! - **Typed event bus**: subsystems talk through lifecycle events instead of
//!   knowing each other
//! - **Layered render ordering**: per-layer buckets kept in sync purely through
//!   events, sorted by z-order or by a custom function per layer
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use strata_engine::prelude::*;
//!
//! # fn run(target: &mut dyn RenderTarget) -> Result<(), EcsError> {
//! let bus = EventBus::new();
//! let mut entities = EntityManager::new();
//! let mut render_system = RenderSystem::new(&bus, &RenderConfig::default());
//!
//! let entity = entities.create_entity();
//! entity.add_component(RenderInformationComponent::new(RenderLayer::Foreground));
//! let handle = entity.handle();
//! bus.raise(&EntityCreatedEvent::new(handle));
//!
//! entities.update(1.0 / 60.0);
//! render_system.render(&entities, target);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod ecs;
pub mod events;
pub mod render;
pub mod terrain;
pub mod input;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, EngineConfig, RenderConfig},
        ecs::{
            Component, EcsError, Entity, EntityHandle, EntityManager, HandleRegistry,
            components::{RenderComponent, RenderInformationComponent, TransformComponent},
            systems::RenderSystem,
        },
        events::{EntityCreatedEvent, EntityRemovedEvent, Event, EventBus, Subscription, SubscriptionId},
        foundation::math::{Rect, Vec2},
        render::{Drawable, RenderLayer, RenderLayerIndex, RenderTarget, View},
    };
}
