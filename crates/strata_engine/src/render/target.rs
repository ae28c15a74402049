//! Boundary to the drawing surface
//!
//! The core never outputs pixels. It asks a [`RenderTarget`] whether an entity
//! is visible and hands it the entity's [`Drawable`] for every visible entity.

use crate::ecs::components::TransformComponent;
use crate::ecs::component::AsAny;
use crate::ecs::Entity;
use crate::foundation::math::Rect;

use super::View;

/// Entity-owned drawable state, stored in a
/// [`RenderComponent`](crate::ecs::components::RenderComponent)
///
/// Surfaces downcast through [`AsAny`] to the drawable kinds they know how to
/// output.
pub trait Drawable: AsAny {
    /// Bounds in local space, before the entity transform is applied
    fn local_bounds(&self) -> Rect;
}

/// Drawing surface used by the render system
pub trait RenderTarget {
    /// Culling predicate, evaluated once per indexed entity per frame
    fn is_visible(&self, entity: &Entity, view: &View) -> bool;

    /// Output one entity
    fn draw(&mut self, entity: &Entity, drawable: &dyn Drawable, view: &View);
}

/// World-space bounds of an entity's drawable, if it has one
///
/// Entities without a transform are treated as sitting at the origin.
pub fn world_bounds(entity: &Entity) -> Option<Rect> {
    let render = entity
        .get_component::<crate::ecs::components::RenderComponent>()
        .ok()?;
    let local = render.drawable().local_bounds();

    Some(match entity.get_component::<TransformComponent>() {
        Ok(transform) => transform.transform_rect(&local),
        Err(_) => local,
    })
}

/// Default culling: the drawable's world bounds overlap the view
pub fn intersects_view(entity: &Entity, view: &View) -> bool {
    world_bounds(entity).is_some_and(|bounds| bounds.intersects(&view.bounds()))
}
