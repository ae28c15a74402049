//! Typed publish/subscribe event bus
//!
//! Key principles:
//! - Subscribers register for one event type and only see that type
//! - Dispatch is synchronous, in registration order, at the moment of `raise`
//! - No queuing, no persistence, no cross-thread delivery
//! - The subscriber list is snapshotted before dispatch, so callbacks may
//!   subscribe or unsubscribe without invalidating the iteration

pub mod lifecycle;

pub use lifecycle::{EntityCreatedEvent, EntityRemovedEvent};

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

/// Marker for types that can be raised on an [`EventBus`]
pub trait Event: Any {}

/// Token identifying one registration on one bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId {
    bus: u64,
    id: u64,
}

type Callback = Rc<RefCell<dyn FnMut(&dyn Any)>>;

struct Subscriber {
    id: u64,
    callback: Callback,
}

struct SubscriberRegistry {
    bus: u64,
    next_id: u64,
    subscribers: HashMap<TypeId, Vec<Subscriber>>,
    kinds: HashMap<u64, TypeId>,
}

impl SubscriberRegistry {
    fn remove(&mut self, subscription: SubscriptionId) -> bool {
        if subscription.bus != self.bus {
            return false;
        }
        let Some(kind) = self.kinds.remove(&subscription.id) else {
            return false;
        };
        if let Some(list) = self.subscribers.get_mut(&kind) {
            list.retain(|subscriber| subscriber.id != subscription.id);
        }
        true
    }
}

static NEXT_BUS_ID: AtomicU64 = AtomicU64::new(1);

/// In-process, single-threaded event bus
///
/// Cloning yields another handle to the same bus.
#[derive(Clone)]
pub struct EventBus {
    registry: Rc<RefCell<SubscriberRegistry>>,
}

impl EventBus {
    /// Create a bus with no subscribers
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(SubscriberRegistry {
                bus: NEXT_BUS_ID.fetch_add(1, Ordering::Relaxed),
                next_id: 0,
                subscribers: HashMap::new(),
                kinds: HashMap::new(),
            })),
        }
    }

    /// Register `callback` for every later raise of `E`
    pub fn subscribe<E: Event>(&self, mut callback: impl FnMut(&E) + 'static) -> SubscriptionId {
        let callback: Callback = Rc::new(RefCell::new(move |event: &dyn Any| {
            if let Some(event) = event.downcast_ref::<E>() {
                callback(event);
            }
        }));

        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.kinds.insert(id, TypeId::of::<E>());
        registry
            .subscribers
            .entry(TypeId::of::<E>())
            .or_default()
            .push(Subscriber { id, callback });

        log::trace!("Subscribed #{} to {}", id, std::any::type_name::<E>());
        SubscriptionId { bus: registry.bus, id }
    }

    /// Like [`EventBus::subscribe`], but unsubscribes when the guard drops
    pub fn subscribe_scoped<E: Event>(&self, callback: impl FnMut(&E) + 'static) -> Subscription {
        let id = self.subscribe(callback);
        Subscription {
            registry: Rc::downgrade(&self.registry),
            id,
        }
    }

    /// Remove exactly one registration
    ///
    /// Returns `false` for tokens that were already removed or belong to
    /// another bus; neither is an error.
    pub fn unsubscribe(&self, subscription: SubscriptionId) -> bool {
        self.registry.borrow_mut().remove(subscription)
    }

    /// Whether the token still names a live registration on this bus
    pub fn is_subscribed(&self, subscription: SubscriptionId) -> bool {
        let registry = self.registry.borrow();
        registry.bus == subscription.bus && registry.kinds.contains_key(&subscription.id)
    }

    /// Number of live registrations for `E`
    pub fn subscriber_count<E: Event>(&self) -> usize {
        self.registry
            .borrow()
            .subscribers
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }

    /// Invoke every subscriber of `E` in registration order
    ///
    /// Subscribers registered during this dispatch are not invoked for it;
    /// subscribers removed during it are skipped if they have not run yet.
    /// A callback that raises an event it is itself subscribed to is not
    /// re-entered. Returns the number of callbacks invoked.
    pub fn raise<E: Event>(&self, event: &E) -> usize {
        let snapshot: Vec<(u64, Callback)> = match self.registry.borrow().subscribers.get(&TypeId::of::<E>()) {
            Some(list) => list
                .iter()
                .map(|subscriber| (subscriber.id, subscriber.callback.clone()))
                .collect(),
            None => return 0,
        };

        let payload: &dyn Any = event;
        let mut invoked = 0;
        for (id, callback) in snapshot {
            if !self.registry.borrow().kinds.contains_key(&id) {
                continue;
            }
            match callback.try_borrow_mut() {
                Ok(mut callback) => {
                    (&mut *callback)(payload);
                    invoked += 1;
                }
                Err(_) => log::warn!(
                    "Skipped re-entrant dispatch of {} to subscriber #{}",
                    std::any::type_name::<E>(),
                    id
                ),
            };
        }

        log::trace!("Raised {} to {} subscribers", std::any::type_name::<E>(), invoked);
        invoked
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.registry.borrow();
        f.debug_struct("EventBus")
            .field("bus", &registry.bus)
            .field("subscriptions", &registry.kinds.len())
            .finish()
    }
}

/// Registration guard; unsubscribes when dropped
///
/// Outliving the bus is fine, the drop is then a no-op.
#[must_use = "dropping the guard unsubscribes immediately"]
pub struct Subscription {
    registry: Weak<RefCell<SubscriberRegistry>>,
    id: SubscriptionId,
}

impl Subscription {
    /// Token of the guarded registration
    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            // A guard dropped from inside a callback must not panic on the borrow
            match registry.try_borrow_mut() {
                Ok(mut registry) => {
                    registry.remove(self.id);
                }
                Err(_) => log::warn!("Could not release subscription {:?} during dispatch", self.id),
            };
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Subscription").field(&self.id).finish()
    }
}
