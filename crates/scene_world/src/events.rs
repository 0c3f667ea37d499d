//! Synchronous in-process event bus.
//!
//! Every successful world mutation emits exactly one [`WorldEvent`] after
//! the state change is fully applied. Delivery is synchronous and in
//! registration order, with no queueing or batching — coalescing is the
//! subscribers' business.
//!
//! Dispatch iterates a defensive copy of the listener list, so a listener
//! may subscribe, unsubscribe, or re-enter the store while handling an
//! event. A panicking listener is isolated and logged; later listeners
//! still receive the event.

use std::cell::{Cell, RefCell};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::entity::Entity;

/// A notification of one completed world mutation.
///
/// Serializable so external bridges (UI, automation) can forward events
/// beyond the process boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum WorldEvent {
    /// An entity was created.
    EntityCreated { entity: Entity },
    /// An entity was deleted.
    EntityDeleted { entity: Entity },
    /// An entity was renamed or reparented.
    EntityUpdated { entity: Entity },
    /// The whole entity set was reset (scene load).
    EntitiesCleared,
    /// A component was attached to an entity.
    ComponentAdded { entity: Entity, component: String },
    /// An existing component's data changed.
    ComponentUpdated { entity: Entity, component: String },
    /// A component was removed from an entity.
    ComponentRemoved { entity: Entity, component: String },
}

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Rc<dyn Fn(&WorldEvent)>;

/// Synchronous publish/subscribe dispatcher.
#[derive(Default)]
pub struct EventBus {
    listeners: RefCell<Vec<(ListenerId, Listener)>>,
    next_id: Cell<u64>,
}

impl EventBus {
    /// Create a bus with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. It receives every event emitted after this call.
    pub fn subscribe(&self, listener: impl Fn(&WorldEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if the handle is unknown.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Deliver an event to every listener registered at the time of the call,
    /// in registration order.
    ///
    /// Dispatch runs over a copy of the listener list, and the borrow is
    /// released before the first callback runs, so listeners are free to
    /// mutate the bus or re-enter the store. A listener that panics is
    /// caught and logged; the remaining listeners still run.
    pub fn emit(&self, event: &WorldEvent) {
        let snapshot: Vec<(ListenerId, Listener)> = self.listeners.borrow().clone();
        for (id, listener) in snapshot {
            if catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
                error!(listener = id.0, ?event, "event listener panicked, continuing dispatch");
            }
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
