//=========================================================================
// Event Bus
//=========================================================================
//
// Type-safe publish/subscribe bus for inter-system communication.
//
// Architecture:
//   Systems → add_listener<E>() → HashMap<TypeId, Vec<Arc<dyn EventListener<E>>>>
//                                        ↓
//   Publisher ─→ trigger_event<E>() → snapshot → on_event() (registration order)
//                                        ↓
//   Publisher ─→ queue_event<E>()  → pending → flush_queued() at tick boundary
//
// Delivery is synchronous. A panicking listener is logged and skipped so
// the remaining listeners still receive the event.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::TypeId;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use log::{error, trace};
use parking_lot::{Mutex, RwLock};

//=== Internal Dependencies ===============================================

use super::listener_list::{same_listener, ListenerList, Listeners};

//=== Public API ==========================================================

/// Marker trait for types that can be sent through the EventBus.
///
/// Automatically implemented for all types that are Send + Sync + 'static.
/// Each distinct concrete type is an independent channel.
pub trait Event: Send + Sync + 'static {}

// Blanket implementation
impl<T: Send + Sync + 'static> Event for T {}

/// Receiver of events of type `E`.
///
/// Implemented for every `Fn(&E) + Send + Sync` closure, so most callers
/// never implement it by hand.
pub trait EventListener<E>: Send + Sync {
    /// Called once per triggered event.
    fn on_event(&self, event: &E);
}

impl<E, F> EventListener<E> for F
where
    F: Fn(&E) + Send + Sync,
{
    fn on_event(&self, event: &E) {
        self(event)
    }
}

type QueuedDelivery = Box<dyn FnOnce(&EventBus) + Send>;

//=========================================================================

/// Process-wide typed event bus.
///
/// Maintains one ordered listener list per event type. Shared between
/// systems as `Arc<EventBus>`; every operation takes `&self`.
pub struct EventBus {
    listeners: RwLock<HashMap<TypeId, Box<dyn ListenerList>>>,
    queued: Mutex<Vec<QueuedDelivery>>,
}

impl EventBus {
    /// Creates a new empty event bus.
    pub fn new() -> Self {
        EventBus {
            listeners: RwLock::new(HashMap::new()),
            queued: Mutex::new(Vec::new()),
        }
    }

    //--- Registration -----------------------------------------------------

    /// Registers a listener for events of type `E`.
    ///
    /// Registering the same listener instance twice is a no-op. Returns
    /// `true` if the listener was newly added.
    pub fn add_listener<E: Event>(&self, listener: Arc<dyn EventListener<E>>) -> bool {
        let mut map = self.listeners.write();

        let erased = map
            .entry(TypeId::of::<E>())
            .or_insert_with(|| Box::new(Listeners::<E>::new()));

        let Some(list) = erased.as_any_mut().downcast_mut::<Listeners<E>>() else {
            error!("Listener list type mismatch for {}", std::any::type_name::<E>());
            return false;
        };

        if list.iter().any(|existing| same_listener(existing, &listener)) {
            return false;
        }

        list.push(listener);
        true
    }

    /// Wraps a closure into a listener, registers it, and returns the
    /// handle needed to remove it later.
    pub fn subscribe<E, F>(&self, handler: F) -> Arc<dyn EventListener<E>>
    where
        E: Event,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let listener: Arc<dyn EventListener<E>> = Arc::new(handler);
        self.add_listener(Arc::clone(&listener));
        listener
    }

    /// Removes a listener by identity.
    ///
    /// When the last listener of a type is removed, the type entry is
    /// dropped. Returns `true` if the listener was registered.
    pub fn remove_listener<E: Event>(&self, listener: &Arc<dyn EventListener<E>>) -> bool {
        let mut map = self.listeners.write();
        let type_id = TypeId::of::<E>();

        let Some(list) = map
            .get_mut(&type_id)
            .and_then(|l| l.as_any_mut().downcast_mut::<Listeners<E>>())
        else {
            return false;
        };

        let Some(pos) = list.iter().position(|existing| same_listener(existing, listener)) else {
            return false;
        };

        list.remove(pos);

        if map.get(&type_id).is_some_and(|l| l.is_empty()) {
            map.remove(&type_id);
        }

        true
    }

    //--- Delivery ---------------------------------------------------------

    /// Delivers an event synchronously to every listener of its type, in
    /// registration order.
    ///
    /// Listeners registered or removed during delivery take effect on the
    /// next trigger.
    pub fn trigger_event<E: Event>(&self, event: E) {
        let snapshot: Listeners<E> = {
            let map = self.listeners.read();
            match map
                .get(&TypeId::of::<E>())
                .and_then(|l| l.as_any().downcast_ref::<Listeners<E>>())
            {
                Some(list) => list.clone(),
                None => return,
            }
        };

        trace!(
            "Delivering {} to {} listener(s)",
            std::any::type_name::<E>(),
            snapshot.len()
        );

        for (index, listener) in snapshot.iter().enumerate() {
            let delivery = catch_unwind(AssertUnwindSafe(|| listener.on_event(&event)));
            if delivery.is_err() {
                error!(
                    "Listener #{} for {} panicked; continuing delivery",
                    index,
                    std::any::type_name::<E>()
                );
            }
        }
    }

    /// Queues an event for delivery at the next `flush_queued()`.
    pub fn queue_event<E: Event>(&self, event: E) {
        self.queued
            .lock()
            .push(Box::new(move |bus: &EventBus| bus.trigger_event(event)));
    }

    /// Delivers all queued events in FIFO order.
    ///
    /// Events queued by listeners during the flush are delivered on the
    /// following flush. Returns the number of events delivered.
    pub fn flush_queued(&self) -> usize {
        let pending = std::mem::take(&mut *self.queued.lock());
        let count = pending.len();

        for delivery in pending {
            delivery(self);
        }

        count
    }

    //--- Query API --------------------------------------------------------

    /// Returns the number of listeners registered for `E`.
    pub fn listener_count<E: Event>(&self) -> usize {
        self.listeners
            .read()
            .get(&TypeId::of::<E>())
            .map(|l| l.len())
            .unwrap_or(0)
    }

    /// Returns true if at least one listener is registered for `E`.
    pub fn has_listeners<E: Event>(&self) -> bool {
        self.listener_count::<E>() > 0
    }

    /// Returns the number of event types with at least one listener.
    pub fn registered_types(&self) -> usize {
        self.listeners.read().len()
    }

    /// Returns the number of events waiting for `flush_queued()`.
    pub fn queued_count(&self) -> usize {
        self.queued.lock().len()
    }

    /// Drops every listener and every queued event.
    pub fn clear(&self) {
        self.listeners.write().clear();
        self.queued.lock().clear();
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Tests
//=========================================================================
