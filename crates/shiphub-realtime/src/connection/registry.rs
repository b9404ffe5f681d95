//! Listener registry: event name to handler identities.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;

/// Callback invoked for every inbound frame of a subscribed event.
pub trait EventHandler: Send + Sync + 'static {
    /// Handles one event payload.
    fn handle(&self, data: &Value);
}

impl<F> EventHandler for F
where
    F: Fn(&Value) + Send + Sync + 'static,
{
    fn handle(&self, data: &Value) {
        self(data)
    }
}

/// Shared handler handle. Identity is the allocation, so clones of the same
/// `Arc` are the same listener.
pub type EventHandlerRef = Arc<dyn EventHandler>;

fn same_handler(a: &EventHandlerRef, b: &EventHandlerRef) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// A fixed group of handlers attached and detached as a unit.
///
/// Every holder asking the registry for the same key gets the same set, so
/// the handlers keep one identity no matter how many consumers attach them.
/// The set stays registered while at least one holder is attached.
pub struct HandlerSet {
    handlers: Vec<(&'static str, EventHandlerRef)>,
    holders: Mutex<usize>,
}

impl HandlerSet {
    /// Registers the handlers for the first holder; later holders only
    /// count.
    pub fn attach(&self, registry: &ListenerRegistry) {
        let mut holders = self.holders.lock();
        if *holders == 0 {
            for (event, handler) in &self.handlers {
                registry.add(event, handler.clone());
            }
        }
        *holders += 1;
    }

    /// Releases one holder; the last one removes the handlers. A detach
    /// without a matching attach is ignored.
    pub fn detach(&self, registry: &ListenerRegistry) {
        let mut holders = self.holders.lock();
        match *holders {
            0 => {}
            1 => {
                for (event, handler) in &self.handlers {
                    registry.remove(event, handler);
                }
                *holders = 0;
            }
            _ => *holders -= 1,
        }
    }

    /// Number of attached holders.
    pub fn holders(&self) -> usize {
        *self.holders.lock()
    }

    /// Events covered by the set.
    pub fn events(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.iter().map(|(event, _)| *event)
    }
}

impl fmt::Debug for HandlerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerSet")
            .field("events", &self.events().collect::<Vec<_>>())
            .field("holders", &self.holders())
            .finish()
    }
}

/// Registry of listeners per event name.
///
/// Adding a handler already registered for an event is a no-op; removing a
/// handler that is not registered is a no-op.
#[derive(Default)]
pub struct ListenerRegistry {
    /// Event name → handlers, in registration order.
    listeners: DashMap<String, Vec<EventHandlerRef>>,
    /// Shared handler sets by key.
    sets: DashMap<String, Arc<HandlerSet>>,
}

impl ListenerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `event`. Returns `false` if it was already
    /// registered.
    pub fn add(&self, event: &str, handler: EventHandlerRef) -> bool {
        let mut entry = self.listeners.entry(event.to_string()).or_default();
        if entry.iter().any(|h| same_handler(h, &handler)) {
            return false;
        }
        entry.push(handler);
        true
    }

    /// Removes `handler` from `event`. Returns `false` if it was not
    /// registered.
    pub fn remove(&self, event: &str, handler: &EventHandlerRef) -> bool {
        let Some(mut entry) = self.listeners.get_mut(event) else {
            return false;
        };

        let before = entry.len();
        entry.retain(|h| !same_handler(h, handler));
        let removed = entry.len() < before;

        if entry.is_empty() {
            drop(entry);
            self.listeners.remove_if(event, |_, handlers| handlers.is_empty());
        }
        removed
    }

    /// Whether `handler` is registered for `event`.
    pub fn contains(&self, event: &str, handler: &EventHandlerRef) -> bool {
        self.listeners
            .get(event)
            .is_some_and(|handlers| handlers.iter().any(|h| same_handler(h, handler)))
    }

    /// Snapshot of the handlers for `event`.
    pub fn handlers(&self, event: &str) -> Vec<EventHandlerRef> {
        self.listeners
            .get(event)
            .map(|handlers| handlers.clone())
            .unwrap_or_default()
    }

    /// Invokes every handler of `event` with `data`. Returns how many ran.
    ///
    /// Handlers run on a snapshot, so a handler may subscribe or unsubscribe
    /// without deadlocking the registry.
    pub fn dispatch(&self, event: &str, data: &Value) -> usize {
        let handlers = self.handlers(event);
        for handler in &handlers {
            handler.handle(data);
        }
        handlers.len()
    }

    /// The handler set for `key`, built by `build` on first request.
    pub fn handler_set(
        &self,
        key: &str,
        build: impl FnOnce() -> Vec<(&'static str, EventHandlerRef)>,
    ) -> Arc<HandlerSet> {
        self.sets
            .entry(key.to_string())
            .or_insert_with(|| {
                Arc::new(HandlerSet {
                    handlers: build(),
                    holders: Mutex::new(0),
                })
            })
            .clone()
    }

    /// Number of handlers registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.get(event).map(|h| h.len()).unwrap_or(0)
    }

    /// Number of events with at least one handler.
    pub fn event_count(&self) -> usize {
        self.listeners.len()
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for entry in self.listeners.iter() {
            map.entry(entry.key(), &entry.value().len());
        }
        map.entry(&"handler_sets", &self.sets.len());
        map.finish()
    }
}
