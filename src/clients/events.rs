//! Request lifecycle events for observability.
//!
//! Every request emits exactly one [`ClientEvent::RequestStart`] before
//! dispatch and exactly one terminal event (`RequestComplete` or
//! `RequestError`) after it settles, sharing the same `request_id`.
//! Handlers are a monitoring side channel only: they run synchronously and
//! cannot alter control flow.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::clients::errors::ErrorCategory;
use crate::clients::http_request::HttpMethod;

/// The kind of a [`ClientEvent`], used for handler registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A request is about to be dispatched.
    RequestStart,
    /// A request settled with a 2xx response.
    RequestComplete,
    /// A request settled with a classified error.
    RequestError,
}

/// A request lifecycle event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientEvent {
    /// Emitted before dispatch.
    RequestStart {
        /// The endpoint being requested.
        endpoint: String,
        /// The HTTP method.
        method: HttpMethod,
        /// The correlation ID shared with the terminal event.
        request_id: String,
    },
    /// Emitted after a successful response.
    RequestComplete {
        /// The HTTP status code.
        status: u16,
        /// Wall-clock time from dispatch to settle.
        duration: Duration,
        /// The correlation ID shared with the start event.
        request_id: String,
    },
    /// Emitted after a classified failure.
    RequestError {
        /// The classified category.
        category: ErrorCategory,
        /// The HTTP status; 0 for transport failures.
        status: u16,
        /// The human-readable error message.
        message: String,
        /// The endpoint that failed.
        endpoint: String,
        /// The HTTP method.
        method: HttpMethod,
    },
}

impl ClientEvent {
    /// Returns the kind of this event.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::RequestStart { .. } => EventKind::RequestStart,
            Self::RequestComplete { .. } => EventKind::RequestComplete,
            Self::RequestError { .. } => EventKind::RequestError,
        }
    }
}

type Handler = Box<dyn Fn(&ClientEvent) + Send + Sync>;

/// A per-client publish/subscribe sink for [`ClientEvent`]s.
///
/// One bus per [`HttpClient`](crate::clients::HttpClient); no process-wide
/// state. Handlers registered for a kind fire in registration order.
///
/// # Example
///
/// ```rust
/// use pco_api::clients::{ClientEvent, EventBus, EventKind, HttpMethod};
///
/// let bus = EventBus::new();
/// bus.on(EventKind::RequestStart, |event| {
///     if let ClientEvent::RequestStart { endpoint, .. } = event {
///         println!("starting {endpoint}");
///     }
/// });
///
/// bus.emit(&ClientEvent::RequestStart {
///     endpoint: "/people/v2/people".to_string(),
///     method: HttpMethod::Get,
///     request_id: "abc".to_string(),
/// });
/// ```
#[derive(Default)]
pub struct EventBus {
    handlers: Mutex<HashMap<EventKind, Vec<Handler>>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: Vec<(EventKind, usize)> = self
            .handlers
            .lock()
            .map(|map| map.iter().map(|(kind, v)| (*kind, v.len())).collect())
            .unwrap_or_default();
        f.debug_struct("EventBus").field("handlers", &counts).finish()
    }
}

impl EventBus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for the given event kind.
    pub fn on<F>(&self, kind: EventKind, handler: F)
    where
        F: Fn(&ClientEvent) + Send + Sync + 'static,
    {
        if let Ok(mut handlers) = self.handlers.lock() {
            handlers.entry(kind).or_default().push(Box::new(handler));
        }
    }

    /// Emits an event to every handler registered for its kind.
    pub fn emit(&self, event: &ClientEvent) {
        if let Ok(handlers) = self.handlers.lock() {
            if let Some(registered) = handlers.get(&event.kind()) {
                for handler in registered {
                    handler(event);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn start_event(id: &str) -> ClientEvent {
        ClientEvent::RequestStart {
            endpoint: "/people/v2/people".to_string(),
            method: HttpMethod::Get,
            request_id: id.to_string(),
        }
    }

    #[test]
    fn test_handler_receives_matching_kind_only() {
        let bus = EventBus::new();
        let starts = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&starts);
        bus.on(EventKind::RequestStart, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit(&start_event("a"));
        bus.emit(&ClientEvent::RequestComplete {
            status: 200,
            duration: Duration::from_millis(1),
            request_id: "a".to_string(),
        });

        assert_eq!(starts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_multiple_handlers_fire_in_registration_order() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second"] {
            let order = Arc::clone(&order);
            bus.on(EventKind::RequestStart, move |_| {
                order.lock().unwrap().push(tag);
            });
        }

        bus.emit(&start_event("a"));
        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_emit_without_handlers_is_noop() {
        let bus = EventBus::new();
        bus.emit(&start_event("a"));
    }

    #[test]
    fn test_event_kind_mapping() {
        assert_eq!(start_event("a").kind(), EventKind::RequestStart);
        assert_eq!(
            ClientEvent::RequestError {
                category: ErrorCategory::Network,
                status: 0,
                message: "boom".to_string(),
                endpoint: "/x".to_string(),
                method: HttpMethod::Get,
            }
            .kind(),
            EventKind::RequestError
        );
    }

    #[test]
    fn test_bus_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EventBus>();
    }
}
