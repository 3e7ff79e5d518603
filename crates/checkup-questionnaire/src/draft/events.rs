use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Authentication signal broadcast by the API layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// Refresh failed; the session is about to be cleared.
    SessionExpired { request_path: String },
}

type Handler = Arc<dyn Fn(&AuthEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    handlers: Mutex<BTreeMap<u64, Handler>>,
}

/// Explicit publish/subscribe channel for [`AuthEvent`]s.
#[derive(Clone, Default)]
pub struct AuthEvents {
    registry: Arc<Registry>,
}

impl fmt::Debug for AuthEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthEvents")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl AuthEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` until the returned guard is dropped.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&AuthEvent) + Send + Sync + 'static,
    {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(handler));
        Subscription {
            registry: Arc::downgrade(&self.registry),
            id,
        }
    }

    /// Delivers `event` to every live subscriber and returns how many ran.
    pub fn emit(&self, event: &AuthEvent) -> usize {
        let handlers: Vec<Handler> = self
            .registry
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Keeps a handler registered; dropping it unsubscribes.
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct Subscription {
    registry: Weak<Registry>,
    id: u64,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .handlers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn dropped_subscription_stops_receiving() {
        let events = AuthEvents::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let guard = events.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let event = AuthEvent::SessionExpired {
            request_path: "/checkup-templates".into(),
        };
        assert_eq!(events.emit(&event), 1);
        drop(guard);
        assert_eq!(events.emit(&event), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
