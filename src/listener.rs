//! Change listener registry
//!
//! Holds the ordered set of callbacks to notify when the cached document
//! changes. Listeners are identity-compared for removal (the same `Arc`
//! handle removes the registration it made) and duplicates are allowed:
//! registering a listener twice means it fires twice.
//!
//! Notification iterates over a snapshot of the registry, so a listener
//! that removes itself (or others) during a dispatch pass does not perturb
//! that pass; the removal takes effect from the next notification on.

use std::sync::Arc;

use serde_json::Value;

/// Callback invoked with the new document value after a confirmed change
pub type UpdateListener = Arc<dyn Fn(Arc<Value>) + Send + Sync>;

/// Wraps a closure as an [`UpdateListener`] handle
///
/// The returned `Arc` is the listener's identity: keep a clone of it to
/// remove the registration later.
pub fn listener<F>(f: F) -> UpdateListener
where
    F: Fn(Arc<Value>) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Ordered collection of change listeners
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Vec<UpdateListener>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends listeners in call order; duplicates are allowed
    pub fn add(&mut self, listeners: impl IntoIterator<Item = UpdateListener>) {
        self.listeners.extend(listeners);
    }

    /// Removes every registration whose identity matches one of the given
    /// handles; unmatched handles are ignored
    pub fn remove<'a>(&mut self, listeners: impl IntoIterator<Item = &'a UpdateListener>) {
        for target in listeners {
            self.listeners.retain(|l| !Arc::ptr_eq(l, target));
        }
    }

    /// Removes all listeners
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Copies the current registrations for one dispatch pass
    pub fn snapshot(&self) -> Vec<UpdateListener> {
        self.listeners.clone()
    }

    /// Invokes every currently registered listener synchronously, in
    /// registration order, with the given value
    pub fn notify(&self, value: &Arc<Value>) {
        for l in self.snapshot() {
            l(value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// Listener that appends a tag to a shared log on every call
    fn logging_listener(log: Arc<Mutex<Vec<&'static str>>>, tag: &'static str) -> UpdateListener {
        listener(move |_| log.lock().unwrap().push(tag))
    }

    #[test]
    fn test_notify_fires_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ListenerRegistry::new();
        registry.add([
            logging_listener(log.clone(), "first"),
            logging_listener(log.clone(), "second"),
            logging_listener(log.clone(), "third"),
        ]);

        registry.notify(&Arc::new(json!(1)));

        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_duplicate_registration_fires_twice() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ListenerRegistry::new();
        let l = logging_listener(log.clone(), "dup");
        registry.add([l.clone(), l]);

        registry.notify(&Arc::new(json!(1)));

        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_remove_matches_by_identity_only() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ListenerRegistry::new();
        let keep = logging_listener(log.clone(), "keep");
        let gone = logging_listener(log.clone(), "gone");
        registry.add([keep.clone(), gone.clone()]);

        registry.remove([&gone]);
        registry.notify(&Arc::new(json!(1)));

        assert_eq!(*log.lock().unwrap(), vec!["keep"]);
    }

    #[test]
    fn test_remove_clears_every_duplicate_of_a_handle() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ListenerRegistry::new();
        let l = logging_listener(log.clone(), "dup");
        registry.add([l.clone(), l.clone()]);

        registry.remove([&l]);

        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_unmatched_handle_is_a_noop() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ListenerRegistry::new();
        registry.add([logging_listener(log.clone(), "kept")]);

        let never_registered = logging_listener(log.clone(), "other");
        registry.remove([&never_registered]);

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_clear_removes_everything() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ListenerRegistry::new();
        registry.add([
            logging_listener(log.clone(), "a"),
            logging_listener(log.clone(), "b"),
        ]);

        registry.clear();
        registry.notify(&Arc::new(json!(1)));

        assert!(registry.is_empty());
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_listener_receives_the_notified_value() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let mut registry = ListenerRegistry::new();
        registry.add([listener(move |v: Arc<Value>| {
            seen_clone.lock().unwrap().push((*v).clone())
        })]);

        registry.notify(&Arc::new(json!({"x": 2})));

        assert_eq!(*seen.lock().unwrap(), vec![json!({"x": 2})]);
    }
}
