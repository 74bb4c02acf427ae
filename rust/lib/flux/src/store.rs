use std::any::Any;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::trace;

use crate::trie::Trie;
use crate::value::{StateValue, SubscriptionId};

/// Callback invoked after a path changes.
pub type ChangeHandler = Arc<dyn Fn(&str, &StateValue) + Send + Sync>;

/// Path-keyed state with pattern subscriptions.
///
/// Writers either replace a value (`set`) or transform it in place under
/// the write lock (`update`). Subscribers run after the lock is released,
/// so a handler may read the store freely.
pub struct StateStore {
    values: RwLock<BTreeMap<String, StateValue>>,
    handlers: Trie<Subscriber>,
    next_id: AtomicU64,
}

#[derive(Clone)]
struct Subscriber {
    id: SubscriptionId,
    handler: ChangeHandler,
}

impl StateStore {
    pub fn new() -> Self {
        Self {
            values: RwLock::new(BTreeMap::new()),
            handlers: Trie::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Replace the value at `path` and notify subscribers.
    pub fn set<T: Any + Send + Sync>(&self, path: &str, value: T) {
        self.set_value(path, StateValue::new(value));
    }

    pub fn set_value(&self, path: &str, value: StateValue) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_string(), value.clone());
        self.notify(path, &value);
    }

    pub fn get(&self, path: &str) -> Option<StateValue> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }

    /// Owned copy of the value at `path`, if present and of type `T`.
    pub fn get_as<T: Any + Clone>(&self, path: &str) -> Option<T> {
        self.get(path).and_then(|v| v.cloned::<T>())
    }

    /// Read-modify-write of the `T` at `path` as one atomic step.
    ///
    /// A missing value (or one of another type) starts from `T::default()`.
    /// The closure runs under the write lock; concurrent `update` calls on
    /// any path are serialized. Subscribers are notified once afterwards.
    pub fn update<T, R, F>(&self, path: &str, f: F) -> R
    where
        T: Any + Clone + Default + Send + Sync,
        F: FnOnce(&mut T) -> R,
    {
        let (out, value) = {
            let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
            let mut current: T = values
                .get(path)
                .and_then(|v| v.cloned::<T>())
                .unwrap_or_default();
            let out = f(&mut current);
            let value = StateValue::new(current);
            values.insert(path.to_string(), value.clone());
            (out, value)
        };
        self.notify(path, &value);
        out
    }

    /// Remove the value at `path`. Subscribers are not notified.
    pub fn remove(&self, path: &str) -> Option<StateValue> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path)
    }

    /// Entries strictly below `prefix`, ordered by path.
    pub fn scan(&self, prefix: &str) -> Vec<(String, StateValue)> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        let below = format!("{prefix}/");
        values
            .range(below.clone()..)
            .take_while(|(k, _)| k.starts_with(&below))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register `handler` for every change whose path matches `pattern`.
    pub fn subscribe<F>(&self, pattern: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&str, &StateValue) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.insert(
            pattern,
            Subscriber {
                id,
                handler: Arc::new(handler),
            },
        );
        id
    }

    pub fn unsubscribe(&self, pattern: &str, id: SubscriptionId) {
        self.handlers.remove(pattern, |s| s.id == id);
    }

    /// All entries, ordered by path.
    pub fn snapshot(&self) -> Vec<(String, StateValue)> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn notify(&self, path: &str, value: &StateValue) {
        let subscribers = self.handlers.match_topic(path);
        trace!(path, subscribers = subscribers.len(), "state changed");
        for s in subscribers {
            (s.handler)(path, value);
        }
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Window {
        posts: Vec<String>,
        is_loading: bool,
    }

    // ========================================================================
    // set / get
    // ========================================================================

    #[test]
    fn set_then_get_typed() {
        let store = StateStore::new();
        store.set(
            "feed/window",
            Window {
                posts: vec!["p1".into()],
                is_loading: false,
            },
        );
        let w = store.get_as::<Window>("feed/window").unwrap();
        assert_eq!(w.posts, vec!["p1".to_string()]);
    }

    #[test]
    fn get_missing_is_none() {
        let store = StateStore::new();
        assert!(store.get("feed/window").is_none());
        assert!(store.get_as::<Window>("feed/window").is_none());
    }

    #[test]
    fn get_as_wrong_type_is_none() {
        let store = StateStore::new();
        store.set("feed/window", 3u8);
        assert!(store.get_as::<Window>("feed/window").is_none());
    }

    #[test]
    fn set_replaces() {
        let store = StateStore::new();
        store.set("app/route", "/feed".to_string());
        store.set("app/route", "/auth/login".to_string());
        assert_eq!(
            store.get_as::<String>("app/route").as_deref(),
            Some("/auth/login")
        );
    }

    // ========================================================================
    // update
    // ========================================================================

    #[test]
    fn update_starts_from_default() {
        let store = StateStore::new();
        let was_loading = store.update("feed/window", |w: &mut Window| {
            let prev = w.is_loading;
            w.is_loading = true;
            prev
        });
        assert!(!was_loading);
        assert!(store.get_as::<Window>("feed/window").unwrap().is_loading);
    }

    #[test]
    fn update_sees_previous_value() {
        let store = StateStore::new();
        store.update("feed/window", |w: &mut Window| w.posts.push("a".into()));
        store.update("feed/window", |w: &mut Window| w.posts.push("b".into()));
        let w = store.get_as::<Window>("feed/window").unwrap();
        assert_eq!(w.posts, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn update_notifies_once() {
        let store = StateStore::new();
        let seen = Arc::new(AtomicU64::new(0));
        let s = seen.clone();
        store.subscribe("feed/window", move |_, _| {
            s.fetch_add(1, Ordering::Relaxed);
        });
        store.update("feed/window", |w: &mut Window| w.is_loading = true);
        assert_eq!(seen.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn concurrent_updates_do_not_lose_writes() {
        use std::thread;

        let store = Arc::new(StateStore::new());
        let mut handles = vec![];
        for _ in 0..4 {
            let store = store.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..250 {
                    store.update("counter", |n: &mut u32| *n += 1);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.get_as::<u32>("counter"), Some(1000));
    }

    #[test]
    fn update_is_test_and_set() {
        let store = StateStore::new();
        let claim = |store: &StateStore| {
            store.update("feed/window", |w: &mut Window| {
                if w.is_loading {
                    false
                } else {
                    w.is_loading = true;
                    true
                }
            })
        };
        assert!(claim(&store));
        assert!(!claim(&store));
    }

    // ========================================================================
    // remove / scan / len
    // ========================================================================

    #[test]
    fn remove_returns_old_value() {
        let store = StateStore::new();
        store.set("comments/p1", 1u32);
        let old = store.remove("comments/p1").unwrap();
        assert_eq!(old.downcast_ref::<u32>(), Some(&1));
        assert!(!store.contains("comments/p1"));
    }

    #[test]
    fn scan_lists_children_only() {
        let store = StateStore::new();
        store.set("comments", 0u32);
        store.set("comments/p2", 2u32);
        store.set("comments/p1", 1u32);
        store.set("commentsx/p3", 3u32);
        let keys: Vec<String> = store.scan("comments").into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["comments/p1", "comments/p2"]);
    }

    #[test]
    fn len_and_snapshot() {
        let store = StateStore::new();
        assert!(store.is_empty());
        store.set("b", 2u32);
        store.set("a", 1u32);
        assert_eq!(store.len(), 2);
        let keys: Vec<String> = store.snapshot().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    // ========================================================================
    // subscribe / unsubscribe
    // ========================================================================

    #[test]
    fn wildcard_subscription_sees_matching_paths() {
        let store = StateStore::new();
        let paths = Arc::new(Mutex::new(Vec::<String>::new()));
        let p = paths.clone();
        store.subscribe("comments/+", move |path, _| {
            p.lock().unwrap().push(path.to_string());
        });

        store.set("comments/p1", 1u32);
        store.set("comments/p2", 2u32);
        store.set("feed/window", 3u32);

        assert_eq!(*paths.lock().unwrap(), vec!["comments/p1", "comments/p2"]);
    }

    #[test]
    fn subscriber_can_read_store() {
        let store = Arc::new(StateStore::new());
        let inner = store.clone();
        let seen = Arc::new(Mutex::new(None::<u32>));
        let s = seen.clone();
        store.subscribe("counter", move |path, _| {
            *s.lock().unwrap() = inner.get_as::<u32>(path);
        });
        store.update("counter", |n: &mut u32| *n = 5);
        assert_eq!(*seen.lock().unwrap(), Some(5));
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let store = StateStore::new();
        let count = Arc::new(AtomicU64::new(0));
        let c = count.clone();
        let id = store.subscribe("session/#", move |_, _| {
            c.fetch_add(1, Ordering::Relaxed);
        });
        store.set("session/state", 1u32);
        store.unsubscribe("session/#", id);
        store.set("session/state", 2u32);
        assert_eq!(count.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn remove_does_not_notify() {
        let store = StateStore::new();
        let count = Arc::new(AtomicU64::new(0));
        let c = count.clone();
        store.set("feed/window", 1u32);
        store.subscribe("#", move |_, _| {
            c.fetch_add(1, Ordering::Relaxed);
        });
        store.remove("feed/window");
        assert_eq!(count.load(Ordering::Relaxed), 0);
    }
}
