use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::store::StateStore;
use crate::trie::Trie;

/// Boxed future returned by request handlers.
pub type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Handler after type erasure. Arguments are owned so the future is `'static`:
/// the request path, the payload, and the store.
type ErasedHandler =
    Arc<dyn Fn(String, Arc<dyn Any + Send + Sync>, Arc<StateStore>) -> BoxFuture + Send + Sync>;

/// Maps request path patterns to async handlers.
///
/// Several handlers may match one path; `dispatch` runs them in match
/// order, one after another. A path nobody handles is silently dropped.
pub struct Router {
    trie: Trie<ErasedHandler>,
}

impl Router {
    pub fn new() -> Self {
        Self { trie: Trie::new() }
    }

    pub fn on<F, Fut>(&self, pattern: &str, handler: F)
    where
        F: Fn(String, Arc<dyn Any + Send + Sync>, Arc<StateStore>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let erased: ErasedHandler = Arc::new(move |path, payload, store| -> BoxFuture {
            Box::pin(handler(path, payload, store))
        });
        self.trie.insert(pattern, erased);
    }

    pub async fn dispatch(
        &self,
        path: &str,
        payload: Arc<dyn Any + Send + Sync>,
        store: Arc<StateStore>,
    ) {
        let handlers = self.trie.match_topic(path);
        if handlers.is_empty() {
            tracing::debug!(path, "no handler for request");
        }
        for handler in handlers {
            handler(path.to_string(), Arc::clone(&payload), Arc::clone(&store)).await;
        }
    }

    /// True if a handler was registered under exactly `pattern`.
    pub fn has_handler(&self, pattern: &str) -> bool {
        self.trie.has_pattern(pattern)
    }

    /// True if some handler would receive a request sent to `path`.
    pub fn matches(&self, path: &str) -> bool {
        !self.trie.match_topic(path).is_empty()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    #[tokio::test]
    async fn dispatch_reaches_exact_handler() {
        let router = Router::new();
        let hits = Arc::new(AtomicU64::new(0));
        let h = hits.clone();
        router.on("feed/load", move |_, _, _| {
            let h = h.clone();
            async move {
                h.fetch_add(1, Ordering::Relaxed);
            }
        });

        router
            .dispatch("feed/load", Arc::new(()), Arc::new(StateStore::new()))
            .await;
        assert_eq!(hits.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn unmatched_path_is_noop() {
        let router = Router::new();
        router
            .dispatch("feed/load", Arc::new(()), Arc::new(StateStore::new()))
            .await;
        assert!(!router.matches("feed/load"));
    }

    #[tokio::test]
    async fn handlers_run_in_order() {
        let router = Router::new();
        let order = Arc::new(Mutex::new(Vec::<&'static str>::new()));

        let o = order.clone();
        router.on("session/logout", move |_, _, _| {
            let o = o.clone();
            async move { o.lock().unwrap().push("exact") }
        });
        let o = order.clone();
        router.on("session/#", move |_, _, _| {
            let o = o.clone();
            async move { o.lock().unwrap().push("audit") }
        });

        router
            .dispatch("session/logout", Arc::new(()), Arc::new(StateStore::new()))
            .await;
        assert_eq!(*order.lock().unwrap(), vec!["exact", "audit"]);
    }

    #[tokio::test]
    async fn handler_receives_payload_and_path() {
        #[derive(Debug)]
        struct LoadComments {
            post_id: String,
        }

        let router = Router::new();
        router.on("comments/load", |path, payload, store: Arc<StateStore>| async move {
            let req = payload.downcast_ref::<LoadComments>().unwrap();
            store.set(&format!("comments/{}", req.post_id), path);
        });

        let store = Arc::new(StateStore::new());
        router
            .dispatch(
                "comments/load",
                Arc::new(LoadComments {
                    post_id: "p1".into(),
                }),
                store.clone(),
            )
            .await;
        assert_eq!(
            store.get_as::<String>("comments/p1").as_deref(),
            Some("comments/load")
        );
    }

    #[test]
    fn has_handler_and_matches() {
        let router = Router::new();
        router.on("reaction/+", |_, _, _| async {});
        assert!(router.has_handler("reaction/+"));
        assert!(!router.has_handler("reaction/set"));
        assert!(router.matches("reaction/set"));
        assert!(!router.matches("reaction/set/extra"));
    }
}
