use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use sociable_client::{ClientConfig, SocialApi, TokenBridge};

/// Everything handlers need besides the state store.
pub struct AppContext {
    pub api: Arc<dyn SocialApi>,
    pub bridge: Arc<TokenBridge>,
    pub feed_page_size: u32,
    pub comment_page_size: u32,
    session: Generation,
    feed: Generation,
}

impl AppContext {
    pub fn new(api: Arc<dyn SocialApi>, bridge: Arc<TokenBridge>, config: &ClientConfig) -> Self {
        Self {
            api,
            bridge,
            feed_page_size: config.feed_page_size,
            comment_page_size: config.comment_page_size,
            session: Generation::default(),
            feed: Generation::default(),
        }
    }

    /// Session generation. Login and logout advance it; a bootstrap that
    /// started under an older generation must drop its result.
    pub fn session(&self) -> &Generation {
        &self.session
    }

    /// Feed generation. A full load or a reset advances it; a page fetched
    /// under an older generation is stale.
    pub fn feed(&self) -> &Generation {
        &self.feed
    }
}

/// Monotonic counter used to detect superseded async work.
#[derive(Debug, Default)]
pub struct Generation(AtomicU64);

impl Generation {
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    /// Start a new generation and return it.
    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.current() == generation
    }
}
