//! Flux: the client state container.
//!
//! All client state (session, feed window, comment threads, in-flight
//! reactions) lives in one path-addressed store owned by a [`Flux`]
//! instance. Views hold a handle to it and never touch fields directly:
//! they read with `get`, observe with `subscribe`, and mutate only by
//! emitting requests that registered handlers turn into state writes.
//!
//! # Primitives
//!
//! - `get(path)`: read state at a path (Arc clone, no data copy)
//! - `emit(path, payload)`: send a request, routed to matching handler(s)
//! - `subscribe(pattern)`: observe state changes under a pattern
//!
//! # Paths
//!
//! Paths use `/` as separator: `session/state`, `feed/window`,
//! `comments/{post_id}`.
//!
//! Patterns add two wildcards:
//! - `+` matches exactly one level: `comments/+`
//! - `#` matches the remainder: `feed/#`, or `#` for everything
//!
//! # Example
//!
//! ```ignore
//! use sociable_flux::Flux;
//!
//! let flux = Flux::new();
//!
//! flux.on("session/logout", |_, _, store| async move {
//!     store.set("session/state", SessionState::cleared());
//! });
//!
//! flux.subscribe("session/#", |path, _| println!("{path} changed"));
//!
//! flux.emit("session/logout", ()).await;
//! ```

pub mod app;
pub mod router;
pub mod store;
pub mod trie;
pub mod value;

pub use app::Flux;
pub use router::{BoxFuture, Router};
pub use store::{ChangeHandler, StateStore};
pub use value::{StateValue, SubscriptionId};
