//! Sociable client core.
//!
//! Structure:
//! - `state/`: typed state stored at well-known Flux paths
//! - `request/`: typed request payloads, one `PATH` each
//! - `handlers/`: request handlers and their Flux wiring
//! - `protocol`: the optimistic reaction state machine
//! - `guard`: cookie-based route guard (pure check + axum middleware)
//! - `view`: presentation derivations used by front ends
//!
//! A front end owns one [`Flux`](sociable_flux::Flux), registers the
//! handlers with an [`AppContext`], and from then on only emits requests
//! and reads state:
//!
//! ```ignore
//! let flux = Flux::new();
//! register_handlers(&flux, Arc::new(AppContext::new(api, bridge, &config)));
//! dispatch(&flux, MountSurfaceReq { surface: Surface::Feed }).await;
//! dispatch(&flux, LoadFeedReq).await;
//! let window = flux.get_as::<FeedWindow>(FeedWindow::PATH);
//! ```

pub mod context;
pub mod guard;
pub mod handlers;
pub mod protocol;
pub mod request;
pub mod state;
pub mod validate;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use context::AppContext;
pub use handlers::{dispatch, register_handlers};
