//! Request definitions.
//!
//! A request is a typed payload sent through `Flux::emit` to the path named
//! by its [`Request::PATH`]. Views construct requests; handlers consume
//! them and write state.

use std::any::Any;
use std::fmt::Debug;

/// A payload routed by path.
pub trait Request: Any + Clone + Debug + Send + Sync {
    const PATH: &'static str;
}

macro_rules! requests {
    ($($ty:ty => $path:literal),* $(,)?) => {
        $(
            impl $crate::request::Request for $ty {
                const PATH: &'static str = $path;
            }
        )*
    };
}

pub mod comment;
pub mod feed;
pub mod post;
pub mod reaction;
pub mod session;

pub use comment::*;
pub use feed::*;
pub use post::*;
pub use reaction::*;
pub use session::*;
