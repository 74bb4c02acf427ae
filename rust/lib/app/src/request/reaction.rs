//! Reaction requests.

use sociable_client::ReactionType;

pub use crate::protocol::ReactionTarget;

/// Choose `reaction` on `target`. Choosing the current reaction removes it.
#[derive(Debug, Clone)]
pub struct ReactReq {
    pub target: ReactionTarget,
    pub reaction: ReactionType,
}

requests! {
    ReactReq => "reaction/set",
}
