//! Optimistic reaction protocol.
//!
//! A user holds at most one reaction per target. Choosing a type moves
//! between three states:
//!
//! ```text
//!   NONE ──T──▶ REACTED(T) ──T──▶ NONE
//!                  │
//!                  U (≠T)
//!                  ▼
//!              REACTED(U)
//! ```
//!
//! Only the presence of some reaction changes the total; switching type
//! keeps it. [`PendingReaction`] holds the pre-change snapshot and the
//! optimistic guess for one request, and resolves into a
//! [`ReactionOutcome`].

use sociable_client::{ReactionRequest, ReactionType, Reactions, TargetType};

/// What a reaction is attached to. Comments carry their post id so the
/// handler can find the thread holding them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactionTarget {
    Post { post_id: String },
    Comment { post_id: String, comment_id: String },
}

impl ReactionTarget {
    pub fn post(post_id: impl Into<String>) -> Self {
        Self::Post {
            post_id: post_id.into(),
        }
    }

    pub fn comment(post_id: impl Into<String>, comment_id: impl Into<String>) -> Self {
        Self::Comment {
            post_id: post_id.into(),
            comment_id: comment_id.into(),
        }
    }

    pub fn target_type(&self) -> TargetType {
        match self {
            Self::Post { .. } => TargetType::Post,
            Self::Comment { .. } => TargetType::Comment,
        }
    }

    pub fn target_id(&self) -> &str {
        match self {
            Self::Post { post_id } => post_id,
            Self::Comment { comment_id, .. } => comment_id,
        }
    }

    pub fn post_id(&self) -> &str {
        match self {
            Self::Post { post_id } | Self::Comment { post_id, .. } => post_id,
        }
    }

    /// Key in `PendingReactions`, e.g. `post:42`.
    pub fn key(&self) -> String {
        format!("{}:{}", self.target_type().as_str(), self.target_id())
    }
}

/// The request a transition maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionIntent {
    /// No reaction before: POST.
    Add(ReactionType),
    /// Another type before: PATCH.
    Replace(ReactionType),
    /// Same type chosen again: DELETE.
    Remove,
}

/// Local guess for choosing `chosen` when the state is `current`.
///
/// `me` is the signed-in user's id, used to keep the per-type user lists
/// in step with the counts.
pub fn transition(
    current: &Reactions,
    chosen: ReactionType,
    me: Option<&str>,
) -> (Reactions, ReactionIntent) {
    let mut next = current.clone();
    let intent = match current.mine {
        Some(held) if held == chosen => {
            next.breakdown.remove(held, me);
            next.total = next.total.saturating_sub(1);
            next.mine = None;
            ReactionIntent::Remove
        }
        Some(held) => {
            next.breakdown.remove(held, me);
            next.breakdown.add(chosen, me);
            next.mine = Some(chosen);
            ReactionIntent::Replace(chosen)
        }
        None => {
            next.breakdown.add(chosen, me);
            next.total += 1;
            next.mine = Some(chosen);
            ReactionIntent::Add(chosen)
        }
    };
    (next, intent)
}

/// One optimistic reaction, between the local guess and the server's
/// answer.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingReaction {
    pub target: ReactionTarget,
    pub snapshot: Reactions,
    pub guess: Reactions,
    pub intent: ReactionIntent,
}

impl PendingReaction {
    pub fn begin(
        target: ReactionTarget,
        current: &Reactions,
        chosen: ReactionType,
        me: Option<&str>,
    ) -> Self {
        let (guess, intent) = transition(current, chosen, me);
        Self {
            target,
            snapshot: current.clone(),
            guess,
            intent,
        }
    }

    /// Body for the add/replace/remove call.
    pub fn request(&self) -> ReactionRequest {
        let reaction_type = match self.intent {
            ReactionIntent::Add(t) | ReactionIntent::Replace(t) => Some(t),
            ReactionIntent::Remove => None,
        };
        ReactionRequest {
            target_type: self.target.target_type(),
            target_id: self.target.target_id().to_string(),
            reaction_type,
        }
    }

    /// The server confirmed; its breakdown replaces the guess.
    pub fn apply(self, authoritative: Reactions) -> ReactionOutcome {
        ReactionOutcome::Applied(authoritative)
    }

    /// Something failed; go back to the state before the guess.
    pub fn roll_back(self, error: impl Into<String>) -> ReactionOutcome {
        ReactionOutcome::RolledBack {
            restored: self.snapshot,
            error: error.into(),
        }
    }
}

/// How a reaction request ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ReactionOutcome {
    /// Not attempted: the target is unknown or already has a request in
    /// flight.
    Ignored,
    Applied(Reactions),
    RolledBack { restored: Reactions, error: String },
}

impl ReactionOutcome {
    /// The reactions to show after this outcome, if it changed anything.
    pub fn reactions(&self) -> Option<&Reactions> {
        match self {
            Self::Ignored => None,
            Self::Applied(r) => Some(r),
            Self::RolledBack { restored, .. } => Some(restored),
        }
    }
}
