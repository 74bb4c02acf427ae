//! Presentation helpers shared by front ends.

use chrono::{DateTime, Utc};
use sociable_client::{Author, ReactionType, Reactions};

/// Reaction icons shown before collapsing into "+N".
pub const MAX_REACTION_TYPES: usize = 3;
/// Reactor avatars shown before collapsing into "+N".
pub const MAX_REACTORS: usize = 5;

/// "First Last", else the email, else "Unknown User".
pub fn display_name(author: &Author) -> String {
    let full = format!("{} {}", author.first_name, author.last_name);
    let full = full.trim();
    if !full.is_empty() {
        full.to_string()
    } else if !author.email.is_empty() {
        author.email.clone()
    } else {
        "Unknown User".to_string()
    }
}

/// Upper-case initials, else the email's first letter, else "U".
pub fn initials(author: &Author) -> String {
    let letters: String = [&author.first_name, &author.last_name]
        .iter()
        .filter_map(|s| s.chars().next())
        .flat_map(char::to_uppercase)
        .collect();
    if !letters.is_empty() {
        return letters;
    }
    author
        .email
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_else(|| "U".to_string())
}

/// `Ns ago`, `Nm ago`, `Nh ago` or `Nd ago`. Future times read as `0s ago`.
pub fn relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - at).num_seconds().max(0);
    match secs {
        0..=59 => format!("{secs}s ago"),
        60..=3599 => format!("{}m ago", secs / 60),
        3600..=86399 => format!("{}h ago", secs / 3600),
        _ => format!("{}d ago", secs / 86400),
    }
}

/// Compact view of a reaction breakdown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReactionSummary {
    /// Types with a non-zero count, most used first, capped.
    pub types: Vec<(ReactionType, u64)>,
    /// Active types beyond the cap.
    pub more_types: usize,
    /// Distinct reacting user ids, capped.
    pub reactors: Vec<String>,
    /// Distinct reactors beyond the cap.
    pub more_reactors: usize,
    pub total: u64,
}

impl ReactionSummary {
    pub fn new(reactions: &Reactions) -> Self {
        let mut types = active_reactions(reactions);
        let more_types = types.len().saturating_sub(MAX_REACTION_TYPES);
        types.truncate(MAX_REACTION_TYPES);

        let mut reactors = reactor_ids(reactions);
        let more_reactors = reactors.len().saturating_sub(MAX_REACTORS);
        reactors.truncate(MAX_REACTORS);

        Self {
            types,
            more_types,
            reactors,
            more_reactors,
            total: reactions.total,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0 || self.types.is_empty()
    }
}

/// Types with a non-zero count, highest count first. Ties keep the
/// like, love, haha, care, angry order.
pub fn active_reactions(reactions: &Reactions) -> Vec<(ReactionType, u64)> {
    let mut active: Vec<_> = reactions
        .breakdown
        .iter()
        .filter(|(_, c)| c.count > 0)
        .map(|(t, c)| (t, c.count))
        .collect();
    active.sort_by(|a, b| b.1.cmp(&a.1));
    active
}

/// Every user id in the breakdown, once, in first-seen order.
pub fn reactor_ids(reactions: &Reactions) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for (_, count) in reactions.breakdown.iter() {
        for id in &count.user_ids {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
    }
    ids
}
