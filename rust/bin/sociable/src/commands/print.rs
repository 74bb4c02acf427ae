//! Terminal rendering of posts, comments, and users.

use chrono::Utc;
use sociable_app::view::{display_name, relative_time, ReactionSummary};
use sociable_client::{Author, Comment, Post, Reactions, User, Visibility};

pub fn user_line(user: &User) -> String {
    let name = display_name(&Author::from(user));
    if user.email.is_empty() || name == user.email {
        name
    } else {
        format!("{name} <{}>", user.email)
    }
}

fn reactions_line(reactions: &Reactions) -> String {
    let summary = ReactionSummary::new(reactions);
    if summary.is_empty() {
        return "no reactions".to_string();
    }
    let mut parts: Vec<String> = summary
        .types
        .iter()
        .map(|(t, n)| format!("{t} {n}"))
        .collect();
    if summary.more_types > 0 {
        parts.push(format!("+{}", summary.more_types));
    }
    let mine = reactions
        .mine
        .map(|t| format!(", you: {t}"))
        .unwrap_or_default();
    format!("{} ({} total{mine})", parts.join(" · "), summary.total)
}

pub fn post(post: &Post) {
    let visibility = match post.visibility {
        Visibility::Public => "",
        Visibility::Private => " [private]",
    };
    println!(
        "{}  {}  {}{}",
        post.id,
        display_name(&post.author),
        relative_time(post.created_at, Utc::now()),
        visibility
    );
    if !post.content.is_empty() {
        for line in post.content.lines() {
            println!("    {line}");
        }
    }
    if let Some(image) = &post.image {
        println!("    [image] {}", image.url);
    }
    println!(
        "    {} · {} comment(s)",
        reactions_line(&post.reactions),
        post.comment_count
    );
}

pub fn comment(comment: &Comment, indent: usize) {
    let pad = " ".repeat(indent);
    println!(
        "{pad}{}  {}  {}",
        comment.id,
        display_name(&comment.author),
        relative_time(comment.created_at, Utc::now())
    );
    println!("{pad}    {}", comment.content);
    let replies = if comment.reply_count > 0 {
        format!(" · {} repl(ies)", comment.reply_count)
    } else {
        String::new()
    };
    println!("{pad}    {}{replies}", reactions_line(&comment.reactions));
}
