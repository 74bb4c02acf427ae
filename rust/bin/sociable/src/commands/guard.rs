//! `sociable guard`: show what the route guard decides for a path.

use anyhow::Result;
use sociable_app::guard::{evaluate, GuardDecision, GuardPolicy};
use sociable_client::TokenBridge;

pub fn check(bridge: &TokenBridge, path: &str, strict: bool) -> Result<()> {
    let policy = if strict {
        GuardPolicy::strict()
    } else {
        GuardPolicy::default()
    };
    let has_cookie = bridge.has_cookie();
    match evaluate(path, has_cookie, &policy) {
        GuardDecision::Allow => println!("{path}: allow (cookie: {})", yes_no(has_cookie)),
        GuardDecision::Redirect(to) => {
            println!("{path}: redirect to {to} (cookie: {})", yes_no(has_cookie))
        }
    }
    Ok(())
}

fn yes_no(b: bool) -> &'static str {
    if b {
        "present"
    } else {
        "missing"
    }
}
