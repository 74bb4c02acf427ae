//! Feed handlers: first page, continuation pages, reset.

use sociable_flux::StateStore;
use tracing::{debug, info, warn};

use super::Claim;
use crate::context::AppContext;
use crate::request::LoadMoreReq;
use crate::state::FeedWindow;

/// Handle `feed/load`: fetch the first page and replace the window.
///
/// Always runs; any page still in flight becomes stale.
pub async fn handle_load(store: &StateStore, ctx: &AppContext) {
    let generation = ctx.feed().advance();
    store.update(FeedWindow::PATH, |w: &mut FeedWindow| {
        w.is_loading = true;
        w.error = None;
    });
    let claim = loading_claim(store, ctx, generation);

    let result = ctx.api.feed(None, ctx.feed_page_size).await;
    if !ctx.feed().is_current(generation) {
        debug!("dropping superseded first page");
        return;
    }
    claim.settle();
    match result {
        Ok(page) => {
            info!(posts = page.posts.len(), has_more = page.has_more, "feed loaded");
            store.update(FeedWindow::PATH, |w: &mut FeedWindow| w.replace_page(page));
        }
        Err(e) => {
            warn!(error = %e, "feed load failed");
            store.update(FeedWindow::PATH, |w: &mut FeedWindow| w.fail(e.to_string()));
        }
    }
}

/// Handle `feed/more`: append the page after `req.cursor`.
///
/// A missing cursor or a load already in flight makes this a no-op.
pub async fn handle_load_more(req: &LoadMoreReq, store: &StateStore, ctx: &AppContext) {
    let Some(cursor) = req.cursor.as_deref() else {
        debug!("no cursor, nothing more to load");
        return;
    };
    let generation = ctx.feed().current();
    let claimed = store.update(FeedWindow::PATH, |w: &mut FeedWindow| {
        if w.is_loading {
            return false;
        }
        w.is_loading = true;
        w.error = None;
        true
    });
    if !claimed {
        debug!(cursor, "feed load already in flight");
        return;
    }
    let claim = loading_claim(store, ctx, generation);

    let result = ctx.api.feed(Some(cursor), ctx.feed_page_size).await;
    if !ctx.feed().is_current(generation) {
        debug!(cursor, "dropping page fetched before a reset");
        return;
    }
    claim.settle();
    match result {
        Ok(page) => {
            let has_more = page.has_more;
            let added = store.update(FeedWindow::PATH, |w: &mut FeedWindow| w.append_page(page));
            info!(cursor, added, has_more, "feed page appended");
        }
        Err(e) => {
            warn!(cursor, error = %e, "feed page failed");
            store.update(FeedWindow::PATH, |w: &mut FeedWindow| w.fail(e.to_string()));
        }
    }
}

/// Clears `is_loading` on drop unless a load or reset has since started a
/// newer generation, which owns the flag from then on.
fn loading_claim<'a>(
    store: &'a StateStore,
    ctx: &'a AppContext,
    generation: u64,
) -> Claim<impl FnOnce() + 'a> {
    Claim::new(move || {
        if ctx.feed().is_current(generation) {
            store.update(FeedWindow::PATH, |w: &mut FeedWindow| w.is_loading = false);
        }
    })
}

/// Handle `feed/reset`. Pages in flight are dropped when they land.
pub fn handle_reset(store: &StateStore, ctx: &AppContext) {
    ctx.feed().advance();
    store.update(FeedWindow::PATH, FeedWindow::reset);
    debug!("feed reset");
}
