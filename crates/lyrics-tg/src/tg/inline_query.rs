use crate::lyrics::Query;
use crate::prelude::*;
use crate::tg::{self, render};
use crate::util::DynResult;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::InlineQuery;

/// Telegram caches the results on its side by default. We don't want the
/// stale "not found" results to stick.
const CACHE_TIME_SECS: u32 = 1;

#[instrument(skip_all, fields(query = %query.query, from = %query.from.debug_id()))]
pub(crate) async fn handle(ctx: Arc<tg::Ctx>, query: InlineQuery) -> DynResult {
    let results = match Query::parse(&query.query) {
        Some(lyrics_query) => {
            let outcome = ctx.lyrics.lookup(&lyrics_query).await;
            render::inline_results(&lyrics_query, outcome.as_ref())
        }
        None => {
            debug!("Empty inline query, showing the prompt");
            render::inline_prompt()
        }
    };

    ctx.bot
        .answer_inline_query(query.id, results)
        .cache_time(CACHE_TIME_SECS)
        .await?;

    Ok(())
}
