use crate::lyrics::Query;
use crate::prelude::*;
use crate::tg::render::{self, Outbox};
use crate::tg;
use crate::util::DynResult;
use crate::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::User;

/// Any text in the private chat with the bot, that isn't a command, is
/// treated as the song name.
pub(crate) fn filter(msg: Message) -> Option<Query> {
    if !tg::is_private_chat(&msg) {
        return None;
    }
    let text = msg.text()?;
    if text.starts_with('/') {
        return None;
    }
    Query::parse(text)
}

pub(crate) async fn handle(ctx: Arc<tg::Ctx>, msg: Message, query: Query) -> DynResult {
    let span = info_span!(
        "handle_lyrics_request",
        sender = msg.from.as_ref().map(User::debug_id).as_deref(),
        chat = %msg.chat.debug_id(),
        query = query.text(),
    );

    reply_with_lyrics(&ctx, &msg, &query)
        .instrument(span)
        .await
        .map_err(Into::into)
}

async fn reply_with_lyrics(ctx: &tg::Ctx, msg: &Message, query: &Query) -> Result {
    let status = ctx.bot.reply_to(msg, render::SEARCHING).await?;

    let outcome = ctx.lyrics.lookup(query).await;

    let outbox = render::TgOutbox::new(&ctx.bot, &status);

    let Err(err) = render::direct_reply(outcome.as_ref(), &ctx.cfg.downloads_dir, &outbox).await
    else {
        return Ok(());
    };

    warn!(
        err = tracing_err(&err),
        id = err.id(),
        "Failed to reply with the lyrics"
    );

    if let Err(err) = outbox.edit_text(render::error_text(&err), None).await {
        warn!(
            err = tracing_err(&err),
            "Failed to reply with the error message to the user"
        );
    }

    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tg::tests::{group_chat, message, private_chat};

    #[test]
    fn text_in_private_chat_is_query() {
        let query = filter(message(private_chat(), " The Weeknd - Blinding Lights ")).unwrap();
        assert_eq!(query.text(), "The Weeknd - Blinding Lights");
    }

    #[test]
    fn other_messages_are_skipped() {
        assert_eq!(filter(message(group_chat(), "Blinding Lights")), None);
        assert_eq!(filter(message(private_chat(), "/start")), None);
        assert_eq!(filter(message(private_chat(), "  \n ")), None);
    }
}
