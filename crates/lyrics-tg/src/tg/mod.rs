//! Telegram bot root module

mod cmd;
mod config;
mod inline_query;
mod lyrics_message;
mod render;

use crate::lyrics::LyricsPipeline;
use crate::prelude::*;
use crate::{err_ctx, IoError, Result};
use dptree::di::DependencyMap;
use std::sync::Arc;
use teloxide::adaptors::{CacheMe, DefaultParseMode, Throttle, Trace};
use teloxide::dispatching::UpdateFilterExt;
use teloxide::prelude::*;
use teloxide::types::{ParseMode, UpdateKind};
use teloxide::utils::command::BotCommands;

pub(crate) use config::*;

pub(crate) type Bot = Trace<CacheMe<DefaultParseMode<Throttle<teloxide::Bot>>>>;

/// Number of updates received from Telegram
const TG_UPDATES_TOTAL: &str = "tg_updates_total";

/// Number of updates received from Telegram, that were skipped by the bot
const TG_UPDATES_SKIPPED_TOTAL: &str = "tg_updates_skipped_total";

pub(crate) struct Ctx {
    bot: Bot,
    cfg: Config,
    lyrics: LyricsPipeline,
}

pub(crate) struct RunBotOptions {
    pub(crate) tg_cfg: Config,
    pub(crate) lyrics: LyricsPipeline,
}

pub(crate) async fn run_bot(opts: RunBotOptions) -> Result {
    fs_err::tokio::create_dir_all(&opts.tg_cfg.downloads_dir)
        .await
        .map_err(err_ctx!(IoError::CreateDownloadsDir))?;

    let bot: Bot = teloxide::Bot::new(opts.tg_cfg.bot_token.clone())
        .throttle(Default::default())
        .parse_mode(ParseMode::MarkdownV2)
        .cache_me()
        .trace(teloxide::adaptors::trace::Settings::TRACE_REQUESTS);

    let mut di = DependencyMap::new();

    di.insert(Arc::new(Ctx {
        bot: bot.clone(),
        cfg: opts.tg_cfg,
        lyrics: opts.lyrics,
    }));

    info!("Starting bot...");

    bot.set_my_commands(cmd::regular::Cmd::bot_commands())
        .await?;

    let me = bot.get_me().await?;

    info!(
        username = me.username(),
        version = env!("CARGO_PKG_VERSION"),
        build_timestamp = env!("VERGEN_BUILD_TIMESTAMP"),
        rustc = env!("VERGEN_RUSTC_SEMVER"),
        "Bot is ready to serve requests"
    );

    let handler = dptree::entry()
        .inspect(|update: Update| {
            metrics::counter!(TG_UPDATES_TOTAL, "kind" => update_kind(&update)).increment(1);
        })
        .branch(
            Update::filter_message()
                .filter(|msg: Message| is_private_chat(&msg))
                .filter_command::<cmd::regular::StartCommand>()
                .endpoint(cmd::handle::<cmd::regular::StartCommand>()),
        )
        .branch(
            Update::filter_message()
                .filter_command::<cmd::regular::Cmd>()
                .endpoint(cmd::handle::<cmd::regular::Cmd>()),
        )
        .branch(
            Update::filter_message()
                .filter_map(lyrics_message::filter)
                .endpoint(lyrics_message::handle),
        )
        .branch(Update::filter_inline_query().endpoint(inline_query::handle))
        .inspect(|update: Update| {
            metrics::counter!(TG_UPDATES_SKIPPED_TOTAL, "kind" => update_kind(&update))
                .increment(1);
        });

    Dispatcher::builder(bot, handler)
        .dependencies(di)
        // We don't handle all possible messages that users send,
        // so to suppress the warning that we don't do this we have
        // a noop default handler here
        .default_handler(|_| std::future::ready(()))
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error has occurred in the dispatcher",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Bot stopped");

    Ok(())
}

fn update_kind(update: &Update) -> &'static str {
    match &update.kind {
        UpdateKind::Message(_) => "message",
        UpdateKind::EditedMessage(_) => "edited_message",
        UpdateKind::InlineQuery(_) => "inline_query",
        UpdateKind::ChosenInlineResult(_) => "chosen_inline_result",
        UpdateKind::CallbackQuery(_) => "callback_query",
        UpdateKind::MyChatMember(_) => "my_chat_member",
        _ => "other",
    }
}

/// The bot talks to users only in private chats, where every message is
/// meant for it.
fn is_private_chat(msg: &Message) -> bool {
    msg.chat.is_private()
}
