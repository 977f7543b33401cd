use crate::tg;
use crate::Result;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use teloxide::utils::command::BotCommands;
use teloxide::utils::markdown;

#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Commands:")]
pub(crate) enum Cmd {
    #[command(description = "show the guide")]
    Help,
}

/// Special case for the `/start` command in PM with the bot.
///
/// We don't want this command to appear in the help message, so we handle
/// it separately
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase")]
pub(crate) enum StartCommand {
    #[command(description = "unreachable")]
    Start,
}

#[async_trait]
impl tg::cmd::Command for Cmd {
    async fn handle(self, ctx: &tg::Ctx, msg: &Message) -> Result {
        match self {
            Cmd::Help => {
                let commands = markdown::escape(&Cmd::descriptions().to_string());
                let example = markdown::code_inline("The Weeknd - Blinding Lights");

                let text = format!(
                    "{commands}\n\n\
                    Send me the name of the song and I'll find its lyrics\\. \
                    Add the artist name for a more precise search: {example}\n\n\
                    You can also search for lyrics inline in any chat by typing \
                    my username and the song name\\."
                );

                ctx.bot
                    .send_message(msg.chat.id, text)
                    .reply_markup(search_inline_markup())
                    .await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl tg::cmd::Command for StartCommand {
    async fn handle(self, ctx: &tg::Ctx, msg: &Message) -> Result {
        let first_name = msg
            .from
            .as_ref()
            .map(|user| user.first_name.as_str())
            .unwrap_or("there");

        let text = format!(
            "Hello *{}*\\!\n\n\
            Welcome to the lyrics bot 🎵\n\n\
            Just send me the name of the song that you want to get lyrics for\\. \
            This is quite simple\\!",
            markdown::escape(first_name),
        );

        ctx.bot
            .send_message(msg.chat.id, text)
            .reply_markup(search_inline_markup())
            .await?;

        Ok(())
    }
}

fn search_inline_markup() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([[InlineKeyboardButton::switch_inline_query_current_chat(
        "🔍 Search inline...",
        "",
    )]])
}
