//! Rendering of the lyrics lookup outcome for the user.
//!
//! All texts here are formatted with `MarkdownV2`, which is the default
//! parse mode of the bot.

mod outbox;

use crate::lyrics::{LyricsResult, Query};
use crate::prelude::*;
use crate::util::temp_file::{create_temp_file_in, NamedTempFileExt};
use crate::{err_ctx, Error, IoError, Result};
use async_trait::async_trait;
use std::path::Path;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, InlineQueryResult, InlineQueryResultArticle,
    InputMessageContent, InputMessageContentText, ParseMode,
};
use teloxide::utils::markdown;
use tokio::io::AsyncWriteExt;

pub(crate) use outbox::*;

/// Max length of the text message in Telegram measured in UTF-16 code units
const MAX_MESSAGE_LEN: usize = 4096;

/// Max number of characters of the lyrics shown in the inline query result
const INLINE_PREVIEW_CHARS: usize = 1000;
const ELLIPSIS: &str = "...";

/// Max number of characters of the error message shown to the user
const MAX_ERROR_CHARS: usize = 100;

pub(crate) const SEARCHING: &str = "🔍 Searching\\.\\.\\.";

const SENT_AS_FILE: &str = "📄 Lyrics are sent as a text file \\(too long to display\\)";

const NOT_FOUND: &str = "❌ Oops\\! No lyrics found for this song\\.\n\n\
    Some things you could try:\n\
    • check the spelling of the song name\n\
    • try a more famous title or add the artist name like this: `The Weeknd - Blinding Lights`\n\
    • try again a bit later";

/// Side effects of the direct reply to the user. The reply is done by
/// editing the status message that was sent when the search started.
#[async_trait]
pub(crate) trait Outbox: Send + Sync {
    async fn edit_text(&self, text: String, markup: Option<InlineKeyboardMarkup>) -> Result;

    /// Sends the file at `path` as a document named `file_name`
    async fn send_document(&self, path: &Path, file_name: String, caption: String) -> Result;
}

/// Replies to the user in the private chat with the bot. If the lyrics
/// don't fit into a single message, they are sent as a text file.
pub(crate) async fn direct_reply(
    outcome: Option<&LyricsResult>,
    downloads_dir: &Path,
    outbox: &dyn Outbox,
) -> Result {
    let Some(lyrics) = outcome else {
        return outbox.edit_text(NOT_FOUND.to_owned(), None).await;
    };

    if plain_message_len(lyrics) > MAX_MESSAGE_LEN {
        return reply_with_file(lyrics, downloads_dir, outbox).await;
    }

    let result = outbox
        .edit_text(compose_message(lyrics), Some(search_again_markup()))
        .await;

    match result {
        // Our estimate of the length may differ from Telegram's one
        Err(err) if err.is_message_too_long() => {
            warn!(
                err = tracing_err(&err),
                "Telegram rejected the lyrics message, falling back to a file"
            );
            reply_with_file(lyrics, downloads_dir, outbox).await
        }
        result => result,
    }
}

async fn reply_with_file(lyrics: &LyricsResult, downloads_dir: &Path, outbox: &dyn Outbox) -> Result {
    let prefix = format!("{}-", sanitize_file_name(lyrics.title()));
    let file = create_temp_file_in(downloads_dir, &prefix, ".txt").await?;

    // The file is removed from disk when `path` is dropped or closed
    let (mut file, path) = file.into_tokio();

    let content = format!("{}\n{}\n\n{}", lyrics.title(), lyrics.artist(), lyrics.lyrics());

    file.write_all(content.as_bytes())
        .await
        .map_err(err_ctx!(IoError::WriteLyricsFile))?;
    file.flush()
        .await
        .map_err(err_ctx!(IoError::WriteLyricsFile))?;
    drop(file);

    let sent = send_file(lyrics, &path, outbox).await;

    if let Err(err) = path.close() {
        warn!(err = tracing_err(&err), "Failed to remove the lyrics file");
    }

    sent
}

async fn send_file(lyrics: &LyricsResult, path: &Path, outbox: &dyn Outbox) -> Result {
    outbox.edit_text(SENT_AS_FILE.to_owned(), None).await?;

    let caption = format!(
        "🎶 *{}*\n🎙️ *{}*",
        markdown::escape(lyrics.title()),
        markdown::escape(lyrics.artist())
    );
    let file_name = format!("{}.txt", sanitize_file_name(lyrics.title()));

    outbox.send_document(path, file_name, caption).await
}

/// Full lyrics message with the title and artist header
fn compose_message(lyrics: &LyricsResult) -> String {
    format!(
        "🎶 *Song:* {}\n🎙️ *Artist:* {}\n\n{}",
        markdown::escape(lyrics.title()),
        markdown::escape(lyrics.artist()),
        markdown::escape(lyrics.lyrics()),
    )
}

/// Length of the [`compose_message`] text as Telegram sees it, i.e. after
/// the markup is parsed
fn plain_message_len(lyrics: &LyricsResult) -> usize {
    format!(
        "🎶 Song: {}\n🎙️ Artist: {}\n\n{}",
        lyrics.title(),
        lyrics.artist(),
        lyrics.lyrics(),
    )
    .utf16_len()
}

fn search_again_markup() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([[InlineKeyboardButton::switch_inline_query_current_chat(
        "🔍 Search again",
        "",
    )]])
}

/// Keeps only the characters that are safe to use in a file name on any OS
fn sanitize_file_name(title: &str) -> String {
    let name: String = title
        .chars()
        .map(|char| match char {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            char if char.is_control() => '_',
            char => char,
        })
        .collect();

    let name = name.trim().trim_matches('.').truncate_chars(64).trim();

    if name.is_empty() {
        "lyrics".to_owned()
    } else {
        name.to_owned()
    }
}

/// Single inline query result for the lookup outcome
pub(crate) fn inline_results(query: &Query, outcome: Option<&LyricsResult>) -> Vec<InlineQueryResult> {
    let Some(lyrics) = outcome else {
        let article = article("not_found", "❌ No results found", NOT_FOUND.to_owned())
            .description(format!("Could not find lyrics for '{}'", query.text()));

        return vec![article.into()];
    };

    let text = format!(
        "*🎶 Lyrics Result*\n\n🎶 *Song:* {}\n🎙️ *Artist:* {}\n\n{}",
        markdown::escape(lyrics.title()),
        markdown::escape(lyrics.artist()),
        markdown::escape(&preview(lyrics.lyrics())),
    );

    let markup = InlineKeyboardMarkup::new([[
        InlineKeyboardButton::switch_inline_query_current_chat("❌ Wrong result?", query.text()),
        InlineKeyboardButton::switch_inline_query_current_chat("🔍 Search again", ""),
    ]]);

    let article = article("lyrics", lyrics.title(), text)
        .description(format!("by {}", lyrics.artist()))
        .reply_markup(markup);

    vec![article.into()]
}

/// Shown when the inline query is still empty
pub(crate) fn inline_prompt() -> Vec<InlineQueryResult> {
    let markup = InlineKeyboardMarkup::new([[
        InlineKeyboardButton::switch_inline_query_current_chat("🔍 Search for lyrics...", ""),
    ]]);

    let article = article(
        "prompt",
        "🔍 Search for lyrics...",
        "💬 Search for lyrics inline using this bot\\!".to_owned(),
    )
    .description("Type a song name to search for lyrics")
    .reply_markup(markup);

    vec![article.into()]
}

fn article(id: &str, title: &str, text: String) -> InlineQueryResultArticle {
    // Default parse mode of the bot isn't applied to the inline results content
    let content = InputMessageContentText::new(text).parse_mode(ParseMode::MarkdownV2);
    InlineQueryResultArticle::new(id, title, InputMessageContent::Text(content))
}

fn preview(lyrics: &str) -> std::borrow::Cow<'_, str> {
    lyrics.truncate_chars_with_marker(INLINE_PREVIEW_CHARS, ELLIPSIS)
}

/// Short description of the error for the user. The full error goes to logs,
/// and the user gets its id to report it.
pub(crate) fn error_text(err: &Error) -> String {
    let details = err.kind().to_string();
    let details = details.truncate_chars(MAX_ERROR_CHARS);

    format!(
        "❌ Error: could not fetch lyrics\n\nDetails: {}\nError id: {}",
        markdown::escape(details),
        markdown::code_inline(err.id()),
    )
}
