use super::Outbox;
use crate::tg::Bot;
use crate::Result;
use async_trait::async_trait;
use std::path::Path;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardMarkup, InputFile, MessageId};

/// [`Outbox`] that edits the status message in the chat with the user
pub(crate) struct TgOutbox<'a> {
    bot: &'a Bot,
    chat_id: ChatId,
    status_message_id: MessageId,
}

impl<'a> TgOutbox<'a> {
    pub(crate) fn new(bot: &'a Bot, status_message: &Message) -> Self {
        Self {
            bot,
            chat_id: status_message.chat.id,
            status_message_id: status_message.id,
        }
    }
}

#[async_trait]
impl Outbox for TgOutbox<'_> {
    async fn edit_text(&self, text: String, markup: Option<InlineKeyboardMarkup>) -> Result {
        let request = self
            .bot
            .edit_message_text(self.chat_id, self.status_message_id, text);

        match markup {
            Some(markup) => request.reply_markup(markup).await?,
            None => request.await?,
        };

        Ok(())
    }

    async fn send_document(&self, path: &Path, file_name: String, caption: String) -> Result {
        let document = InputFile::file(path).file_name(file_name);

        self.bot
            .send_document(self.chat_id, document)
            .caption(caption)
            .await?;

        Ok(())
    }
}
