//! The bot transport seam: opaque send primitives keyed by chat id.
//!
//! Dispatch, relay, fan-out and OTP delivery all talk to this trait; the
//! teloxide-backed implementation lives here, test doubles live with the
//! tests that need them.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile, ParseMode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Telegram send error: {0}")]
    Send(String),
    #[error("Invalid media URL: {0}")]
    InvalidUrl(String),
}

/// Outgoing text markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formatting {
    Plain,
    MarkdownV2,
}

/// Send primitives of the bot transport.
#[async_trait]
pub trait BotTransport: Send + Sync {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        formatting: Formatting,
    ) -> Result<(), TransportError>;

    async fn send_photo(
        &self,
        chat_id: i64,
        url: &str,
        caption: &str,
        formatting: Formatting,
    ) -> Result<(), TransportError>;

    async fn send_document(
        &self,
        chat_id: i64,
        url: &str,
        caption: &str,
        formatting: Formatting,
    ) -> Result<(), TransportError>;
}

/// Telegram Bot API transport.
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    #[must_use]
    pub const fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn parse_url(url: &str) -> Result<reqwest::Url, TransportError> {
    reqwest::Url::parse(url).map_err(|e| TransportError::InvalidUrl(format!("{url}: {e}")))
}

#[async_trait]
impl BotTransport for TelegramTransport {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        formatting: Formatting,
    ) -> Result<(), TransportError> {
        let mut req = self.bot.send_message(ChatId(chat_id), text);
        if formatting == Formatting::MarkdownV2 {
            req = req.parse_mode(ParseMode::MarkdownV2);
        }
        req.await.map_err(|e| TransportError::Send(e.to_string()))?;
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        url: &str,
        caption: &str,
        formatting: Formatting,
    ) -> Result<(), TransportError> {
        let photo = InputFile::url(parse_url(url)?);
        let mut req = self.bot.send_photo(ChatId(chat_id), photo).caption(caption);
        if formatting == Formatting::MarkdownV2 {
            req = req.parse_mode(ParseMode::MarkdownV2);
        }
        req.await.map_err(|e| TransportError::Send(e.to_string()))?;
        Ok(())
    }

    async fn send_document(
        &self,
        chat_id: i64,
        url: &str,
        caption: &str,
        formatting: Formatting,
    ) -> Result<(), TransportError> {
        let document = InputFile::url(parse_url(url)?);
        let mut req = self
            .bot
            .send_document(ChatId(chat_id), document)
            .caption(caption);
        if formatting == Formatting::MarkdownV2 {
            req = req.parse_mode(ParseMode::MarkdownV2);
        }
        req.await.map_err(|e| TransportError::Send(e.to_string()))?;
        Ok(())
    }
}
