//! Telegram command handlers: account binding and profile lookup.

use std::sync::Arc;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::info;

use crate::auth::password::hash_password;
use crate::bot::transport::{BotTransport, Formatting};
use crate::config::Settings;
use crate::db::users::{self, NewUser};
use crate::db::Database;
use crate::error::{report, AppError, AppResult};
use crate::utils::escape_markdown;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    /// Link this chat to an account.
    Start,
    /// Link this chat to an account.
    Bind,
    /// Show the linked account.
    Me,
}

/// The slice of an incoming Telegram message the handlers care about.
#[derive(Debug, Clone)]
pub struct ChatEvent {
    pub chat_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl ChatEvent {
    fn from_message(msg: &Message) -> Self {
        Self {
            chat_id: msg.chat.id.0,
            username: msg.chat.username().map(str::to_owned),
            first_name: msg.chat.first_name().map(str::to_owned),
            last_name: msg.chat.last_name().map(str::to_owned),
        }
    }

    fn full_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => "Anonymous".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    Linked,
    AlreadyLinked,
}

fn confess_link(settings: &Settings, username: &str, chat_id: i64) -> String {
    format!("{}/{}/{}", settings.client_base_url, username, chat_id)
}

/// Binds the chat to an account, creating one on first contact.
pub async fn handle_bind(
    db: &Database,
    transport: &dyn BotTransport,
    settings: &Settings,
    event: &ChatEvent,
) -> AppResult<BindOutcome> {
    let existing = users::find_by_chat_id(db.pool(), event.chat_id).await?;

    let (user, outcome) = match existing {
        Some(user) => (user, BindOutcome::AlreadyLinked),
        None => {
            let username = event
                .username
                .clone()
                .unwrap_or_else(|| event.chat_id.to_string());
            let password_hash = hash_password(&event.chat_id.to_string())?;
            let user = users::create(
                db.pool(),
                NewUser {
                    name: event.full_name(),
                    username,
                    password_hash,
                    role: crate::db::models::Role::User,
                    chat_id: Some(event.chat_id),
                    profile_image: None,
                },
            )
            .await?;
            info!(chat_id = event.chat_id, "new user registered via bot");
            (user, BindOutcome::Linked)
        }
    };

    let link = confess_link(settings, &user.username, event.chat_id);

    if outcome == BindOutcome::Linked {
        if let Some(admin_chat_id) = settings.telegram_admin_chat_id {
            let card = format!(
                "*New User Registered*\n\n\
                 *Name:* {}\n\
                 *Username:* {}\n\
                 *Chat ID:* `{}`\n\
                 *Confess Link:* `{link}`\n\n",
                escape_markdown(&event.full_name()),
                escape_markdown(&user.username),
                event.chat_id,
            );
            transport
                .send_message(admin_chat_id, &card, Formatting::MarkdownV2)
                .await?;
        }
    }

    let title = match outcome {
        BindOutcome::Linked => "✅ Your Telegram is now linked",
        BindOutcome::AlreadyLinked => "💟 Your account has been linked already",
    };
    let card = format!(
        "*{}*\n\n\
         *Name:* {}\n\
         *Username:* {}\n\
         *Chat ID:* `{}`\n\
         *Confess Link:* `{link}`\n\n\
         Copy your confess link and let others confess anonymously\\. \
         You can now receive messages via this bot\\. Enjoy it🇰🇭✨🎉",
        escape_markdown(title),
        escape_markdown(&event.full_name()),
        escape_markdown(&user.username),
        event.chat_id,
    );
    transport
        .send_message(event.chat_id, &card, Formatting::MarkdownV2)
        .await?;

    Ok(outcome)
}

/// Replies with the account bound to this chat.
pub async fn handle_me(
    db: &Database,
    transport: &dyn BotTransport,
    settings: &Settings,
    event: &ChatEvent,
) -> AppResult<()> {
    let user = users::find_by_chat_id(db.pool(), event.chat_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_owned()))?;

    let link = confess_link(settings, &user.username, event.chat_id);
    let card = format!(
        "💟 *This is your account info*\n\n\
         *Name:* {}\n\
         *Role:* {}\n\
         *Username:* {}\n\
         *Chat ID:* `{}`\n\
         *Confess Link:* `{link}`\n\n",
        escape_markdown(&user.name),
        escape_markdown(user.role.as_str()),
        escape_markdown(&user.username),
        event.chat_id,
    );
    transport
        .send_message(event.chat_id, &card, Formatting::MarkdownV2)
        .await
        .map_err(AppError::from)
}

type HandlerResult = Result<(), teloxide::RequestError>;

async fn handle_command(
    msg: Message,
    cmd: Command,
    db: Arc<Database>,
    transport: Arc<dyn BotTransport>,
    settings: Arc<Settings>,
) -> HandlerResult {
    let event = ChatEvent::from_message(&msg);
    match cmd {
        Command::Start | Command::Bind => {
            if let Err(e) = handle_bind(&db, transport.as_ref(), &settings, &event).await {
                report(&e, "telegram bind handler");
                let _ = transport
                    .send_message(
                        event.chat_id,
                        "❌ Something went wrong while linking your Telegram.",
                        Formatting::Plain,
                    )
                    .await;
            }
        }
        Command::Me => {
            if let Err(e) = handle_me(&db, transport.as_ref(), &settings, &event).await {
                report(&e, "telegram me handler");
                let _ = transport
                    .send_message(
                        event.chat_id,
                        "type /start to link your telegram account first!",
                        Formatting::Plain,
                    )
                    .await;
            }
        }
    }
    Ok(())
}

fn dispatch_handler() -> UpdateHandler<teloxide::RequestError> {
    dptree::entry().branch(
        Update::filter_message().branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(handle_command),
        ),
    )
}

/// Runs the long-polling dispatcher until shutdown.
pub async fn run_dispatcher(
    bot: Bot,
    db: Arc<Database>,
    transport: Arc<dyn BotTransport>,
    settings: Arc<Settings>,
) {
    Dispatcher::builder(bot, dispatch_handler())
        .dependencies(dptree::deps![db, transport, settings])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}
