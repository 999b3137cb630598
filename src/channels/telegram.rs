//! Telegram channel: long-polls the Bot API for messages and button presses.
//!
//! Messages become actions via [`Action::from_text`]; inline-keyboard presses
//! carry action tags in their callback data. Replies to a button press edit
//! the message the keyboard lives on, falling back to a new message when the
//! edit is refused.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;

use crate::channels::{ActionStream, Channel, InboundAction};
use crate::commands::action::MAX_TAG_LEN;
use crate::commands::{Action, MenuOption, Response};
use crate::error::ChannelError;
use crate::orders::Actor;

/// Maximum message length for Telegram's sendMessage API.
const TELEGRAM_MAX_MESSAGE_LENGTH: usize = 4096;

/// Maximum size of a button's callback data, in bytes.
const TELEGRAM_MAX_CALLBACK_DATA: usize = MAX_TAG_LEN;

/// Timeout for ordinary (non-polling) API calls.
const API_TIMEOUT: Duration = Duration::from_secs(10);

/// Pause after a failed poll before trying again.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

const CHANNEL_NAME: &str = "telegram";

/// Thin Bot API client shared by the channel and its poller task.
#[derive(Clone)]
struct BotApi {
    bot_token: SecretString,
    client: reqwest::Client,
}

impl BotApi {
    fn url(&self, method: &str) -> String {
        format!(
            "https://api.telegram.org/bot{}/{method}",
            self.bot_token.expose_secret()
        )
    }

    /// Call a Bot API method and return its `result` field.
    async fn call(&self, method: &str, body: &Value, timeout: Duration) -> Result<Value, ChannelError> {
        let resp = self
            .client
            .post(self.url(method))
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| ChannelError::Http(format!("{method}: {e}")))?;

        let status = resp.status();
        let data: Value = resp
            .json()
            .await
            .map_err(|e| ChannelError::Http(format!("{method} returned {status}: {e}")))?;

        if data.get("ok").and_then(Value::as_bool) != Some(true) {
            let description = data
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or("no description");
            return Err(ChannelError::SendFailed {
                name: CHANNEL_NAME.into(),
                reason: format!("{method} failed ({status}): {description}"),
            });
        }

        Ok(data.get("result").cloned().unwrap_or(Value::Null))
    }

    /// Send a message, splitting long text. The keyboard goes on the last chunk.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        menu: &[MenuOption],
    ) -> Result<(), ChannelError> {
        let chunks = split_message(text, TELEGRAM_MAX_MESSAGE_LENGTH);
        let last = chunks.len().saturating_sub(1);

        for (i, chunk) in chunks.iter().enumerate() {
            let mut body = serde_json::json!({
                "chat_id": chat_id,
                "text": chunk,
            });
            if i == last && !menu.is_empty() {
                body["reply_markup"] = inline_keyboard(menu);
            }
            self.call("sendMessage", &body, API_TIMEOUT).await?;
        }
        Ok(())
    }

    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        menu: &[MenuOption],
    ) -> Result<(), ChannelError> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": text,
            "reply_markup": inline_keyboard(menu),
        });
        self.call("editMessageText", &body, API_TIMEOUT).await.map(|_| ())
    }

    /// Acknowledge a button press, optionally with a toast.
    async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> Result<(), ChannelError> {
        let mut body = serde_json::json!({ "callback_query_id": callback_id });
        if let Some(text) = text {
            body["text"] = Value::String(text.to_string());
        }
        self.call("answerCallbackQuery", &body, API_TIMEOUT).await.map(|_| ())
    }
}

/// Telegram channel, connected to the Bot API via long-polling.
pub struct TelegramChannel {
    api: BotApi,
    admin_id: i64,
    poll_timeout_secs: u64,
}

impl TelegramChannel {
    pub fn new(bot_token: SecretString, admin_id: i64) -> Self {
        Self {
            api: BotApi {
                bot_token,
                client: reqwest::Client::new(),
            },
            admin_id,
            poll_timeout_secs: 30,
        }
    }

    /// Builder: long-poll timeout passed to `getUpdates`.
    pub fn with_poll_timeout(mut self, secs: u64) -> Self {
        self.poll_timeout_secs = secs;
        self
    }
}

// ── Channel trait implementation ────────────────────────────────────

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        CHANNEL_NAME
    }

    async fn start(&self) -> Result<ActionStream, ChannelError> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let api = self.api.clone();
        let admin_id = self.admin_id;
        let poll_timeout = self.poll_timeout_secs;

        tokio::spawn(async move {
            let mut offset: i64 = 0;

            tracing::info!("Telegram channel listening for updates...");

            loop {
                let body = serde_json::json!({
                    "offset": offset,
                    "timeout": poll_timeout,
                    "allowed_updates": ["message", "callback_query"]
                });
                let http_timeout = Duration::from_secs(poll_timeout) + API_TIMEOUT;

                let updates = match api.call("getUpdates", &body, http_timeout).await {
                    Ok(result) => result,
                    Err(e) => {
                        tracing::warn!("Telegram poll error: {e}");
                        tokio::time::sleep(POLL_RETRY_DELAY).await;
                        continue;
                    }
                };

                let Some(updates) = updates.as_array() else {
                    continue;
                };

                for update in updates {
                    // Advance offset past this update
                    if let Some(uid) = update.get("update_id").and_then(Value::as_i64) {
                        offset = uid + 1;
                    }

                    match parse_update(update, admin_id) {
                        Some(ParsedUpdate::Action(inbound)) => {
                            if tx.send(inbound).is_err() {
                                tracing::info!("Telegram listener channel closed");
                                return;
                            }
                        }
                        Some(ParsedUpdate::UnknownCallback { callback_id }) => {
                            tracing::debug!("Telegram: unrecognised button payload");
                            if let Err(e) = api.answer_callback(&callback_id, Some("Unknown request")).await {
                                tracing::warn!("Telegram answerCallbackQuery failed: {e}");
                            }
                        }
                        None => {}
                    }
                }
            }
        });

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|msg| (msg, rx))
        });

        Ok(Box::pin(stream))
    }

    async fn respond(&self, inbound: &InboundAction, response: Response) -> Result<(), ChannelError> {
        let route = ReplyRoute::from_value(&inbound.reply_to).ok_or_else(|| {
            ChannelError::SendFailed {
                name: CHANNEL_NAME.into(),
                reason: "No chat_id in reply metadata".into(),
            }
        })?;

        let Some(callback_id) = route.callback_id.as_deref() else {
            return self
                .api
                .send_message(route.chat_id, &response.text, &response.menu)
                .await;
        };

        // Refusals on a button press are shown as a toast; the keyboard stays.
        if response.is_error {
            return self.api.answer_callback(callback_id, Some(&response.text)).await;
        }

        let edited = match route.message_id {
            Some(message_id) if response.text.len() <= TELEGRAM_MAX_MESSAGE_LENGTH => {
                match self
                    .api
                    .edit_message(route.chat_id, message_id, &response.text, &response.menu)
                    .await
                {
                    Ok(()) => true,
                    Err(e) => {
                        // e.g. "message is not modified" when refreshing an unchanged list
                        tracing::debug!("Telegram edit refused, sending instead: {e}");
                        false
                    }
                }
            }
            _ => false,
        };
        if !edited {
            self.api
                .send_message(route.chat_id, &response.text, &response.menu)
                .await?;
        }

        self.api.answer_callback(callback_id, None).await
    }

    async fn notify_admin(&self, text: &str) -> Result<(), ChannelError> {
        // A private chat's id is the user's id.
        self.api.send_message(self.admin_id, text, &[]).await
    }

    async fn health_check(&self) -> Result<(), ChannelError> {
        self.api
            .call("getMe", &serde_json::json!({}), API_TIMEOUT)
            .await
            .map(|_| ())
            .map_err(|e| ChannelError::StartupFailed {
                name: CHANNEL_NAME.into(),
                reason: e.to_string(),
            })
    }

    async fn shutdown(&self) -> Result<(), ChannelError> {
        tracing::info!("Telegram channel shutting down");
        Ok(())
    }
}

// ── Update parsing ──────────────────────────────────────────────────

/// A classified `getUpdates` entry.
#[derive(Debug)]
enum ParsedUpdate {
    Action(InboundAction),
    /// A button press whose payload is not an action tag.
    UnknownCallback { callback_id: String },
}

/// Where a reply goes, as stored in `InboundAction::reply_to`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ReplyRoute {
    chat_id: i64,
    message_id: Option<i64>,
    callback_id: Option<String>,
}

impl ReplyRoute {
    fn to_value(&self) -> Value {
        serde_json::json!({
            "chat_id": self.chat_id,
            "message_id": self.message_id,
            "callback_id": self.callback_id,
        })
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(Self {
            chat_id: value.get("chat_id").and_then(Value::as_i64)?,
            message_id: value.get("message_id").and_then(Value::as_i64),
            callback_id: value
                .get("callback_id")
                .and_then(Value::as_str)
                .map(String::from),
        })
    }
}

/// Build the actor from a Telegram `from` object. Only a real username is
/// shown as an `@handle`; otherwise the first name or the numeric id.
fn actor_from(from: &Value, admin_id: i64) -> Option<Actor> {
    let id = from.get("id").and_then(Value::as_i64)?;
    let field = |key: &str| from.get(key).and_then(Value::as_str).filter(|s| !s.is_empty());
    let name = field("username")
        .map(|username| format!("@{username}"))
        .or_else(|| field("first_name").map(String::from))
        .unwrap_or_else(|| id.to_string());

    Some(Actor {
        id: id.to_string(),
        name,
        is_admin: id == admin_id,
    })
}

fn parse_update(update: &Value, admin_id: i64) -> Option<ParsedUpdate> {
    if let Some(message) = update.get("message") {
        let text = message.get("text").and_then(Value::as_str)?;
        let actor = actor_from(message.get("from")?, admin_id)?;
        let chat_id = message.get("chat")?.get("id").and_then(Value::as_i64)?;

        let route = ReplyRoute {
            chat_id,
            message_id: None,
            callback_id: None,
        };
        let inbound = InboundAction::new(CHANNEL_NAME, actor, Action::from_text(text))
            .with_reply_to(route.to_value());
        return Some(ParsedUpdate::Action(inbound));
    }

    let callback = update.get("callback_query")?;
    let callback_id = callback.get("id").and_then(Value::as_str)?.to_string();
    let actor = actor_from(callback.get("from")?, admin_id)?;

    let Some(action) = callback
        .get("data")
        .and_then(Value::as_str)
        .and_then(Action::from_tag)
    else {
        return Some(ParsedUpdate::UnknownCallback { callback_id });
    };

    // The message the keyboard is attached to; absent for very old messages.
    let message = callback.get("message");
    let chat_id = message
        .and_then(|m| m.get("chat"))
        .and_then(|c| c.get("id"))
        .and_then(Value::as_i64)
        .or_else(|| actor_chat_id(&actor))?;
    let message_id = message
        .and_then(|m| m.get("message_id"))
        .and_then(Value::as_i64);

    let route = ReplyRoute {
        chat_id,
        message_id,
        callback_id: Some(callback_id),
    };
    Some(ParsedUpdate::Action(
        InboundAction::new(CHANNEL_NAME, actor, action).with_reply_to(route.to_value()),
    ))
}

fn actor_chat_id(actor: &Actor) -> Option<i64> {
    actor.id.parse().ok()
}

// ── Helpers ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct InlineKeyboardButton {
    text: String,
    callback_data: String,
}

#[derive(Debug, Serialize)]
struct InlineKeyboardMarkup {
    inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

/// One button per row. Options whose tag exceeds the callback limit are dropped.
fn inline_keyboard(menu: &[MenuOption]) -> Value {
    let rows = menu
        .iter()
        .filter_map(|option| {
            let data = option.action.tag();
            if data.len() > TELEGRAM_MAX_CALLBACK_DATA {
                tracing::warn!(tag = %data, "Button payload too long for Telegram; skipped");
                return None;
            }
            Some(vec![InlineKeyboardButton {
                text: option.label.clone(),
                callback_data: data,
            }])
        })
        .collect();

    serde_json::to_value(InlineKeyboardMarkup {
        inline_keyboard: rows,
    })
    .unwrap_or(Value::Null)
}

/// Split a message into chunks that fit Telegram's character limit.
/// Tries to split on newlines, then spaces, then hard-cuts.
fn split_message(text: &str, max_len: usize) -> Vec<String> {
    if text.len() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        if remaining.len() <= max_len {
            chunks.push(remaining.to_string());
            break;
        }

        // Largest char boundary within the limit
        let mut cut = max_len;
        while !remaining.is_char_boundary(cut) {
            cut -= 1;
        }

        let chunk = &remaining[..cut];
        let split_at = chunk
            .rfind('\n')
            .or_else(|| chunk.rfind(' '))
            .unwrap_or(cut);

        // Don't split at position 0 (infinite loop guard)
        let split_at = if split_at == 0 { cut } else { split_at };

        chunks.push(remaining[..split_at].to_string());
        remaining = remaining[split_at..].trim_start();
    }

    chunks
}

// ── Tests ───────────────────────────────────────────────────────────
