//! The `Channel` trait and the types that cross the transport boundary.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::commands::{Action, Response};
use crate::error::ChannelError;
use crate::orders::Actor;

/// An action received from a transport, already classified.
#[derive(Debug, Clone)]
pub struct InboundAction {
    /// Name of the channel it arrived on.
    pub channel: String,
    pub actor: Actor,
    pub action: Action,
    /// Transport-specific routing data (chat id, message id, callback id).
    pub reply_to: serde_json::Value,
}

impl InboundAction {
    pub fn new(channel: impl Into<String>, actor: Actor, action: Action) -> Self {
        Self {
            channel: channel.into(),
            actor,
            action,
            reply_to: serde_json::Value::Null,
        }
    }

    /// Builder: attach routing data.
    pub fn with_reply_to(mut self, reply_to: serde_json::Value) -> Self {
        self.reply_to = reply_to;
        self
    }
}

/// Stream of inbound actions from a channel.
pub type ActionStream = Pin<Box<dyn Stream<Item = InboundAction> + Send>>;

/// A chat transport the bot can listen on and reply through.
#[async_trait]
pub trait Channel: Send + Sync {
    fn name(&self) -> &str;

    /// Start listening. Inbound actions arrive on the returned stream.
    async fn start(&self) -> Result<ActionStream, ChannelError>;

    /// Show `response` to the actor who sent `inbound`.
    async fn respond(&self, inbound: &InboundAction, response: Response)
    -> Result<(), ChannelError>;

    /// Deliver a message to the administrator. Channels without an admin
    /// destination ignore it.
    async fn notify_admin(&self, _text: &str) -> Result<(), ChannelError> {
        Ok(())
    }

    async fn health_check(&self) -> Result<(), ChannelError>;

    async fn shutdown(&self) -> Result<(), ChannelError>;
}
