//! Channel manager: starts every channel and merges their streams.

use futures::stream;
use tracing::{info, warn};

use super::{ActionStream, Channel, InboundAction};
use crate::commands::Response;
use crate::error::ChannelError;

/// Owns the active channels and routes replies back to the right one.
#[derive(Default)]
pub struct ChannelManager {
    channels: Vec<Box<dyn Channel>>,
}

impl ChannelManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, channel: Box<dyn Channel>) {
        info!(channel = channel.name(), "Channel registered");
        self.channels.push(channel);
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    /// Health-check and start every channel; merge their action streams.
    pub async fn start_all(&self) -> Result<ActionStream, ChannelError> {
        let mut streams = Vec::with_capacity(self.channels.len());
        for channel in &self.channels {
            channel.health_check().await?;
            streams.push(channel.start().await?);
            info!(channel = channel.name(), "Channel started");
        }
        Ok(Box::pin(stream::select_all(streams)))
    }

    /// Reply on the channel the action came from.
    pub async fn respond(
        &self,
        inbound: &InboundAction,
        response: Response,
    ) -> Result<(), ChannelError> {
        let channel = self
            .channels
            .iter()
            .find(|c| c.name() == inbound.channel)
            .ok_or_else(|| ChannelError::SendFailed {
                name: inbound.channel.clone(),
                reason: "Unknown channel".into(),
            })?;
        channel.respond(inbound, response).await
    }

    /// Deliver an admin notice on every channel. Failures are logged.
    pub async fn notify_admin(&self, text: &str) {
        for channel in &self.channels {
            if let Err(e) = channel.notify_admin(text).await {
                warn!(channel = channel.name(), error = %e, "Admin notification failed");
            }
        }
    }

    pub async fn shutdown_all(&self) -> Result<(), ChannelError> {
        for channel in &self.channels {
            channel.shutdown().await?;
        }
        Ok(())
    }
}
