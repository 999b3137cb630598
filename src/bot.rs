//! Bot runtime: reads actions from every channel, runs them through the
//! interpreter and sends back replies and admin notices.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc;

use crate::channels::{ChannelManager, InboundAction};
use crate::commands::{AdminNotice, Interpreter};
use crate::error::Error;
use crate::orders::OrderStore;

pub struct Bot {
    interpreter: Interpreter,
    channels: ChannelManager,
    notices: mpsc::UnboundedReceiver<AdminNotice>,
}

impl Bot {
    pub fn new(store: Arc<OrderStore>, channels: ChannelManager) -> Self {
        let (tx, notices) = mpsc::unbounded_channel();
        Self {
            interpreter: Interpreter::new(store).with_notices(tx),
            channels,
            notices,
        }
    }

    /// Run until Ctrl+C or until every channel stream ends.
    pub async fn run(mut self) -> Result<(), Error> {
        let mut actions = self.channels.start_all().await?;
        tracing::info!(channels = ?self.channels.names(), "Order broker ready and listening");

        loop {
            let inbound = tokio::select! {
                biased;
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received, shutting down...");
                    break;
                }
                next = actions.next() => {
                    match next {
                        Some(inbound) => inbound,
                        None => {
                            tracing::info!("All channel streams ended, shutting down...");
                            break;
                        }
                    }
                }
            };

            self.dispatch(&inbound).await;
        }

        tracing::info!("Order broker shutting down...");
        self.channels.shutdown_all().await?;
        Ok(())
    }

    async fn dispatch(&mut self, inbound: &InboundAction) {
        tracing::debug!(
            channel = %inbound.channel,
            actor = %inbound.actor.id,
            action = %inbound.action,
            "Handling action"
        );

        let response = self.interpreter.handle(&inbound.action, &inbound.actor);
        if let Err(e) = self.channels.respond(inbound, response).await {
            tracing::error!(channel = %inbound.channel, error = %e, "Failed to send reply");
        }

        // Notices raised by this action go out after the actor's own reply.
        while let Ok(notice) = self.notices.try_recv() {
            self.channels.notify_admin(&notice.text()).await;
        }
    }
}
