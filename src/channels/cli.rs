//! CLI channel: stdin/stdout REPL for local testing.
//!
//! Lines are performed by the local administrator unless prefixed with
//! `@name `, which acts as the worker `name`. A line may be a slash command,
//! a menu tag as printed next to each option, or `<id>: <description>`.

use async_trait::async_trait;
use futures::stream;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::channels::{ActionStream, Channel, InboundAction};
use crate::commands::{Action, Response};
use crate::error::ChannelError;
use crate::orders::Actor;

/// A simple CLI channel that reads from stdin and writes to stdout.
pub struct CliChannel {
    admin: Actor,
}

impl CliChannel {
    pub fn new(admin_id: i64) -> Self {
        Self {
            admin: Actor::admin(admin_id.to_string(), "admin"),
        }
    }
}

/// Split an optional `@name` prefix off a line and classify the rest.
fn parse_line(line: &str, admin: &Actor) -> Option<(Actor, Action)> {
    let line = line.trim();
    let (actor, rest) = match line.strip_prefix('@') {
        Some(rest) => {
            let (name, rest) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            if name.is_empty() {
                return None;
            }
            (Actor::worker(format!("cli:{name}"), name), rest.trim())
        }
        None => (admin.clone(), line),
    };

    if rest.is_empty() {
        return None;
    }
    let action = Action::from_tag(rest).unwrap_or_else(|| Action::from_text(rest));
    Some((actor, action))
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    async fn start(&self) -> Result<ActionStream, ChannelError> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let admin = self.admin.clone();

        tokio::spawn(async move {
            let stdin = tokio::io::stdin();
            let reader = BufReader::new(stdin);
            let mut lines = reader.lines();

            // Print prompt
            eprint!("> ");

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let Some((actor, action)) = parse_line(&line, &admin) else {
                            eprint!("> ");
                            continue;
                        };
                        if tx.send(InboundAction::new("cli", actor, action)).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break, // EOF
                    Err(e) => {
                        tracing::error!("Error reading stdin: {}", e);
                        break;
                    }
                }
            }
        });

        let stream = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|msg| (msg, rx))
        });

        Ok(Box::pin(stream))
    }

    async fn respond(
        &self,
        inbound: &InboundAction,
        response: Response,
    ) -> Result<(), ChannelError> {
        println!("\n[{}] {}", inbound.actor.name, response.text);
        for option in &response.menu {
            println!("  [{}] {}", option.action.tag(), option.label);
        }
        println!();
        eprint!("> ");
        Ok(())
    }

    async fn notify_admin(&self, text: &str) -> Result<(), ChannelError> {
        eprintln!("\n📣 {text}");
        Ok(())
    }

    async fn health_check(&self) -> Result<(), ChannelError> {
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), ChannelError> {
        Ok(())
    }
}
