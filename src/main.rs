use std::sync::Arc;

use order_broker::bot::Bot;
use order_broker::channels::{ChannelManager, CliChannel, TelegramChannel};
use order_broker::config::BotConfig;
use order_broker::orders::OrderStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = BotConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export TELEGRAM_BOT_TOKEN=123456:ABC...");
        eprintln!("  export ADMIN_ID=<your numeric Telegram id>");
        std::process::exit(1);
    });

    eprintln!("📦 Order Broker v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Bot id: {}", config.bot_id());
    eprintln!("   Admin: {}", config.admin_id);
    eprintln!("   Create policy: {:?}", config.create_policy);
    if config.cli_enabled {
        eprintln!("   CLI: type /menu, a menu tag, or '@name <command>' to act as a worker.\n");
    }

    let store = Arc::new(OrderStore::with_policy(config.create_policy));

    let mut channels = ChannelManager::new();
    channels.add(Box::new(
        TelegramChannel::new(config.bot_token.clone(), config.admin_id)
            .with_poll_timeout(config.poll_timeout_secs),
    ));
    if config.cli_enabled {
        channels.add(Box::new(CliChannel::new(config.admin_id)));
    }

    Bot::new(store, channels).run().await?;
    Ok(())
}
