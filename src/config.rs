//! Configuration types.

use secrecy::{ExposeSecret, SecretString};

use crate::error::ConfigError;
use crate::orders::CreatePolicy;

/// Bot configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Telegram bot credential.
    pub bot_token: SecretString,
    /// Numeric Telegram id of the single administrator.
    pub admin_id: i64,
    /// What creating an existing order id does.
    pub create_policy: CreatePolicy,
    /// Also run the stdin/stdout channel.
    pub cli_enabled: bool,
    /// `getUpdates` long-poll timeout.
    pub poll_timeout_secs: u64,
}

impl BotConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variables. Required values fail fast.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bot_token = get("TELEGRAM_BOT_TOKEN")
            .ok_or_else(|| ConfigError::MissingEnvVar("TELEGRAM_BOT_TOKEN".into()))?;
        validate_token(&bot_token)?;

        let admin_id = get("ADMIN_ID")
            .ok_or_else(|| ConfigError::MissingEnvVar("ADMIN_ID".into()))?
            .parse::<i64>()
            .map_err(|e| ConfigError::InvalidValue {
                key: "ADMIN_ID".into(),
                message: e.to_string(),
            })?;

        let create_policy = match get("ORDER_BROKER_CREATE_POLICY").as_deref() {
            None | Some("overwrite") => CreatePolicy::Overwrite,
            Some("reject") => CreatePolicy::Reject,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "ORDER_BROKER_CREATE_POLICY".into(),
                    message: format!("expected 'overwrite' or 'reject', got '{other}'"),
                });
            }
        };

        let cli_enabled = get("ORDER_BROKER_CLI")
            .is_some_and(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"));

        let poll_timeout_secs = match get("ORDER_BROKER_POLL_TIMEOUT_SECS") {
            None => 30,
            Some(v) => v.parse().map_err(|_| ConfigError::InvalidValue {
                key: "ORDER_BROKER_POLL_TIMEOUT_SECS".into(),
                message: format!("'{v}' is not a number of seconds"),
            })?,
        };

        Ok(Self {
            bot_token: SecretString::from(bot_token),
            admin_id,
            create_policy,
            cli_enabled,
            poll_timeout_secs,
        })
    }

    /// The numeric bot id (the part of the token before `:`).
    pub fn bot_id(&self) -> &str {
        self.bot_token
            .expose_secret()
            .split_once(':')
            .map_or("", |(id, _)| id)
    }
}

/// Bot tokens look like `123456:ABC-DEF...`.
fn validate_token(token: &str) -> Result<(), ConfigError> {
    let invalid = |message: &str| ConfigError::InvalidValue {
        key: "TELEGRAM_BOT_TOKEN".into(),
        message: message.into(),
    };

    let (id, secret) = token
        .split_once(':')
        .ok_or_else(|| invalid("expected '<bot id>:<secret>'"))?;
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("bot id before ':' must be numeric"));
    }
    if secret.is_empty() || secret.chars().any(char::is_whitespace) {
        return Err(invalid("secret after ':' is empty or contains whitespace"));
    }
    Ok(())
}
