//! Error types for the order broker.

/// Top-level error type for the bot runtime.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}

/// Configuration-related errors. All of these are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Channel-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("Failed to send response on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(String),
}

/// Order store rule violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("Order #{id} not found")]
    NotFound { id: String },

    #[error("Order #{id} is already taken by {by}")]
    AlreadyClaimed { id: String, by: String },

    #[error("You cannot cancel order #{id}")]
    Forbidden { id: String },

    #[error("Order #{id} already exists")]
    AlreadyExists { id: String },
}

/// Soft, user-facing command failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Could not read order {input:?}. Format: <id>: <description>")]
    Parse { input: String },

    #[error("Order id {id:?} is too long: at most {max} bytes")]
    IdTooLong { id: String, max: usize },

    #[error("Administrator only")]
    Unauthorized,

    #[error(transparent)]
    Order(#[from] OrderError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_error_wraps_transparently() {
        let err: CommandError = OrderError::NotFound { id: "7".into() }.into();
        assert_eq!(err.to_string(), "Order #7 not found");
    }

    #[test]
    fn config_error_names_the_key() {
        let err = ConfigError::InvalidValue {
            key: "ADMIN_ID".into(),
            message: "not a number".into(),
        };
        assert!(err.to_string().contains("ADMIN_ID"));
    }
}
