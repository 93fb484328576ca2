//! CLI error types

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Invalid argument combination, caught before any side effect
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Startup configuration failure (e.g. metrics endpoint bind)
    #[error("configuration error: {0}")]
    ConfigurationError(String),
}
