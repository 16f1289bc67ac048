//! Error types for the CLI application.

use std::fmt;

use pitboss_engine::errors::TableError;

/// Custom error type for CLI operations, allowing error propagation with
/// the `?` operator across command handlers.
#[derive(Debug)]
pub enum CliError {
    /// I/O error (file operations, stdout/stderr writes, etc.)
    Io(std::io::Error),

    /// Invalid user input or command-line arguments
    InvalidInput(String),

    /// Preset/configuration error
    Config(String),

    /// Error surfaced by the table engine
    Engine(TableError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "I/O error: {}", e),
            CliError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Engine(e) => write!(f, "Table error: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(e) => Some(e),
            CliError::Engine(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        CliError::Io(error)
    }
}

impl From<TableError> for CliError {
    fn from(error: TableError) -> Self {
        CliError::Engine(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_the_inner_message() {
        let err = CliError::InvalidInput("rounds must be >= 1".to_string());
        assert_eq!(err.to_string(), "Invalid input: rounds must be >= 1");
    }

    #[test]
    fn test_engine_errors_convert() {
        let err: CliError = TableError::EmptyShoe.into();
        assert!(err.to_string().contains("out of cards"));
    }
}
