//! Common error types for Visage

use thiserror::Error;

/// Common result type for Visage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Visage client
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input (bad file, empty draft, value outside the choice set)
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Operation not legal in the current session phase
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Classifier service reported failure (message is the server's, verbatim)
    #[error("Server error: {0}")]
    Server(String),

    /// Transport failure or unparseable response from the service
    #[error("Connection error: {0}")]
    Connection(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// The message shown to the user, without the variant prefix.
    ///
    /// Server messages pass through verbatim; transport problems collapse to
    /// a single generic message so raw reqwest detail never reaches the UI.
    pub fn user_message(&self) -> &str {
        match self {
            Error::Config(msg)
            | Error::Validation(msg)
            | Error::InvalidState(msg)
            | Error::Server(msg)
            | Error::Connection(msg)
            | Error::Internal(msg) => msg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_variant_prefix() {
        let err = Error::Server("No face detected".to_string());
        assert_eq!(err.to_string(), "Server error: No face detected");
    }

    #[test]
    fn test_user_message_strips_prefix() {
        let err = Error::Validation("not a valid image".to_string());
        assert_eq!(err.user_message(), "not a valid image");
    }
}
