use chat_blockchain::{AmountFormatError, BlockchainError};
use chat_domain::MessageDecodeError;
use thiserror::Error;

/// Failures the engine catches at the boundary of the operation that produced
/// them. Only [`EngineError::AmountFormat`] ever reaches a caller.
#[derive(Error, Debug)]
pub enum EngineError {
    /// No provider/signer obtainable; retried on the next `configure`.
    #[error("Ledger connection unavailable: {0}")]
    ConnectionUnavailable(#[source] BlockchainError),

    /// Remote read failed; cache left as it was.
    #[error("Failed to fetch messages: {0}")]
    FetchFailure(#[source] BlockchainError),

    /// Store returned a message that cannot be normalized.
    #[error("Malformed message from store: {0}")]
    MalformedMessage(#[from] MessageDecodeError),

    #[error(transparent)]
    AmountFormat(#[from] AmountFormatError),

    #[error("Submission failed: {0}")]
    SubmissionFailure(#[source] BlockchainError),

    #[error("Event subscription failed: {0}")]
    SubscriptionError(#[source] BlockchainError),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}
