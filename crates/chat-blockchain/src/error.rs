use alloy::{
    contract::Error as ContractError,
    primitives::B256,
    signers::local::LocalSignerError,
    transports::{RpcError, TransportErrorKind},
};

#[derive(Debug, thiserror::Error)]
pub enum BlockchainError {
    #[error("Invalid address: {address}")]
    InvalidAddress { address: String },

    #[error("Invalid private key (length: {key_length})")]
    InvalidPrivateKey {
        key_length: usize,
        #[source]
        source: LocalSignerError,
    },

    #[error("No signer available for identity {identity}")]
    WalletUnavailable { identity: String },

    #[error("RPC connection failed after trying {attempts} endpoint(s)")]
    RpcConnectionFailed { attempts: usize },

    #[error("Failed to fetch messages: {reason}")]
    FetchMessages {
        reason: String,
        #[source]
        source: Option<ContractError>,
    },

    #[error("Submission rejected: {reason}")]
    SubmissionRejected { reason: String },

    #[error("Transaction receipt failed: {reason}")]
    ReceiptFailed { reason: String },

    #[error("Transaction {transaction_hash} reverted")]
    Reverted { transaction_hash: B256 },

    #[error("Event subscription failed: {reason}")]
    Subscription {
        reason: String,
        #[source]
        source: Option<RpcError<TransportErrorKind>>,
    },

    #[error("Failed to decode event: {reason}")]
    EventDecode { reason: String },
}

impl BlockchainError {
    pub(crate) fn fetch_messages(err: ContractError) -> Self {
        Self::FetchMessages {
            reason: err.to_string(),
            source: Some(err),
        }
    }

    pub(crate) fn subscription(err: RpcError<TransportErrorKind>) -> Self {
        Self::Subscription {
            reason: err.to_string(),
            source: Some(err),
        }
    }
}
