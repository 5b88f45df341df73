//! Collaborator contracts between the sync engine and the ledger.
//!
//! The engine only ever talks to these traits; [`crate::EvmConnector`] is the
//! production implementation and tests plug in in-memory fakes.

use std::sync::Arc;

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use chat_domain::{Identity, MessageEvent};
use futures::stream::BoxStream;

use crate::BlockchainError;

/// Live `NewMessage` events decoded at the boundary.
///
/// Dropping the stream deregisters the listener.
pub type MessageEventStream = BoxStream<'static, Result<MessageEvent, BlockchainError>>;

/// Wallet/provider capability: yields a signer-backed connection for an identity.
#[async_trait]
pub trait LedgerConnector: Send + Sync {
    async fn connect(
        &self,
        identity: &Identity,
    ) -> Result<Arc<dyn LedgerConnection>, BlockchainError>;
}

/// Provider and signer bound to one identity.
pub trait LedgerConnection: Send + Sync {
    fn identity(&self) -> &Identity;

    /// Bind the connection to the message store at `store_address`.
    fn bind(&self, store_address: Address) -> Arc<dyn MessageStore>;
}

/// Read/write handle on the message store contract.
#[async_trait]
pub trait MessageStore: Send + Sync {
    fn address(&self) -> Address;

    /// Messages addressed to the bound identity, in store order.
    async fn fetch_own_messages(&self) -> Result<Vec<MessageEvent>, BlockchainError>;

    async fn submit(
        &self,
        submission: Submission,
    ) -> Result<Box<dyn PendingSubmission>, BlockchainError>;

    async fn subscribe(&self) -> Result<MessageEventStream, BlockchainError>;
}

/// A submission accepted by the node but not yet settled.
#[async_trait]
pub trait PendingSubmission: Send {
    fn transaction_hash(&self) -> B256;

    async fn settle(self: Box<Self>) -> Result<SettledSubmission, BlockchainError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub text: String,
    pub receiver: Address,
    /// Deposit attached to the call, in the smallest unit.
    pub deposit_amount: U256,
    /// Upper bound on gas units for the call.
    pub fee_limit: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettledSubmission {
    pub transaction_hash: B256,
    pub block_number: Option<u64>,
}
