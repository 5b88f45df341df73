use std::{sync::Arc, time::Duration, time::Instant};

use alloy::{
    network::{Ethereum, ReceiptResponse},
    primitives::{Address, B256},
    providers::PendingTransactionBuilder,
    rpc::types::Filter,
    sol_types::SolEvent,
};
use async_trait::async_trait;
use chat_domain::MessageEvent;

use super::{
    contracts::Messenger, error_decode::decode_contract_error, feed, provider::BlockchainProvider,
};
use crate::{
    BlockchainError, LedgerConfig, MessageEventStream, MessageStore, PendingSubmission,
    RpcRateLimiter, SettledSubmission, Submission,
};

pub(crate) struct EvmMessageStore {
    contract: Messenger::MessengerInstance<BlockchainProvider>,
    account: Address,
    provider: BlockchainProvider,
    ws_endpoint: Option<String>,
    event_poll_interval: Duration,
    tx_confirmations: u64,
    tx_receipt_timeout: Option<Duration>,
    rpc_rate_limiter: Arc<RpcRateLimiter>,
}

impl EvmMessageStore {
    pub(crate) fn new(
        store_address: Address,
        account: Address,
        provider: BlockchainProvider,
        config: &LedgerConfig,
        rpc_rate_limiter: Arc<RpcRateLimiter>,
    ) -> Self {
        Self {
            contract: Messenger::new(store_address, provider.clone()),
            account,
            provider,
            ws_endpoint: config.ws_endpoint().map(str::to_string),
            event_poll_interval: config.event_poll_interval(),
            tx_confirmations: config.tx_confirmations(),
            tx_receipt_timeout: config.tx_receipt_timeout(),
            rpc_rate_limiter,
        }
    }
}

#[async_trait]
impl MessageStore for EvmMessageStore {
    fn address(&self) -> Address {
        *self.contract.address()
    }

    async fn fetch_own_messages(&self) -> Result<Vec<MessageEvent>, BlockchainError> {
        self.rpc_rate_limiter.acquire().await;

        let started = Instant::now();
        let result = self
            .contract
            .getOwnMessages()
            .from(self.account)
            .call()
            .await;
        let status = if result.is_ok() { "ok" } else { "error" };
        chat_observability::record_ledger_rpc_call(
            "get_own_messages",
            status,
            started.elapsed(),
        );

        let rows = result.map_err(BlockchainError::fetch_messages)?;
        Ok(rows
            .into_iter()
            .map(|row| MessageEvent {
                sender: row.sender,
                receiver: row.receiver,
                deposit_amount: row.depositAmount,
                timestamp: row.timestamp,
                text: row.text,
                is_pending: row.isPending,
            })
            .collect())
    }

    async fn submit(
        &self,
        submission: Submission,
    ) -> Result<Box<dyn PendingSubmission>, BlockchainError> {
        self.rpc_rate_limiter.acquire().await;

        let started = Instant::now();
        let result = self
            .contract
            .sendMessage(submission.text, submission.receiver)
            .from(self.account)
            .value(submission.deposit_amount)
            .gas(submission.fee_limit)
            .send()
            .await;

        match result {
            Ok(pending_tx) => {
                chat_observability::record_submission_stage("send", "ok", started.elapsed());
                let pending_tx = pending_tx
                    .with_required_confirmations(self.tx_confirmations)
                    .with_timeout(self.tx_receipt_timeout);
                Ok(Box::new(EvmPendingSubmission { pending_tx }))
            }
            Err(err) => {
                chat_observability::record_submission_stage("send", "error", started.elapsed());
                let decoded_error = decode_contract_error(&err);
                tracing::debug!(
                    decoded_error = ?decoded_error,
                    "sendMessage rejected: {:?}",
                    err
                );
                Err(BlockchainError::SubmissionRejected {
                    reason: decoded_error.unwrap_or_else(|| err.to_string()),
                })
            }
        }
    }

    async fn subscribe(&self) -> Result<MessageEventStream, BlockchainError> {
        let filter = Filter::new()
            .address(self.address())
            .event_signature(Messenger::NewMessage::SIGNATURE_HASH);

        match self.ws_endpoint.as_deref() {
            Some(endpoint) => feed::push_feed(endpoint, filter).await,
            None => {
                feed::polling_feed(self.provider.clone(), filter, self.event_poll_interval).await
            }
        }
    }
}

struct EvmPendingSubmission {
    pending_tx: PendingTransactionBuilder<Ethereum>,
}

#[async_trait]
impl PendingSubmission for EvmPendingSubmission {
    fn transaction_hash(&self) -> B256 {
        *self.pending_tx.tx_hash()
    }

    async fn settle(self: Box<Self>) -> Result<SettledSubmission, BlockchainError> {
        let transaction_hash = self.transaction_hash();
        let started = Instant::now();

        let receipt = match self.pending_tx.get_receipt().await {
            Ok(receipt) => receipt,
            Err(err) => {
                chat_observability::record_submission_stage(
                    "receipt",
                    "error",
                    started.elapsed(),
                );
                return Err(BlockchainError::ReceiptFailed {
                    reason: err.to_string(),
                });
            }
        };

        if !receipt.status() {
            chat_observability::record_submission_stage("receipt", "reverted", started.elapsed());
            return Err(BlockchainError::Reverted { transaction_hash });
        }

        chat_observability::record_submission_stage("receipt", "ok", started.elapsed());
        Ok(SettledSubmission {
            transaction_hash,
            block_number: receipt.block_number,
        })
    }
}
