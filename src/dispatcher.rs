use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use alloy::primitives::{Address, B256};
use chat_blockchain::{
    AmountFormatError, MessageStore, SettledSubmission, Submission, parse_display_amount,
};

use crate::{error::EngineError, state::EngineState};

/// Gas units attached to every `sendMessage` call.
pub const FEE_LIMIT: u64 = 300_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageRequest {
    pub text: String,
    pub receiver: String,
    /// Deposit in display units, e.g. `"0.1"`.
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Settled(SettledSubmission),
    /// No bound handle; nothing was submitted.
    NotConnected,
    /// Another submission is still in flight; nothing was submitted.
    Busy,
    /// Receiver is not a valid address; nothing was submitted.
    InvalidReceiver,
    /// Rejected on submission, or failed/reverted while settling.
    Failed { transaction_hash: Option<B256> },
}

/// Resets both flags on every exit path, including a dropped future.
struct InFlight<'a> {
    claimed: &'a AtomicBool,
    state: &'a EngineState,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.state.set_processing(false);
        self.claimed.store(false, Ordering::Release);
    }
}

pub(crate) struct TransactionDispatcher {
    native_token_decimals: u8,
    claimed: AtomicBool,
}

impl TransactionDispatcher {
    pub(crate) fn new(native_token_decimals: u8) -> Self {
        Self {
            native_token_decimals,
            claimed: AtomicBool::new(false),
        }
    }

    pub(crate) async fn send(
        &self,
        store: Option<Arc<dyn MessageStore>>,
        request: SendMessageRequest,
        state: &EngineState,
    ) -> Result<SendOutcome, AmountFormatError> {
        let deposit_amount = parse_display_amount(&request.amount, self.native_token_decimals)
            .inspect_err(|err| tracing::warn!(error = %err, "Rejecting send with malformed amount"))?;

        let Some(store) = store else {
            tracing::warn!("Cannot send message without a ledger connection");
            return Ok(SendOutcome::NotConnected);
        };

        let Ok(receiver) = request.receiver.trim().parse::<Address>() else {
            tracing::warn!(receiver = %request.receiver, "Rejecting send with invalid receiver");
            return Ok(SendOutcome::InvalidReceiver);
        };

        if self
            .claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("A submission is already in flight");
            return Ok(SendOutcome::Busy);
        }
        let _in_flight = InFlight {
            claimed: &self.claimed,
            state,
        };

        let submission = Submission {
            text: request.text,
            receiver,
            deposit_amount,
            fee_limit: FEE_LIMIT,
        };

        let pending = match store.submit(submission).await {
            Ok(pending) => pending,
            Err(err) => {
                let error = EngineError::SubmissionFailure(err);
                tracing::error!(error = %error, "Message submission rejected");
                return Ok(SendOutcome::Failed {
                    transaction_hash: None,
                });
            }
        };

        let transaction_hash = pending.transaction_hash();
        state.set_processing(true);
        tracing::info!(%transaction_hash, "Message submission accepted; awaiting settlement");

        match pending.settle().await {
            Ok(settled) => {
                tracing::info!(
                    %transaction_hash,
                    block_number = ?settled.block_number,
                    "Message submission settled"
                );
                Ok(SendOutcome::Settled(settled))
            }
            Err(err) => {
                let error = EngineError::SubmissionFailure(err);
                tracing::error!(%transaction_hash, error = %error, "Message submission failed to settle");
                Ok(SendOutcome::Failed {
                    transaction_hash: Some(transaction_hash),
                })
            }
        }
    }
}
