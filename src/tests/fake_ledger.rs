//! In-memory ledger standing in for the node, the wallet and the store contract.

#![allow(clippy::unwrap_used)]

use std::{
    collections::HashMap,
    pin::Pin,
    sync::{Arc, Mutex, MutexGuard},
    task::{Context, Poll},
};

use alloy::primitives::{Address, B256, U256, address};
use async_trait::async_trait;
use chat_blockchain::{
    BlockchainError, LedgerConnection, LedgerConnector, MessageEventStream, MessageStore,
    PendingSubmission, SettledSubmission, Submission,
};
use chat_domain::{Identity, MessageEvent};
use futures::{
    Stream, StreamExt,
    channel::{mpsc, oneshot},
};

pub(super) const STORE: Address = address!("0x5f5f5f5f5f5f5f5f5f5f5f5f5f5f5f5f5f5f5f5f");
pub(super) const ALICE: &str = "0xABC0000000000000000000000000000000000001";
pub(super) const BOB: &str = "0xdef0000000000000000000000000000000000002";
pub(super) const CAROL: &str = "0x00000000000000000000000000000000000000c3";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum FeedEvent {
    Subscribed(u64),
    Unsubscribed(u64),
}

/// How a held settlement is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Settlement {
    Confirmed,
    Reverted,
}

#[derive(Default)]
struct Inner {
    history: HashMap<Identity, Vec<MessageEvent>>,
    feeds: Vec<mpsc::UnboundedSender<Result<MessageEvent, BlockchainError>>>,
    journal: Vec<FeedEvent>,
    next_feed: u64,
    submissions: Vec<Submission>,
    refuse_connections: bool,
    fail_fetches: bool,
    reject_submissions: bool,
    held_settlement: Option<oneshot::Receiver<Settlement>>,
    emit_on_fetch: Vec<MessageEvent>,
}

impl Inner {
    fn broadcast(&mut self, event: MessageEvent) {
        self.feeds
            .retain(|feed| feed.unbounded_send(Ok(event.clone())).is_ok());
    }
}

#[derive(Default)]
pub(super) struct FakeLedger {
    inner: Mutex<Inner>,
}

impl FakeLedger {
    pub(super) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    pub(super) fn connector(self: &Arc<Self>) -> Arc<dyn LedgerConnector> {
        Arc::new(FakeConnector {
            ledger: Arc::clone(self),
        })
    }

    pub(super) fn seed_history(&self, identity: &str, events: Vec<MessageEvent>) {
        self.inner().history.insert(Identity::new(identity), events);
    }

    pub(super) fn refuse_connections(&self, refuse: bool) {
        self.inner().refuse_connections = refuse;
    }

    pub(super) fn fail_fetches(&self, fail: bool) {
        self.inner().fail_fetches = fail;
    }

    pub(super) fn reject_submissions(&self, reject: bool) {
        self.inner().reject_submissions = reject;
    }

    /// The next accepted submission settles only when the returned sender fires.
    pub(super) fn hold_next_settlement(&self) -> oneshot::Sender<Settlement> {
        let (release, held) = oneshot::channel();
        self.inner().held_settlement = Some(held);
        release
    }

    /// Push an event to every live feed.
    pub(super) fn emit(&self, event: MessageEvent) {
        self.inner().broadcast(event);
    }

    /// Emit `event` right after the next history read, as if it was mined
    /// while the backfill was in flight.
    pub(super) fn emit_during_next_fetch(&self, event: MessageEvent) {
        self.inner().emit_on_fetch.push(event);
    }

    pub(super) fn emit_error(&self, reason: &str) {
        let reason = reason.to_string();
        self.inner().feeds.retain(|feed| {
            feed.unbounded_send(Err(BlockchainError::EventDecode {
                reason: reason.clone(),
            }))
            .is_ok()
        });
    }

    pub(super) fn journal(&self) -> Vec<FeedEvent> {
        self.inner().journal.clone()
    }

    pub(super) fn submissions(&self) -> Vec<Submission> {
        self.inner().submissions.clone()
    }
}

pub(super) fn event(sender: &str, receiver: &str, text: &str, timestamp_secs: u64) -> MessageEvent {
    MessageEvent {
        sender: sender.parse().unwrap(),
        receiver: receiver.parse().unwrap(),
        deposit_amount: U256::from(1_000u64),
        timestamp: U256::from(timestamp_secs),
        text: text.to_string(),
        is_pending: false,
    }
}

struct FakeConnector {
    ledger: Arc<FakeLedger>,
}

#[async_trait]
impl LedgerConnector for FakeConnector {
    async fn connect(
        &self,
        identity: &Identity,
    ) -> Result<Arc<dyn LedgerConnection>, BlockchainError> {
        if self.ledger.inner().refuse_connections {
            return Err(BlockchainError::WalletUnavailable {
                identity: identity.to_string(),
            });
        }

        Ok(Arc::new(FakeConnection {
            identity: identity.clone(),
            ledger: Arc::clone(&self.ledger),
        }))
    }
}

struct FakeConnection {
    identity: Identity,
    ledger: Arc<FakeLedger>,
}

impl LedgerConnection for FakeConnection {
    fn identity(&self) -> &Identity {
        &self.identity
    }

    fn bind(&self, store_address: Address) -> Arc<dyn MessageStore> {
        Arc::new(FakeStore {
            identity: self.identity.clone(),
            address: store_address,
            ledger: Arc::clone(&self.ledger),
        })
    }
}

struct FakeStore {
    identity: Identity,
    address: Address,
    ledger: Arc<FakeLedger>,
}

#[async_trait]
impl MessageStore for FakeStore {
    fn address(&self) -> Address {
        self.address
    }

    async fn fetch_own_messages(&self) -> Result<Vec<MessageEvent>, BlockchainError> {
        let mut inner = self.ledger.inner();
        if inner.fail_fetches {
            return Err(BlockchainError::FetchMessages {
                reason: "node unreachable".to_string(),
                source: None,
            });
        }
        let history = inner.history.get(&self.identity).cloned().unwrap_or_default();

        for event in std::mem::take(&mut inner.emit_on_fetch) {
            inner.broadcast(event);
        }
        Ok(history)
    }

    async fn submit(
        &self,
        submission: Submission,
    ) -> Result<Box<dyn PendingSubmission>, BlockchainError> {
        let mut inner = self.ledger.inner();
        if inner.reject_submissions {
            return Err(BlockchainError::SubmissionRejected {
                reason: "user rejected the request".to_string(),
            });
        }

        inner.submissions.push(submission);
        let transaction_hash = B256::with_last_byte(inner.submissions.len() as u8);
        Ok(Box::new(FakePending {
            transaction_hash,
            held: inner.held_settlement.take(),
        }))
    }

    async fn subscribe(&self) -> Result<MessageEventStream, BlockchainError> {
        let mut inner = self.ledger.inner();
        inner.next_feed += 1;
        let id = inner.next_feed;

        let (sender, receiver) = mpsc::unbounded();
        inner.feeds.push(sender);
        inner.journal.push(FeedEvent::Subscribed(id));

        Ok(TrackedFeed {
            id,
            receiver,
            ledger: Arc::clone(&self.ledger),
        }
        .boxed())
    }
}

/// Feed that journals its own deregistration when dropped.
struct TrackedFeed {
    id: u64,
    receiver: mpsc::UnboundedReceiver<Result<MessageEvent, BlockchainError>>,
    ledger: Arc<FakeLedger>,
}

impl Stream for TrackedFeed {
    type Item = Result<MessageEvent, BlockchainError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_next_unpin(cx)
    }
}

impl Drop for TrackedFeed {
    fn drop(&mut self) {
        self.ledger
            .inner()
            .journal
            .push(FeedEvent::Unsubscribed(self.id));
    }
}

struct FakePending {
    transaction_hash: B256,
    held: Option<oneshot::Receiver<Settlement>>,
}

#[async_trait]
impl PendingSubmission for FakePending {
    fn transaction_hash(&self) -> B256 {
        self.transaction_hash
    }

    async fn settle(self: Box<Self>) -> Result<SettledSubmission, BlockchainError> {
        let settlement = match self.held {
            Some(held) => held.await.unwrap_or(Settlement::Reverted),
            None => Settlement::Confirmed,
        };

        match settlement {
            Settlement::Confirmed => Ok(SettledSubmission {
                transaction_hash: self.transaction_hash,
                block_number: Some(1),
            }),
            Settlement::Reverted => Err(BlockchainError::Reverted {
                transaction_hash: self.transaction_hash,
            }),
        }
    }
}
