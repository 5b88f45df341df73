use std::sync::Arc;

use chat_blockchain::MessageEventStream;
use chat_domain::{Message, MessageEvent};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::{
    binding::BoundHandle,
    error::EngineError,
    state::{EngineState, HandleTag},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LiveOutcome {
    Admitted,
    ForeignReceiver,
    Stale,
    Invalid,
}

impl LiveOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            LiveOutcome::Admitted => "admitted",
            LiveOutcome::ForeignReceiver => "foreign_receiver",
            LiveOutcome::Stale => "stale",
            LiveOutcome::Invalid => "invalid",
        }
    }
}

/// Feed registered on a handle whose listener has not been started. Dropping
/// it deregisters the feed.
pub(crate) struct RegisteredFeed {
    tag: HandleTag,
    events: MessageEventStream,
}

enum SubscriptionState {
    Unattached,
    Attached {
        generation: u64,
        /// Cancels the listener when dropped, including when the engine is
        /// dropped without `shutdown`.
        shutdown: DropGuard,
        listener: JoinHandle<()>,
    },
}

/// Live `NewMessage` listener for the current handle.
///
/// At most one listener exists at a time. [`EventSubscription::register`]
/// always finishes tearing the previous listener down, including dropping its
/// event stream, before registering a new one. Dropping the subscription
/// cancels the listener without waiting for it.
pub(crate) struct EventSubscription {
    state: SubscriptionState,
}

impl EventSubscription {
    pub(crate) fn new() -> Self {
        Self {
            state: SubscriptionState::Unattached,
        }
    }

    /// Tear down any current listener, then register a feed on `handle`.
    ///
    /// Events arriving before [`EventSubscription::start`] queue in the feed.
    pub(crate) async fn register(
        &mut self,
        handle: &BoundHandle,
        state: &EngineState,
    ) -> Option<RegisteredFeed> {
        self.detach().await;

        let tag = handle.tag().clone();
        if !state.is_current(&tag) {
            tracing::debug!(generation = tag.generation, "Skipping listener for superseded handle");
            return None;
        }

        match handle.store().subscribe().await {
            Ok(events) => Some(RegisteredFeed { tag, events }),
            Err(err) => {
                let error = EngineError::SubscriptionError(err);
                tracing::warn!(
                    generation = tag.generation,
                    error = %error,
                    "Failed to register NewMessage listener"
                );
                None
            }
        }
    }

    /// Spawn the listener over a registered feed.
    pub(crate) fn start(&mut self, feed: RegisteredFeed, state: Arc<EngineState>) {
        let RegisteredFeed { tag, events } = feed;
        let shutdown = CancellationToken::new();
        let generation = tag.generation;
        let listener = tokio::spawn(run_listener(tag, events, state, shutdown.clone()));

        chat_observability::record_subscription_transition("attach");
        tracing::debug!(generation, "NewMessage listener attached");

        self.state = SubscriptionState::Attached {
            generation,
            shutdown: shutdown.drop_guard(),
            listener,
        };
    }

    pub(crate) async fn detach(&mut self) {
        let SubscriptionState::Attached {
            generation,
            shutdown,
            listener,
        } = std::mem::replace(&mut self.state, SubscriptionState::Unattached)
        else {
            return;
        };

        drop(shutdown);
        if let Err(error) = listener.await
            && !error.is_cancelled()
        {
            tracing::warn!(generation, error = %error, "NewMessage listener ended abnormally");
        }

        chat_observability::record_subscription_transition("detach");
        tracing::debug!(generation, "NewMessage listener detached");
    }
}

async fn run_listener(
    tag: HandleTag,
    mut events: MessageEventStream,
    state: Arc<EngineState>,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            next = events.next() => match next {
                Some(Ok(event)) => {
                    let outcome = handle_event(&tag, event, &state);
                    chat_observability::record_live_event(outcome.as_str());
                }
                Some(Err(err)) => {
                    let error = EngineError::SubscriptionError(err);
                    tracing::warn!(generation = tag.generation, error = %error, "Skipping undecodable event");
                    chat_observability::record_live_event(LiveOutcome::Invalid.as_str());
                }
                None => {
                    tracing::warn!(generation = tag.generation, "NewMessage event stream closed");
                    break;
                }
            },
        }
    }
    drop(events);
}

pub(crate) fn handle_event(tag: &HandleTag, event: MessageEvent, state: &EngineState) -> LiveOutcome {
    let message = match Message::try_from(event) {
        Ok(message) => message,
        Err(err) => {
            tracing::warn!(error = %err, "Dropping malformed live message");
            return LiveOutcome::Invalid;
        }
    };

    let addressed_to_us = tag
        .identity
        .as_ref()
        .is_some_and(|identity| identity.matches(&message.receiver));
    if !addressed_to_us {
        tracing::trace!(receiver = %message.receiver, "Ignoring message for another receiver");
        return LiveOutcome::ForeignReceiver;
    }

    if state.append_record(tag, message) {
        LiveOutcome::Admitted
    } else {
        LiveOutcome::Stale
    }
}
