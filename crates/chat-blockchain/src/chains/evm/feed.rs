use std::{sync::Arc, time::Duration};

use alloy::{
    primitives::U256,
    providers::{Provider, ProviderBuilder, WsConnect},
    rpc::{
        client::PollerBuilder,
        types::{Filter, Log},
    },
    sol_types::SolEvent,
};
use async_stream::stream;
use chat_domain::MessageEvent;
use futures::StreamExt;

use super::{contracts::Messenger, provider::BlockchainProvider};
use crate::{MessageEventStream, error::BlockchainError};

/// Push feed over `eth_subscribe("logs")` on a dedicated WebSocket connection.
///
/// The connection lives inside the returned stream and closes with it.
pub(crate) async fn push_feed(
    ws_endpoint: &str,
    filter: Filter,
) -> Result<MessageEventStream, BlockchainError> {
    let provider = ProviderBuilder::new()
        .connect_ws(WsConnect::new(ws_endpoint))
        .await
        .map_err(BlockchainError::subscription)?;
    let subscription = provider
        .subscribe_logs(&filter)
        .await
        .map_err(BlockchainError::subscription)?;

    tracing::debug!(endpoint = %ws_endpoint, "Subscribed to NewMessage logs");

    let events = stream! {
        let _provider = provider;
        let mut logs = Box::pin(subscription.into_stream());
        while let Some(log) = logs.next().await {
            yield decode_new_message(&log);
        }
        tracing::warn!("NewMessage log subscription ended");
    };

    Ok(Box::pin(events))
}

/// Polling feed over an `eth_newFilter` log filter, for HTTP-only setups.
///
/// The filter is uninstalled on the node once the stream is dropped.
pub(crate) async fn polling_feed(
    provider: BlockchainProvider,
    filter: Filter,
    poll_interval: Duration,
) -> Result<MessageEventStream, BlockchainError> {
    let filter_id = provider
        .new_filter(&filter)
        .await
        .map_err(BlockchainError::subscription)?;
    let installed = InstalledFilter {
        provider: Arc::clone(&provider),
        id: filter_id,
    };

    let poller = PollerBuilder::<(U256,), Vec<Log>>::new(
        provider.weak_client(),
        "eth_getFilterChanges",
        (filter_id,),
    )
    .with_poll_interval(poll_interval);

    tracing::debug!(
        %filter_id,
        poll_interval_ms = poll_interval.as_millis(),
        "Installed NewMessage log filter"
    );

    let events = stream! {
        let _installed = installed;
        let mut batches = Box::pin(poller.into_stream());
        while let Some(logs) = batches.next().await {
            for log in logs {
                yield decode_new_message(&log);
            }
        }
        tracing::warn!("NewMessage log filter stream ended");
    };

    Ok(Box::pin(events))
}

/// Log filter installed on the node; uninstalled in the background on drop.
struct InstalledFilter {
    provider: BlockchainProvider,
    id: U256,
}

impl Drop for InstalledFilter {
    fn drop(&mut self) {
        let id = self.id;
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::debug!(filter_id = %id, "No runtime to uninstall log filter; leaving it to expire");
            return;
        };

        let provider = Arc::clone(&self.provider);
        runtime.spawn(async move {
            match provider.uninstall_filter(id).await {
                Ok(removed) => {
                    tracing::debug!(filter_id = %id, removed, "Uninstalled NewMessage log filter")
                }
                Err(error) => tracing::debug!(
                    filter_id = %id,
                    error = %error,
                    "Failed to uninstall log filter; the node will expire it"
                ),
            }
        });
    }
}

pub(crate) fn decode_new_message(log: &Log) -> Result<MessageEvent, BlockchainError> {
    let decoded = Messenger::NewMessage::decode_log(&log.inner).map_err(|e| {
        BlockchainError::EventDecode {
            reason: e.to_string(),
        }
    })?;
    let event = decoded.data;

    Ok(MessageEvent {
        sender: event.sender,
        receiver: event.receiver,
        deposit_amount: event.depositAmount,
        timestamp: event.timestamp,
        text: event.text,
        is_pending: event.isPending,
    })
}
