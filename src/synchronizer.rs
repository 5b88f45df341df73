use chat_domain::Message;

use crate::{binding::BoundHandle, error::EngineError, state::EngineState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BackfillOutcome {
    /// Cache replaced with this many records.
    Applied(usize),
    /// Handle was superseded while the fetch was in flight.
    Stale,
    /// Fetch or normalization failed; cache untouched.
    Failed,
}

/// Seeds the cache from the store's own-messages view.
pub(crate) struct MessageSynchronizer;

impl MessageSynchronizer {
    #[tracing::instrument(
        name = "sync.backfill",
        skip(handle, state),
        fields(generation = handle.tag().generation)
    )]
    pub(crate) async fn backfill(handle: &BoundHandle, state: &EngineState) -> BackfillOutcome {
        match Self::fetch_normalized(handle).await {
            Ok(records) => {
                let count = records.len();
                if state.replace_records(handle.tag(), records) {
                    chat_observability::record_backfill("ok", count);
                    tracing::info!(records = count, "Backfilled message cache");
                    BackfillOutcome::Applied(count)
                } else {
                    chat_observability::record_backfill("stale", count);
                    tracing::debug!("Discarding backfill for superseded handle");
                    BackfillOutcome::Stale
                }
            }
            Err(error) => {
                chat_observability::record_backfill("error", 0);
                tracing::warn!(error = %error, "Backfill failed; cache left unchanged");
                BackfillOutcome::Failed
            }
        }
    }

    /// All-or-nothing: one malformed row fails the batch.
    async fn fetch_normalized(handle: &BoundHandle) -> Result<Vec<Message>, EngineError> {
        let events = handle
            .store()
            .fetch_own_messages()
            .await
            .map_err(EngineError::FetchFailure)?;

        events
            .into_iter()
            .map(|event| Message::try_from(event).map_err(EngineError::from))
            .collect()
    }
}
