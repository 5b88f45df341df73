use std::sync::Arc;

use chat_blockchain::{LedgerConnection, LedgerConnector};
use chat_domain::Identity;

use crate::error::EngineError;

/// Obtains a signer-backed connection for the active identity.
///
/// Never fails past its boundary: every failure is logged and turned into
/// "no connection", which the next `configure` retries.
pub(crate) struct ConnectionManager {
    connector: Arc<dyn LedgerConnector>,
}

impl ConnectionManager {
    pub(crate) fn new(connector: Arc<dyn LedgerConnector>) -> Self {
        Self { connector }
    }

    pub(crate) async fn connect(
        &self,
        identity: Option<&Identity>,
    ) -> Option<Arc<dyn LedgerConnection>> {
        let Some(identity) = identity else {
            tracing::debug!("No identity configured; staying disconnected");
            return None;
        };

        match self.connector.connect(identity).await {
            Ok(connection) => {
                chat_observability::record_ledger_connection("ok");
                tracing::info!(identity = %identity, "Connected to ledger");
                Some(connection)
            }
            Err(err) => {
                chat_observability::record_ledger_connection("error");
                let error = EngineError::ConnectionUnavailable(err);
                tracing::warn!(identity = %identity, error = %error, "Ledger connection unavailable");
                None
            }
        }
    }
}
