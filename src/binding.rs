use std::sync::Arc;

use alloy::primitives::Address;
use chat_blockchain::{LedgerConnection, MessageStore};

use crate::state::HandleTag;

/// A connection bound to the message store, valid for one generation.
#[derive(Clone)]
pub(crate) struct BoundHandle {
    tag: HandleTag,
    store: Arc<dyn MessageStore>,
    _connection: Arc<dyn LedgerConnection>,
}

impl BoundHandle {
    pub(crate) fn tag(&self) -> &HandleTag {
        &self.tag
    }

    pub(crate) fn store(&self) -> &Arc<dyn MessageStore> {
        &self.store
    }
}

/// Bind a connection to the fixed store address. No connection, no handle.
pub(crate) fn bind(
    connection: Option<Arc<dyn LedgerConnection>>,
    store_address: Address,
    tag: HandleTag,
) -> Option<BoundHandle> {
    let connection = connection?;
    let store = connection.bind(store_address);

    tracing::debug!(
        generation = tag.generation,
        identity = %connection.identity(),
        store = %store_address,
        "Bound message store"
    );

    Some(BoundHandle {
        tag,
        store,
        _connection: connection,
    })
}
