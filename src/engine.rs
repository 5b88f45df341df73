use std::sync::Arc;

use alloy::primitives::Address;
use chat_blockchain::{
    AmountFormatError, EvmConnector, Keyring, LedgerConfig, LedgerConnector, MessageStore,
    WalletConfig,
};
use chat_domain::Identity;
use tokio::sync::{Mutex, watch};

use crate::{
    binding::{self, BoundHandle},
    connection::ConnectionManager,
    dispatcher::{SendMessageRequest, SendOutcome, TransactionDispatcher},
    error::EngineError,
    state::{EngineState, EngineView},
    subscription::EventSubscription,
    synchronizer::{BackfillOutcome, MessageSynchronizer},
};

/// Fixed parameters of the record store the engine binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub store_address: Address,
    pub native_token_decimals: u8,
}

impl From<&LedgerConfig> for EngineSettings {
    fn from(config: &LedgerConfig) -> Self {
        Self {
            store_address: config.message_store_address(),
            native_token_decimals: config.native_token_decimals(),
        }
    }
}

struct Session {
    handle: Option<BoundHandle>,
    subscription: EventSubscription,
}

/// Keeps a local, ordered view of the messages addressed to the active
/// identity and submits new ones.
///
/// `configure` rebuilds the whole pipeline (connection, binding, backfill,
/// live listener) for an identity. Consumers read [`EngineView`] snapshots;
/// only the engine writes to them.
pub struct MessageEngine {
    connections: ConnectionManager,
    settings: EngineSettings,
    state: Arc<EngineState>,
    session: Mutex<Session>,
    dispatcher: TransactionDispatcher,
}

impl MessageEngine {
    pub fn new(connector: Arc<dyn LedgerConnector>, settings: EngineSettings) -> Self {
        Self {
            connections: ConnectionManager::new(connector),
            settings,
            state: Arc::new(EngineState::new()),
            session: Mutex::new(Session {
                handle: None,
                subscription: EventSubscription::new(),
            }),
            dispatcher: TransactionDispatcher::new(settings.native_token_decimals),
        }
    }

    /// Engine backed by the EVM connector and a local keyring.
    pub fn from_config(ledger: &LedgerConfig, wallet: &WalletConfig) -> Result<Self, EngineError> {
        let keyring = Keyring::from_config(wallet).map_err(EngineError::ConnectionUnavailable)?;
        tracing::info!(
            accounts = keyring.addresses().len(),
            store = %ledger.message_store_address(),
            "Initializing message engine"
        );

        let connector = EvmConnector::new(ledger.clone(), keyring);
        Ok(Self::new(Arc::new(connector), EngineSettings::from(ledger)))
    }

    /// Rebind everything to `identity`. Call on every identity or provider
    /// change; passing the current identity again forces a fresh connection.
    ///
    /// Live events start applying once the backfill has replaced the cache.
    #[tracing::instrument(name = "engine.configure", skip(self))]
    pub async fn configure(&self, identity: Option<Identity>) {
        let mut session = self.session.lock().await;

        session.subscription.detach().await;
        session.handle = None;

        let tag = self.state.begin_generation(identity);
        let connection = self.connections.connect(tag.identity.as_ref()).await;
        let Some(handle) = binding::bind(connection, self.settings.store_address, tag.clone())
        else {
            self.state.clear_records(&tag);
            return;
        };

        // Registered before the backfill so events emitted while it runs wait
        // in the feed instead of being lost.
        let feed = session.subscription.register(&handle, &self.state).await;

        match MessageSynchronizer::backfill(&handle, &self.state).await {
            BackfillOutcome::Applied(records) => {
                tracing::debug!(generation = handle.tag().generation, records, "Cache seeded");
            }
            BackfillOutcome::Failed => {}
            BackfillOutcome::Stale => return,
        }
        if let Some(feed) = feed {
            session.subscription.start(feed, Arc::clone(&self.state));
        }
        session.handle = Some(handle);
    }

    pub fn snapshot(&self) -> EngineView {
        self.state.snapshot()
    }

    /// Receiver notified on every change to the view.
    pub fn subscribe_view(&self) -> watch::Receiver<EngineView> {
        self.state.subscribe()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state.identity()
    }

    pub async fn is_connected(&self) -> bool {
        self.session.lock().await.handle.is_some()
    }

    /// Submit a message and wait for it to settle.
    ///
    /// A malformed amount is the only error returned; every other failure is
    /// logged and reported through [`SendOutcome`].
    #[tracing::instrument(name = "engine.send_message", skip(self, request), fields(receiver = %request.receiver))]
    pub async fn send_message(
        &self,
        request: SendMessageRequest,
    ) -> Result<SendOutcome, AmountFormatError> {
        let store = self.current_store().await;
        self.dispatcher.send(store, request, &self.state).await
    }

    /// Tear down the live listener and drop the handle.
    pub async fn shutdown(&self) {
        let mut session = self.session.lock().await;
        session.subscription.detach().await;
        session.handle = None;
        tracing::info!("Message engine shut down");
    }

    async fn current_store(&self) -> Option<Arc<dyn MessageStore>> {
        let session = self.session.lock().await;
        session
            .handle
            .as_ref()
            .map(|handle| Arc::clone(handle.store()))
    }
}
