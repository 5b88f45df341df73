use std::{sync::Arc, time::Instant};

use alloy::primitives::Address;
use async_trait::async_trait;
use chat_domain::Identity;

use crate::{
    BlockchainError, LedgerConfig, LedgerConnection, LedgerConnector, MessageStore,
    RpcRateLimiter,
};

mod contracts;
mod error_decode;
mod feed;
mod messages;
mod provider;
mod wallets;

pub use contracts::Messenger;
pub use error_decode::decode_contract_error;
use messages::EvmMessageStore;
use provider::{BlockchainProvider, initialize_provider_with_wallet};
pub use wallets::Keyring;

/// Connects identities held in the local keyring to the configured ledger.
pub struct EvmConnector {
    config: LedgerConfig,
    keyring: Keyring,
    rpc_rate_limiter: Arc<RpcRateLimiter>,
}

impl EvmConnector {
    pub fn new(config: LedgerConfig, keyring: Keyring) -> Self {
        let rpc_rate_limiter = Arc::new(RpcRateLimiter::new(config.max_rpc_requests_per_second()));
        if let Some(rps) = config.max_rpc_requests_per_second() {
            tracing::info!(rps, "RPC rate limiting enabled");
        }

        Self {
            config,
            keyring,
            rpc_rate_limiter,
        }
    }
}

#[async_trait]
impl LedgerConnector for EvmConnector {
    async fn connect(
        &self,
        identity: &Identity,
    ) -> Result<Arc<dyn LedgerConnection>, BlockchainError> {
        let account = identity
            .address()
            .ok_or_else(|| BlockchainError::InvalidAddress {
                address: identity.to_string(),
            })?;
        let wallet =
            self.keyring
                .wallet_for(&account)
                .ok_or_else(|| BlockchainError::WalletUnavailable {
                    identity: identity.to_string(),
                })?;

        let started = Instant::now();
        let provider = initialize_provider_with_wallet(self.config.rpc_endpoints(), wallet).await;
        let status = if provider.is_ok() { "ok" } else { "error" };
        chat_observability::record_ledger_rpc_call("connect", status, started.elapsed());
        let provider = provider?;

        Ok(Arc::new(EvmConnection {
            identity: identity.clone(),
            account,
            provider,
            config: self.config.clone(),
            rpc_rate_limiter: Arc::clone(&self.rpc_rate_limiter),
        }))
    }
}

struct EvmConnection {
    identity: Identity,
    account: Address,
    provider: BlockchainProvider,
    config: LedgerConfig,
    rpc_rate_limiter: Arc<RpcRateLimiter>,
}

impl LedgerConnection for EvmConnection {
    fn identity(&self) -> &Identity {
        &self.identity
    }

    fn bind(&self, store_address: Address) -> Arc<dyn MessageStore> {
        Arc::new(EvmMessageStore::new(
            store_address,
            self.account,
            self.provider.clone(),
            &self.config,
            Arc::clone(&self.rpc_rate_limiter),
        ))
    }
}
