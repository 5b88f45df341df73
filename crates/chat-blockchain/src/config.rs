use std::time::Duration;

use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Largest decimals value `U256` can scale by without overflowing one unit.
const MAX_NATIVE_TOKEN_DECIMALS: u8 = 77;

/// Ledger connection settings as they appear in configuration files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfigRaw {
    /// RPC endpoints for EVM JSON-RPC calls (HTTP or WebSocket).
    /// Multiple endpoints enable fallback if the primary fails.
    #[serde(default)]
    pub rpc_endpoints: Vec<String>,

    /// WebSocket endpoint used for the push event feed.
    /// Without it, new messages are picked up by polling a log filter.
    pub ws_endpoint: Option<String>,

    /// Address of the deployed message store contract.
    pub message_store_address: String,

    /// Native token decimal places (18 for ETH-like chains).
    pub native_token_decimals: u8,

    /// Number of confirmations to wait for when settling a submission.
    pub tx_confirmations: u64,

    /// Timeout for waiting on transaction receipts in milliseconds.
    /// Set to 0 to disable the timeout.
    pub tx_receipt_timeout_ms: u64,

    /// Poll interval for the HTTP log filter feed in milliseconds.
    pub event_poll_interval_ms: u64,

    /// Maximum RPC requests per second (optional rate limiting).
    pub max_rpc_requests_per_second: Option<u32>,
}

impl LedgerConfigRaw {
    pub fn ensure_rpc_endpoints(&self) -> Result<(), ConfigError> {
        if self.rpc_endpoints.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "rpc_endpoints must include at least one endpoint".to_string(),
            ));
        }
        Ok(())
    }

    pub fn ensure_ws_endpoint(&self) -> Result<(), ConfigError> {
        match self.ws_endpoint.as_deref() {
            Some(endpoint) if !endpoint.starts_with("ws://") && !endpoint.starts_with("wss://") => {
                Err(ConfigError::InvalidConfig(format!(
                    "ws_endpoint must use ws:// or wss://, got '{}'",
                    endpoint
                )))
            }
            _ => Ok(()),
        }
    }

    pub fn ensure_max_rpc_requests_per_second(&self) -> Result<(), ConfigError> {
        if self.max_rpc_requests_per_second == Some(0) {
            return Err(ConfigError::InvalidConfig(
                "max_rpc_requests_per_second must be greater than 0 when set".to_string(),
            ));
        }
        Ok(())
    }

    pub fn ensure_native_token_decimals(&self) -> Result<(), ConfigError> {
        if self.native_token_decimals > MAX_NATIVE_TOKEN_DECIMALS {
            return Err(ConfigError::InvalidConfig(format!(
                "native_token_decimals must be at most {}",
                MAX_NATIVE_TOKEN_DECIMALS
            )));
        }
        Ok(())
    }

    pub fn resolve(self) -> Result<LedgerConfig, ConfigError> {
        self.ensure_rpc_endpoints()?;
        self.ensure_ws_endpoint()?;
        self.ensure_max_rpc_requests_per_second()?;
        self.ensure_native_token_decimals()?;

        let message_store_address = parse_evm_address(&self.message_store_address)?;

        Ok(LedgerConfig {
            rpc_endpoints: self.rpc_endpoints,
            ws_endpoint: self.ws_endpoint,
            message_store_address,
            native_token_decimals: self.native_token_decimals,
            tx_confirmations: self.tx_confirmations,
            tx_receipt_timeout_ms: self.tx_receipt_timeout_ms,
            event_poll_interval_ms: self.event_poll_interval_ms,
            max_rpc_requests_per_second: self.max_rpc_requests_per_second,
        })
    }
}

#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub rpc_endpoints: Vec<String>,
    pub ws_endpoint: Option<String>,
    pub message_store_address: Address,
    pub native_token_decimals: u8,
    pub tx_confirmations: u64,
    pub tx_receipt_timeout_ms: u64,
    pub event_poll_interval_ms: u64,
    pub max_rpc_requests_per_second: Option<u32>,
}

impl LedgerConfig {
    pub fn rpc_endpoints(&self) -> &[String] {
        &self.rpc_endpoints
    }

    pub fn ws_endpoint(&self) -> Option<&str> {
        self.ws_endpoint.as_deref()
    }

    pub fn message_store_address(&self) -> Address {
        self.message_store_address
    }

    pub fn native_token_decimals(&self) -> u8 {
        self.native_token_decimals
    }

    pub fn tx_confirmations(&self) -> u64 {
        self.tx_confirmations
    }

    pub fn tx_receipt_timeout(&self) -> Option<Duration> {
        if self.tx_receipt_timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.tx_receipt_timeout_ms))
        }
    }

    pub fn event_poll_interval(&self) -> Duration {
        Duration::from_millis(self.event_poll_interval_ms)
    }

    pub fn max_rpc_requests_per_second(&self) -> Option<u32> {
        self.max_rpc_requests_per_second
    }
}

/// Local keyring standing in for an external wallet.
///
/// Private keys can also be supplied through `CHAT_WALLET_PRIVATE_KEY`,
/// which the loader appends at config load time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WalletConfigRaw {
    #[serde(default)]
    pub private_keys: Vec<String>,
}

impl WalletConfigRaw {
    pub fn resolve(self) -> Result<WalletConfig, ConfigError> {
        for key in &self.private_keys {
            key.parse::<PrivateKeySigner>()
                .map_err(|e| ConfigError::InvalidConfig(format!("invalid private key: {}", e)))?;
        }

        Ok(WalletConfig {
            private_keys: self.private_keys,
        })
    }
}

#[derive(Clone, Default)]
pub struct WalletConfig {
    pub private_keys: Vec<String>,
}

impl std::fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletConfig")
            .field("private_keys", &format_args!("<{} redacted>", self.private_keys.len()))
            .finish()
    }
}

fn parse_evm_address(value: &str) -> Result<Address, ConfigError> {
    value
        .parse::<Address>()
        .map_err(|e| ConfigError::InvalidConfig(format!("invalid EVM address '{}': {}", value, e)))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn sample_raw() -> LedgerConfigRaw {
        LedgerConfigRaw {
            rpc_endpoints: vec!["http://localhost:8545".to_string()],
            ws_endpoint: None,
            message_store_address: "0x0000000000000000000000000000000000000002".to_string(),
            native_token_decimals: 18,
            tx_confirmations: 1,
            tx_receipt_timeout_ms: 60_000,
            event_poll_interval_ms: 2_000,
            max_rpc_requests_per_second: None,
        }
    }

    #[test]
    fn resolve_parses_store_address() {
        let resolved = sample_raw().resolve().unwrap();
        assert_eq!(
            resolved.message_store_address(),
            "0x0000000000000000000000000000000000000002"
                .parse::<Address>()
                .unwrap()
        );
        assert_eq!(resolved.tx_receipt_timeout(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn resolve_rejects_missing_rpc_endpoints() {
        let mut config = sample_raw();
        config.rpc_endpoints = vec![];

        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidConfig(ref msg))
                if msg.contains("rpc_endpoints must include at least one endpoint")
        ));
    }

    #[test]
    fn resolve_rejects_http_ws_endpoint() {
        let mut config = sample_raw();
        config.ws_endpoint = Some("http://localhost:8546".to_string());

        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidConfig(ref msg)) if msg.contains("ws_endpoint")
        ));
    }

    #[test]
    fn resolve_rejects_zero_rpc_rate_limit() {
        let mut config = sample_raw();
        config.max_rpc_requests_per_second = Some(0);

        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidConfig(ref msg))
                if msg.contains("max_rpc_requests_per_second")
        ));
    }

    #[test]
    fn resolve_rejects_invalid_store_address() {
        let mut config = sample_raw();
        config.message_store_address = "not-an-address".to_string();

        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidConfig(ref msg)) if msg.contains("invalid EVM address")
        ));
    }

    #[test]
    fn zero_receipt_timeout_disables_timeout() {
        let mut config = sample_raw();
        config.tx_receipt_timeout_ms = 0;
        assert_eq!(config.resolve().unwrap().tx_receipt_timeout(), None);
    }

    #[test]
    fn wallet_resolve_rejects_bad_key() {
        let raw = WalletConfigRaw {
            private_keys: vec!["zz".to_string()],
        };
        assert!(matches!(raw.resolve(), Err(ConfigError::InvalidConfig(_))));
    }
}
