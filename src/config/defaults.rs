//! Built-in defaults, the lowest configuration layer.
//!
//! `ledger.message_store_address` has no usable default and must come from a
//! file or the environment.

use chat_blockchain::{LedgerConfigRaw, WalletConfigRaw};

use super::ConfigRaw;
use crate::logger::{LogFormat, LoggerConfig, TelemetryConfig, TelemetryMetricsConfig};

pub(crate) fn config() -> ConfigRaw {
    ConfigRaw {
        logger: LoggerConfig {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        },
        telemetry: TelemetryConfig {
            metrics: TelemetryMetricsConfig {
                enabled: false,
                bind_address: "127.0.0.1:9464".to_string(),
            },
        },
        ledger: ledger(),
        wallet: WalletConfigRaw::default(),
    }
}

fn ledger() -> LedgerConfigRaw {
    LedgerConfigRaw {
        rpc_endpoints: vec!["http://127.0.0.1:8545".to_string()],
        ws_endpoint: None,
        message_store_address: String::new(),
        native_token_decimals: 18,
        tx_confirmations: 1,
        tx_receipt_timeout_ms: 60_000,
        event_poll_interval_ms: 2_000,
        max_rpc_requests_per_second: None,
    }
}
