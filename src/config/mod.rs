mod defaults;
mod error;
mod loader;

use chat_blockchain::{LedgerConfig, LedgerConfigRaw, WalletConfig, WalletConfigRaw};
pub use error::ConfigError;
pub use loader::{ENV_PREFIX, WALLET_PRIVATE_KEY_ENV, load_configuration};
use serde::{Deserialize, Serialize};

use crate::logger::{LoggerConfig, TelemetryConfig};

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ConfigRaw {
    pub logger: LoggerConfig,
    pub telemetry: TelemetryConfig,
    pub ledger: LedgerConfigRaw,
    #[serde(default)]
    pub wallet: WalletConfigRaw,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub logger: LoggerConfig,
    pub telemetry: TelemetryConfig,
    pub ledger: LedgerConfig,
    pub wallet: WalletConfig,
}

impl ConfigRaw {
    pub fn resolve(self) -> Result<Config, ConfigError> {
        if self.ledger.message_store_address.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "ledger.message_store_address must be set".to_string(),
            ));
        }

        Ok(Config {
            logger: self.logger,
            telemetry: self.telemetry,
            ledger: self.ledger.resolve()?,
            wallet: self.wallet.resolve()?,
        })
    }
}
