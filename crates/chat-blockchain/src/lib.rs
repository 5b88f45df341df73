mod chains;
mod config;
mod config_error;
mod error;
mod rpc_rate_limiter;
mod store;
mod utils;

pub use chains::evm::{EvmConnector, Keyring, Messenger, decode_contract_error};
pub use config::{LedgerConfig, LedgerConfigRaw, WalletConfig, WalletConfigRaw};
pub use config_error::ConfigError;
pub use error::BlockchainError;
pub use rpc_rate_limiter::RpcRateLimiter;
pub use store::{
    LedgerConnection, LedgerConnector, MessageEventStream, MessageStore, PendingSubmission,
    SettledSubmission, Submission,
};
pub use utils::{AmountFormatError, parse_display_amount};

pub use alloy::primitives::{Address, B256, U256};
pub use chat_domain::{Identity, MessageEvent};
