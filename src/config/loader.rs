use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use super::{Config, ConfigError, ConfigRaw, defaults};

/// Prefix for environment overrides; nested keys are split on `__`, e.g.
/// `CHAT_SYNC_LEDGER__TX_CONFIRMATIONS=3`.
pub const ENV_PREFIX: &str = "CHAT_SYNC_";

/// Private key appended to the wallet keyring when set.
pub const WALLET_PRIVATE_KEY_ENV: &str = "CHAT_WALLET_PRIVATE_KEY";

const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Load configuration from defaults, `config.toml` (or `custom_config_path`),
/// and the environment, in increasing priority.
pub fn load_configuration(custom_config_path: Option<&Path>) -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();

    let mut figment = Figment::from(Serialized::defaults(defaults::config()));

    match custom_config_path {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::MissingConfig(path.display().to_string()));
            }
            tracing::info!(path = %path.display(), "Loading custom config file");
            figment = figment.merge(Toml::file(path));
        }
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE));
        }
        None => {
            tracing::debug!("No config.toml found; using defaults and environment");
        }
    }

    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    let mut config: ConfigRaw = figment.extract().map_err(Box::new)?;

    if let Ok(private_key) = std::env::var(WALLET_PRIVATE_KEY_ENV) {
        let private_key = private_key.trim().to_string();
        if !private_key.is_empty() && !config.wallet.private_keys.contains(&private_key) {
            config.wallet.private_keys.push(private_key);
        }
    }

    let config = config.resolve()?;
    tracing::info!(
        rpc_endpoints = config.ledger.rpc_endpoints().len(),
        store = %config.ledger.message_store_address(),
        "Configuration loaded successfully"
    );

    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::time::Duration;

    use figment::Jail;

    use super::*;
    use crate::logger::LogFormat;

    const STORE: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
    const HARDHAT_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn defaults_require_store_address() {
        Jail::expect_with(|_jail| {
            let err = load_configuration(None).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidConfig(ref msg) if msg.contains("message_store_address")));
            Ok(())
        });
    }

    #[test]
    fn file_and_env_layers_override_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                &format!(
                    r#"
                    [logger]
                    format = "json"

                    [ledger]
                    message_store_address = "{STORE}"
                    tx_confirmations = 2
                    "#
                ),
            )?;
            jail.set_env("CHAT_SYNC_LEDGER__TX_RECEIPT_TIMEOUT_MS", "5000");

            let config = load_configuration(None).map_err(|e| e.to_string())?;
            assert_eq!(config.logger.format, LogFormat::Json);
            assert_eq!(config.logger.level, "info");
            assert_eq!(config.ledger.tx_confirmations(), 2);
            assert_eq!(config.ledger.tx_receipt_timeout(), Some(Duration::from_secs(5)));
            assert_eq!(config.ledger.native_token_decimals(), 18);
            assert_eq!(config.ledger.message_store_address(), STORE.parse::<chat_blockchain::Address>().unwrap());
            Ok(())
        });
    }

    #[test]
    fn wallet_key_comes_from_environment() {
        Jail::expect_with(|jail| {
            jail.set_env("CHAT_SYNC_LEDGER__MESSAGE_STORE_ADDRESS", STORE);
            jail.set_env(WALLET_PRIVATE_KEY_ENV, HARDHAT_KEY);

            let config = load_configuration(None).map_err(|e| e.to_string())?;
            assert_eq!(config.wallet.private_keys, vec![HARDHAT_KEY.to_string()]);
            Ok(())
        });
    }

    #[test]
    fn unknown_keys_are_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                &format!(
                    r#"
                    [ledger]
                    message_store_address = "{STORE}"
                    gas_price = 7
                    "#
                ),
            )?;

            let err = load_configuration(Some(Path::new("custom.toml"))).unwrap_err();
            assert!(matches!(err, ConfigError::LoadError(_)));
            Ok(())
        });
    }

    #[test]
    fn missing_custom_file_is_reported() {
        Jail::expect_with(|_jail| {
            let err = load_configuration(Some(Path::new("absent.toml"))).unwrap_err();
            assert!(matches!(err, ConfigError::MissingConfig(ref path) if path == "absent.toml"));
            Ok(())
        });
    }
}
