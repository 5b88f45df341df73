use std::collections::HashMap;

use alloy::{
    network::EthereumWallet,
    primitives::Address,
    signers::local::{LocalSignerError, PrivateKeySigner},
};

use crate::{WalletConfig, error::BlockchainError};

pub(crate) fn signer_from_private_key(
    private_key: &str,
) -> Result<PrivateKeySigner, BlockchainError> {
    private_key
        .parse()
        .map_err(|e: LocalSignerError| BlockchainError::InvalidPrivateKey {
            key_length: private_key.len(),
            source: e,
        })
}

/// Signers the connector may hand out, keyed by account address.
#[derive(Clone, Default)]
pub struct Keyring {
    signers: HashMap<Address, PrivateKeySigner>,
}

impl Keyring {
    pub fn from_config(config: &WalletConfig) -> Result<Self, BlockchainError> {
        let mut signers = HashMap::new();
        for key in &config.private_keys {
            let signer = signer_from_private_key(key)?;
            signers.insert(signer.address(), signer);
        }
        Ok(Self { signers })
    }

    pub fn addresses(&self) -> Vec<Address> {
        self.signers.keys().copied().collect()
    }

    pub(crate) fn wallet_for(&self, address: &Address) -> Option<EthereumWallet> {
        self.signers.get(address).cloned().map(EthereumWallet::from)
    }
}
