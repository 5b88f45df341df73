use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

/// Address of the account the engine currently tracks.
///
/// Stored lower-cased; the ledger reports addresses in lower case, so every
/// comparison against a ledger-reported address goes through [`Identity::matches`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
    pub fn new(address: impl AsRef<str>) -> Self {
        Self(address.as_ref().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against an address string.
    pub fn matches(&self, address: &str) -> bool {
        self.0.eq_ignore_ascii_case(address.trim())
    }

    /// Parse into an EVM address. Returns `None` for identities that are not
    /// 20-byte hex addresses.
    pub fn address(&self) -> Option<Address> {
        self.0.parse().ok()
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<Address> for Identity {
    fn from(value: Address) -> Self {
        Self::new(value.to_string())
    }
}

impl From<Identity> for String {
    fn from(value: Identity) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_stored_lower_cased() {
        let identity = Identity::new("0xABCDEF0000000000000000000000000000000001");
        assert_eq!(identity.as_str(), "0xabcdef0000000000000000000000000000000001");
    }

    #[test]
    fn matches_ignores_case() {
        let identity = Identity::new("0xAbC0000000000000000000000000000000000001");
        assert!(identity.matches("0xabc0000000000000000000000000000000000001"));
        assert!(identity.matches("0xABC0000000000000000000000000000000000001"));
        assert!(!identity.matches("0xdef0000000000000000000000000000000000001"));
    }

    #[test]
    fn address_parses_only_valid_hex() {
        let identity = Identity::new("0x00000000000000000000000000000000000000aa");
        assert!(identity.address().is_some());
        assert!(Identity::new("alice").address().is_none());
    }
}
