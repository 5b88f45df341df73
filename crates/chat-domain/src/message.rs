use alloy::primitives::{Address, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessageDecodeError {
    #[error("Timestamp {0} is outside the representable range")]
    TimestampOutOfRange(U256),
}

/// Message as reported by the record store, before normalization.
///
/// Both the `getOwnMessages` result rows and the `NewMessage` event decode into
/// this shape; nothing past the chain layer sees the ABI types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    pub sender: Address,
    pub receiver: Address,
    pub deposit_amount: U256,
    /// Whole seconds since the Unix epoch.
    pub timestamp: U256,
    pub text: String,
    pub is_pending: bool,
}

/// A message held in the engine's cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Lower-case `0x`-prefixed address.
    pub sender: String,
    /// Lower-case `0x`-prefixed address.
    pub receiver: String,
    /// Deposit in the ledger's smallest unit.
    pub deposit_amount: U256,
    pub timestamp: DateTime<Utc>,
    pub text: String,
    pub is_pending: bool,
}

impl TryFrom<MessageEvent> for Message {
    type Error = MessageDecodeError;

    fn try_from(event: MessageEvent) -> Result<Self, Self::Error> {
        Ok(Self {
            sender: lower_hex(&event.sender),
            receiver: lower_hex(&event.receiver),
            deposit_amount: event.deposit_amount,
            timestamp: normalize_timestamp(event.timestamp)?,
            text: event.text,
            is_pending: event.is_pending,
        })
    }
}

/// Convert an on-chain timestamp (seconds) into an instant, going through
/// milliseconds.
pub fn normalize_timestamp(seconds: U256) -> Result<DateTime<Utc>, MessageDecodeError> {
    let millis = u64::try_from(seconds)
        .ok()
        .and_then(|seconds| seconds.checked_mul(1000))
        .and_then(|millis| i64::try_from(millis).ok())
        .ok_or(MessageDecodeError::TimestampOutOfRange(seconds))?;

    DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or(MessageDecodeError::TimestampOutOfRange(seconds))
}

fn lower_hex(address: &Address) -> String {
    address.to_string().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;

    fn sample_event() -> MessageEvent {
        MessageEvent {
            sender: address!("0x00000000000000000000000000000000000000AA"),
            receiver: address!("0xABC0000000000000000000000000000000000001"),
            deposit_amount: U256::from(42u64),
            timestamp: U256::from(1_700_000_000u64),
            text: "hello".to_string(),
            is_pending: true,
        }
    }

    #[test]
    fn timestamp_seconds_become_milliseconds() {
        let instant = normalize_timestamp(U256::from(1_700_000_000u64)).unwrap();
        assert_eq!(instant.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn timestamp_out_of_range_is_rejected() {
        let result = normalize_timestamp(U256::MAX);
        assert_eq!(result, Err(MessageDecodeError::TimestampOutOfRange(U256::MAX)));

        let too_large = U256::from(u64::MAX / 10);
        assert!(normalize_timestamp(too_large).is_err());
    }

    #[test]
    fn event_converts_with_lower_case_addresses() {
        let message = Message::try_from(sample_event()).unwrap();

        assert_eq!(message.sender, "0x00000000000000000000000000000000000000aa");
        assert_eq!(message.receiver, "0xabc0000000000000000000000000000000000001");
        assert_eq!(message.deposit_amount, U256::from(42u64));
        assert_eq!(message.timestamp.timestamp_millis(), 1_700_000_000_000);
        assert_eq!(message.text, "hello");
        assert!(message.is_pending);
    }
}
