mod identity;
mod message;

pub use identity::Identity;
pub use message::{Message, MessageDecodeError, MessageEvent, normalize_timestamp};
