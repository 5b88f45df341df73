//! Client-side sync engine for a ledger-backed message store.
//!
//! [`MessageEngine`] keeps a local, ordered list of the messages addressed to
//! the active identity: it backfills from the store on every (re)bind, appends
//! `NewMessage` events as they arrive, and submits new messages with a fixed
//! fee budget.
//!
//! ```no_run
//! # async fn run() -> Result<(), chat_sync::EngineError> {
//! use chat_sync::{Identity, MessageEngine, SendMessageRequest, config, logger};
//!
//! let config = config::load_configuration(None)?;
//! logger::initialize(&config.logger, &config.telemetry);
//!
//! let engine = MessageEngine::from_config(&config.ledger, &config.wallet)?;
//! engine
//!     .configure(Some(Identity::new("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")))
//!     .await;
//!
//! let outcome = engine
//!     .send_message(SendMessageRequest {
//!         text: "hello".to_string(),
//!         receiver: "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".to_string(),
//!         amount: "0.1".to_string(),
//!     })
//!     .await?;
//! tracing::info!(?outcome, records = engine.snapshot().records.len());
//!
//! engine.shutdown().await;
//! # Ok(())
//! # }
//! ```

mod binding;
pub mod config;
mod connection;
mod dispatcher;
mod engine;
mod error;
pub mod logger;
mod state;
mod subscription;
mod synchronizer;

pub use chat_blockchain::AmountFormatError;
pub use chat_domain::{Identity, Message};
pub use dispatcher::{FEE_LIMIT, SendMessageRequest, SendOutcome};
pub use engine::{EngineSettings, MessageEngine};
pub use error::EngineError;
pub use state::EngineView;

#[cfg(test)]
mod tests;
