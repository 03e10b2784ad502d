//! chat - terminal ChatGPT interface library
//!
//! This library provides the pieces behind the `chat` binary: persisted
//! settings and conversation state, the settings resolver, the conversation
//! window, and the completion gateway.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `storage`: load/save of the single state record
//! - `config`: model table, settings resolution, gateway configuration
//! - `conversation`: retained window, request assembly, reply absorption
//! - `providers`: completion gateway trait and the OpenAI implementation
//! - `output`: reply, settings and usage printing
//! - `commands`: one invocation end to end
//! - `cli`: command-line interface definition
//! - `error`: error types and result aliases
//!
//! # Example
//!
//! ```no_run
//! use chat::commands::{execute, Invocation};
//! use chat::config::GatewayConfig;
//! use chat::providers::create_provider;
//! use chat::storage::StateStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = StateStore::new()?;
//!     let provider = create_provider(GatewayConfig::from_env())?;
//!     let invocation = Invocation {
//!         prompt: Some("Explain how pi is calculated.".to_string()),
//!         ..Default::default()
//!     };
//!
//!     let mut out = std::io::stdout();
//!     execute(&invocation, &store, provider.as_ref(), &mut out, 80).await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod conversation;
pub mod error;
pub mod output;
pub mod providers;
pub mod storage;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use config::{ModelKey, Settings, SettingsLayer};
pub use conversation::{ConversationWindow, Exchange, Turn, TurnRole};
pub use error::{ChatError, Result};
pub use storage::{LoadOutcome, StateStore};
