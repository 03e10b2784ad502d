//! Provider module for chat
//!
//! This module contains the completion gateway abstraction and its
//! OpenAI-compatible implementation.

pub mod base;
pub mod openai;

pub use base::{CompletionRequest, Message, Provider, Role};
pub use openai::OpenAiProvider;

#[cfg(test)]
pub use base::MockProvider;

use crate::config::GatewayConfig;
use crate::error::Result;

/// Create the provider used by the binary
///
/// # Errors
///
/// Returns error if HTTP client initialization fails
pub fn create_provider(config: GatewayConfig) -> Result<Box<dyn Provider>> {
    Ok(Box::new(OpenAiProvider::new(config)?))
}
