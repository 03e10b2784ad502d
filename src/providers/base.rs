//! Base provider trait and common types for chat
//!
//! This module defines the Provider trait that the completion gateway must
//! implement, along with the message and request types exchanged with it.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a message sender on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions synthesized for each request
    System,
    /// A prompt typed or piped in by the user
    User,
    /// A reply produced by the model
    Assistant,
}

impl Role {
    /// Lowercase wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message structure for a completion request
///
/// Unlike a persisted turn, a message may carry the `system` role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender (system, user, assistant)
    pub role: Role,
    /// Content of the message
    pub content: String,
}

impl Message {
    /// Creates a new system message
    ///
    /// # Examples
    ///
    /// ```
    /// use chat::providers::{Message, Role};
    ///
    /// let msg = Message::system("Keep responses short.");
    /// assert_eq!(msg.role, Role::System);
    /// ```
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use chat::providers::{Message, Role};
    ///
    /// let msg = Message::user("Explain how pi is calculated.");
    /// assert_eq!(msg.role, Role::User);
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates a new assistant message
    ///
    /// # Examples
    ///
    /// ```
    /// use chat::providers::{Message, Role};
    ///
    /// let msg = Message::assistant("Pi is the ratio of a circle's circumference to its diameter.");
    /// assert_eq!(msg.role, Role::Assistant);
    /// ```
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Everything the gateway needs for one completion
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Full provider model identifier (e.g. "gpt-4o")
    pub model: String,
    /// Sampling temperature, already clamped to (0.0, 2.0)
    pub temperature: f64,
    /// System instruction, retained history and the new user prompt, in order
    pub messages: Vec<Message>,
}

/// Completion gateway
///
/// Implementations turn one request into one reply string. Any failure is
/// fatal for the invocation; callers never retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Provider: Send + Sync {
    /// Completes a conversation
    ///
    /// # Arguments
    ///
    /// * `request` - Model, temperature and the ordered message list
    ///
    /// # Returns
    ///
    /// Returns the assistant's reply text
    ///
    /// # Errors
    ///
    /// Returns error if the API call fails or the response is unusable
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}
