//! Conversation window management
//!
//! This module owns the rolling window of prior turns that is carried from one
//! invocation to the next. The window only ever holds user and assistant
//! turns; the system instruction is synthesized for every request and
//! stripped again before the window is handed back for persistence.

use crate::error::{ChatError, Result};
use crate::providers::{CompletionRequest, Message, Role};
use serde::{Deserialize, Serialize};

/// Role of a persisted turn
///
/// Deserializing any other role (including `system`) fails, which is how a
/// corrupt state file is rejected at the load boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// User prompt
    User,
    /// Model reply
    Assistant,
}

impl From<TurnRole> for Role {
    fn from(role: TurnRole) -> Self {
        match role {
            TurnRole::User => Role::User,
            TurnRole::Assistant => Role::Assistant,
        }
    }
}

/// One message of the retained conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Who produced the turn
    pub role: TurnRole,
    /// Text of the turn
    pub content: String,
}

impl Turn {
    /// Creates a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    /// Creates an assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

impl From<&Turn> for Message {
    fn from(turn: &Turn) -> Self {
        Message {
            role: turn.role.into(),
            content: turn.content.clone(),
        }
    }
}

impl TryFrom<Message> for Turn {
    type Error = ChatError;

    fn try_from(message: Message) -> std::result::Result<Self, Self::Error> {
        let role = match message.role {
            Role::User => TurnRole::User,
            Role::Assistant => TurnRole::Assistant,
            Role::System => {
                return Err(ChatError::InvariantViolation(
                    "system message found after the leading instruction".to_string(),
                ))
            }
        };
        Ok(Self {
            role,
            content: message.content,
        })
    }
}

/// Ordered, bounded history of user/assistant turns
///
/// Insertion order is conversational order. A window produced by
/// [`Exchange::absorb`] always grows by exactly one user/assistant pair.
///
/// # Examples
///
/// ```
/// use chat::conversation::{ConversationWindow, Turn};
///
/// let window = ConversationWindow::from_turns(vec![
///     Turn::user("one"),
///     Turn::assistant("1"),
///     Turn::user("two"),
///     Turn::assistant("2"),
/// ]);
///
/// let trimmed = window.trimmed(1);
/// assert_eq!(trimmed.turns(), &[Turn::user("two"), Turn::assistant("2")]);
/// assert!(window.trimmed(0).is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationWindow {
    turns: Vec<Turn>,
}

impl ConversationWindow {
    /// Creates an empty window
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps already-validated turns
    pub fn from_turns(turns: Vec<Turn>) -> Self {
        Self { turns }
    }

    /// Returns the turns in conversational order
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Consumes the window, returning its turns
    pub fn into_turns(self) -> Vec<Turn> {
        self.turns
    }

    /// Number of turns in the window
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Returns true when the window holds no turns
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Number of complete user/assistant pairs (rounded down)
    pub fn pair_count(&self) -> usize {
        self.turns.len() / 2
    }

    /// Keeps only the last `retain` pairs
    ///
    /// Exactly the last `retain * 2` entries survive; `retain == 0` always
    /// yields an empty window. Trimming is idempotent for a fixed `retain`.
    pub fn trimmed(&self, retain: usize) -> Self {
        let keep = retain.saturating_mul(2);
        let start = self.turns.len().saturating_sub(keep);
        Self {
            turns: self.turns[start..].to_vec(),
        }
    }

    /// Assembles the outbound message sequence for a new prompt
    ///
    /// The result is `[system(instructions)] ++ trimmed(retain) ++ [user(prompt)]`.
    /// The instruction is created fresh here and never becomes part of the
    /// window itself.
    ///
    /// # Examples
    ///
    /// ```
    /// use chat::conversation::ConversationWindow;
    /// use chat::providers::Message;
    ///
    /// let exchange = ConversationWindow::new().prepare("Be brief.", 3, "Explain pi");
    /// assert_eq!(
    ///     exchange.messages(),
    ///     &[Message::system("Be brief."), Message::user("Explain pi")]
    /// );
    /// ```
    pub fn prepare(&self, instructions: &str, retain: usize, prompt: &str) -> Exchange {
        let history = self.trimmed(retain);

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(instructions));
        messages.extend(history.turns.iter().map(Message::from));
        messages.push(Message::user(prompt));

        tracing::debug!(
            "Prepared exchange: {} history turns, {} messages total",
            history.len(),
            messages.len()
        );

        Exchange { messages }
    }
}

/// Ordered messages sent for one completion
///
/// Produced by [`ConversationWindow::prepare`] and consumed by
/// [`Exchange::absorb`] once the reply is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    messages: Vec<Message>,
}

impl Exchange {
    /// The outbound messages, system instruction first
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Builds the gateway request for this exchange
    pub fn request(&self, model: impl Into<String>, temperature: f64) -> CompletionRequest {
        CompletionRequest {
            model: model.into(),
            temperature,
            messages: self.messages.clone(),
        }
    }

    /// Folds the assistant reply back into a window
    ///
    /// Appends the reply, strips the leading system instruction and returns
    /// the remaining user/assistant turns.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::InvariantViolation` if the first message is not the
    /// system instruction or a later message carries the system role. Neither
    /// can happen for an exchange built by `prepare`.
    pub fn absorb(self, reply: impl Into<String>) -> Result<ConversationWindow> {
        let mut messages = self.messages;
        messages.push(Message::assistant(reply));

        match messages.first() {
            Some(first) if first.role == Role::System => {}
            Some(first) => {
                return Err(ChatError::InvariantViolation(format!(
                    "expected leading system instruction, found {} message",
                    first.role
                ))
                .into())
            }
            None => {
                return Err(ChatError::InvariantViolation(
                    "exchange has no messages".to_string(),
                )
                .into())
            }
        }

        let turns = messages
            .into_iter()
            .skip(1)
            .map(Turn::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(ConversationWindow { turns })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::window_of_pairs;

    #[test]
    fn test_trimmed_keeps_last_pairs() {
        let window = window_of_pairs(5);
        let trimmed = window.trimmed(2);

        assert_eq!(trimmed.len(), 4);
        assert_eq!(trimmed.turns()[0], Turn::user("q3"));
        assert_eq!(trimmed.turns()[3], Turn::assistant("a4"));
    }

    #[test]
    fn test_trimmed_zero_yields_empty() {
        assert!(window_of_pairs(3).trimmed(0).is_empty());
    }

    #[test]
    fn test_trimmed_shorter_window_unchanged() {
        let window = window_of_pairs(2);
        assert_eq!(window.trimmed(9), window);
    }

    #[test]
    fn test_trimmed_is_idempotent() {
        for len in 0..12 {
            let turns = (0..len)
                .map(|i| {
                    if i % 2 == 0 {
                        Turn::user(i.to_string())
                    } else {
                        Turn::assistant(i.to_string())
                    }
                })
                .collect();
            let window = ConversationWindow::from_turns(turns);
            for retain in 0..=9 {
                let once = window.trimmed(retain);
                assert_eq!(once.trimmed(retain), once, "len={} retain={}", len, retain);
                assert!(once.len() <= retain * 2);
            }
        }
    }

    #[test]
    fn test_prepare_empty_window() {
        let exchange = ConversationWindow::new().prepare("instructions", 3, "Explain pi");
        assert_eq!(
            exchange.messages(),
            &[Message::system("instructions"), Message::user("Explain pi")]
        );
    }

    #[test]
    fn test_prepare_sends_only_retained_history() {
        let exchange = window_of_pairs(3).prepare("sys", 1, "next");
        let messages = exchange.messages();

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0], Message::system("sys"));
        assert_eq!(messages[1], Message::user("q2"));
        assert_eq!(messages[2], Message::assistant("a2"));
        assert_eq!(messages[3], Message::user("next"));
    }

    #[test]
    fn test_prepare_retain_zero_sends_no_history() {
        let exchange = window_of_pairs(3).prepare("sys", 0, "new prompt");
        assert_eq!(
            exchange.messages(),
            &[Message::system("sys"), Message::user("new prompt")]
        );
    }

    #[test]
    fn test_prepare_does_not_touch_window() {
        let window = window_of_pairs(2);
        let before = window.clone();
        let _ = window.prepare("sys", 1, "hello");
        assert_eq!(window, before);
    }

    #[test]
    fn test_absorb_appends_pair_and_strips_system() {
        let exchange = ConversationWindow::new().prepare("instructions", 3, "Explain pi");
        let window = exchange.absorb("Pi is...").unwrap();

        assert_eq!(
            window.turns(),
            &[Turn::user("Explain pi"), Turn::assistant("Pi is...")]
        );
        assert!(window.len() % 2 == 0);
    }

    #[test]
    fn test_absorb_grows_by_one_pair() {
        let window = window_of_pairs(2);
        let grown = window.prepare("sys", 9, "again").absorb("reply").unwrap();
        assert_eq!(grown.pair_count(), 3);
        assert_eq!(grown.turns()[..4], window.turns()[..]);
    }

    #[test]
    fn test_absorb_rejects_missing_system_instruction() {
        let exchange = Exchange {
            messages: vec![Message::user("no instruction")],
        };
        let err = exchange.absorb("reply").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ChatError>(),
            Some(ChatError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_absorb_rejects_second_system_message() {
        let exchange = Exchange {
            messages: vec![
                Message::system("first"),
                Message::system("second"),
                Message::user("prompt"),
            ],
        };
        assert!(exchange.absorb("reply").is_err());
    }

    #[test]
    fn test_request_carries_model_and_temperature() {
        let exchange = ConversationWindow::new().prepare("sys", 3, "hi");
        let request = exchange.request("gpt-4o", 0.7);
        assert_eq!(request.model, "gpt-4o");
        assert_eq!(request.temperature, 0.7);
        assert_eq!(request.messages.len(), 2);
    }

    #[test]
    fn test_turn_role_rejects_system_on_deserialize() {
        let parsed = serde_json::from_str::<Turn>(r#"{"role":"system","content":"x"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_window_serializes_as_plain_list() {
        let window = window_of_pairs(1);
        let json = serde_json::to_value(&window).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"role": "user", "content": "q0"},
                {"role": "assistant", "content": "a0"}
            ])
        );
    }
}
