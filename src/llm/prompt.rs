//! Prompt construction
//!
//! The model process keeps no state between calls, so every prompt carries the
//! full conversation. There is no windowing here: history grows without bound
//! and any token budget policy belongs in this module.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One role-tagged message of a conversation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

impl ConversationTurn {
    #[allow(dead_code)] // Constructor for API completeness
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Text written to the model process's stdin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    #[allow(dead_code)] // Used by tests
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Render `history` followed by the new user input and the assistant cue.
pub fn build_prompt(history: &[ConversationTurn], input: &str) -> Prompt {
    let mut text = String::new();
    for turn in history {
        text.push_str(&turn.role);
        text.push_str(": ");
        text.push_str(&turn.content);
        text.push('\n');
    }
    text.push_str("user: ");
    text.push_str(input);
    text.push_str("\nassistant:");
    Prompt(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history() {
        let prompt = build_prompt(&[], "hello");
        assert_eq!(prompt.as_str(), "user: hello\nassistant:");
    }

    #[test]
    fn test_history_role_is_echoed() {
        let history = vec![ConversationTurn::new("user", "hi")];
        let prompt = build_prompt(&history, "how are you");
        assert_eq!(prompt.as_str(), "user: hi\nuser: how are you\nassistant:");
    }

    #[test]
    fn test_turn_order_preserved() {
        let history = vec![
            ConversationTurn::new("user", "first"),
            ConversationTurn::new("assistant", "second"),
            ConversationTurn::new("user", "third"),
        ];
        let prompt = build_prompt(&history, "fourth");
        assert_eq!(
            prompt.as_str(),
            "user: first\nassistant: second\nuser: third\nuser: fourth\nassistant:"
        );
    }

    #[test]
    fn test_multiline_content_kept_verbatim() {
        let history = vec![ConversationTurn::new("assistant", "line one\nline two")];
        let prompt = build_prompt(&history, "");
        assert_eq!(
            prompt.as_str(),
            "assistant: line one\nline two\nuser: \nassistant:"
        );
    }

    #[test]
    fn test_turn_fields_default_when_missing() {
        let turn: ConversationTurn = serde_json::from_str(r#"{"content": "x"}"#).unwrap();
        assert_eq!(turn, ConversationTurn::new("", "x"));
    }
}
