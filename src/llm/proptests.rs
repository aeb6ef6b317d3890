//! Property-based tests for prompt construction
//!
//! - Output is a pure function of history and input
//! - Every turn appears in order, followed by the user/assistant cue
//! - Nothing is dropped: length is the sum of the rendered parts

use super::prompt::{build_prompt, ConversationTurn};
use proptest::prelude::*;

fn arb_turn() -> impl Strategy<Value = ConversationTurn> {
    (
        prop_oneof![
            Just("user".to_string()),
            Just("assistant".to_string()),
            "[a-z]{1,10}",
        ],
        "[a-zA-Z0-9 _.!?,\n]{0,80}",
    )
        .prop_map(|(role, content)| ConversationTurn { role, content })
}

fn arb_history() -> impl Strategy<Value = Vec<ConversationTurn>> {
    proptest::collection::vec(arb_turn(), 0..12)
}

proptest! {
    /// Same inputs → same prompt
    #[test]
    fn prop_build_is_deterministic(
        history in arb_history(),
        input in "[a-zA-Z0-9 _.!?,\n]{0,80}"
    ) {
        prop_assert_eq!(build_prompt(&history, &input), build_prompt(&history, &input));
    }

    /// Turns rendered in order, then the trailing marker
    #[test]
    fn prop_turns_in_order_then_marker(
        history in arb_history(),
        input in "[a-zA-Z0-9 _.!?,\n]{0,80}"
    ) {
        let prompt = build_prompt(&history, &input);
        let mut rest = prompt.as_str();
        for turn in &history {
            let rendered = format!("{}: {}\n", turn.role, turn.content);
            let tail = rest.strip_prefix(rendered.as_str());
            prop_assert!(tail.is_some(), "missing turn {:?}", turn);
            rest = tail.unwrap_or_default();
        }
        prop_assert_eq!(rest, format!("user: {input}\nassistant:"));
    }

    /// Full history is always kept
    #[test]
    fn prop_no_truncation(history in arb_history(), input in "[a-z ]{0,40}") {
        let expected: usize = history
            .iter()
            .map(|t| t.role.len() + t.content.len() + 3)
            .sum::<usize>()
            + "user: ".len()
            + input.len()
            + "\nassistant:".len();
        prop_assert_eq!(build_prompt(&history, &input).as_str().len(), expected);
    }
}
