//! Prompts for the strategic ruler game
//!
//! Each endpoint turns request data into one instruction for the model. The
//! templates ask for a fixed answer layout (EVENT/CHOICES, OUTCOME/...) that
//! the frontend parses, so their wording is part of the contract.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt::Write;

const FIRST_QUESTION_PROMPT: &str = "You are creating a strategic ruler character for a text-based game. Ask the first character creation question that will determine both roleplay aspects and game stats. Focus on their background, personality, or origin story. Make it engaging and consequential. Only ask ONE question.";

const NEXT_QUESTION_INSTRUCTIONS: &str = "Based on the answers above, ask the next character creation question that builds on what we know. Focus on aspects like:
- Leadership style
- Moral compass
- Special skills or background
- Personal motivations
- Political views

Only ask ONE question. Make it meaningful for both story and game mechanics.";

const EVENT_INSTRUCTIONS: &str = "Generate a dynamic event that:
1. Presents a challenging decision
2. Has 2-3 meaningful choices
3. Could affect resources, relationships, or story
4. Fits the ruler's current situation
5. Can range from political intrigue to personal drama to military challenges

Format as:
EVENT: [Description of what happens]
CHOICES:
1. [Choice 1]
2. [Choice 2]
3. [Choice 3] (if applicable)

Make it engaging and consequential!";

const CONSEQUENCE_INSTRUCTIONS: &str = r#"Determine the consequences of this choice:
1. Immediate narrative outcome
2. Resource changes (gold, army, influence, etc.)
3. Relationship changes with factions/characters
4. Any new information or story developments

Format as:
OUTCOME: [What happens as a result]
RESOURCE_CHANGES: [JSON format like {"gold": +100, "army": -50}]
RELATIONSHIP_CHANGES: [JSON format like {"nobles": +10, "peasants": -5}]
NEW_DEVELOPMENTS: [Any new story elements or unlocked content]

Be specific about numbers and consequences!"#;

const DEFAULT_RULER: &str = "Unknown Ruler";
const DEFAULT_LOCATION: &str = "Your Capitol";

/// A character creation question and the player's reply
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CharacterAnswer {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

/// Prompt for the next character creation question.
pub fn character_question_prompt(answers: &[CharacterAnswer]) -> String {
    if answers.is_empty() {
        return FIRST_QUESTION_PROMPT.to_string();
    }

    let mut context = String::from("Previous character creation answers:\n");
    for (i, answer) in answers.iter().enumerate() {
        let n = i + 1;
        let _ = write!(context, "Q{n}: {}\nA{n}: {}\n", answer.question, answer.answer);
    }

    format!("{context}\n\n{NEXT_QUESTION_INSTRUCTIONS}")
}

/// Prompt for a new event given the current game state.
pub fn event_prompt(game_state: &Value) -> String {
    let ruler = text_field(game_state, "ruler_name", DEFAULT_RULER);
    let location = text_field(game_state, "current_location", DEFAULT_LOCATION);
    let resources = json_field(game_state, "resources");
    let relationships = json_field(game_state, "relationships");

    format!(
        "You are generating an event for a strategic ruler game. Current situation:\n\n\
         Ruler: {ruler}\n\
         Location: {location}\n\
         Resources: {resources}\n\
         Relationships: {relationships}\n\n\
         {EVENT_INSTRUCTIONS}"
    )
}

/// Prompt for the consequences of the player's choice.
pub fn consequence_prompt(game_state: &Value, event: &str, choice: &str) -> String {
    format!(
        "You are processing a player's choice in a strategic ruler game.\n\n\
         Current Game State: {game_state}\n\
         Recent Event: {event}\n\
         Player Choice: {choice}\n\n\
         {CONSEQUENCE_INSTRUCTIONS}"
    )
}

/// String fields render bare; any other JSON value renders as JSON.
fn text_field(state: &Value, key: &str, default: &str) -> String {
    match state.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => default.to_string(),
    }
}

fn json_field(state: &Value, key: &str) -> Value {
    state
        .get(key)
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()))
}
