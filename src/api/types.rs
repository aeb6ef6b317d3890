//! API request and response types
//!
//! Every request field is optional on the wire; missing or `null` values fall
//! back to the defaults below rather than rejecting the request.

use crate::game::CharacterAnswer;
use crate::llm::ConversationTurn;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

fn default_session_id() -> String {
    "default".to_string()
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_default_session<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_session_id))
}

fn null_as_empty_object<'de, D>(deserializer: D) -> Result<Value, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.unwrap_or_else(empty_object))
}

/// Request for a free-form completion, blocking or streamed
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub prompt: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub history: Vec<ConversationTurn>,
}

/// Request for the next character creation question
#[derive(Debug, Deserialize)]
pub struct CreateCharacterRequest {
    #[serde(default = "default_session_id", deserialize_with = "null_as_default_session")]
    pub session_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub answers: Vec<CharacterAnswer>,
}

/// Request carrying a session's game state (event generation, saving)
#[derive(Debug, Deserialize)]
pub struct GameStateRequest {
    #[serde(default = "default_session_id", deserialize_with = "null_as_default_session")]
    pub session_id: String,
    #[serde(default = "empty_object", deserialize_with = "null_as_empty_object")]
    pub game_state: Value,
}

/// Request to resolve a player's choice
#[derive(Debug, Deserialize)]
pub struct ProcessChoiceRequest {
    #[serde(default = "default_session_id", deserialize_with = "null_as_default_session")]
    pub session_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub event: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub choice: String,
    #[serde(default = "empty_object", deserialize_with = "null_as_empty_object")]
    pub game_state: Value,
}

/// Response for health checks
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model: String,
}

/// Response for a blocking completion
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub response: String,
}

#[derive(Debug, Serialize)]
pub struct QuestionResponse {
    pub question: String,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub event: String,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct ConsequencesResponse {
    pub consequences: String,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct SaveStateResponse {
    pub success: bool,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct LoadStateResponse {
    pub game_state: Value,
    pub session_id: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generate_request_defaults() {
        let req: GenerateRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.prompt.is_empty());
        assert!(req.history.is_empty());
    }

    #[test]
    fn test_game_requests_default_session_and_state() {
        let req: GameStateRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(req.session_id, "default");
        assert_eq!(req.game_state, json!({}));

        let req: ProcessChoiceRequest =
            serde_json::from_value(json!({"choice": "Flee"})).unwrap();
        assert_eq!(req.session_id, "default");
        assert_eq!(req.choice, "Flee");
        assert!(req.event.is_empty());
    }

    #[test]
    fn test_null_fields_fall_back_to_defaults() {
        let req: GenerateRequest =
            serde_json::from_value(json!({"prompt": null, "history": null})).unwrap();
        assert!(req.prompt.is_empty());
        assert!(req.history.is_empty());

        let req: ProcessChoiceRequest = serde_json::from_value(json!({
            "session_id": null,
            "event": null,
            "choice": "Flee",
            "game_state": null
        }))
        .unwrap();
        assert_eq!(req.session_id, "default");
        assert!(req.event.is_empty());
        assert_eq!(req.game_state, json!({}));

        let req: CreateCharacterRequest =
            serde_json::from_value(json!({"answers": null})).unwrap();
        assert!(req.answers.is_empty());
    }
}
