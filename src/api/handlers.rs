//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{
    ConsequencesResponse, CreateCharacterRequest, ErrorResponse, EventResponse,
    GameStateRequest, GenerateRequest, GenerateResponse, HealthResponse, LoadStateResponse,
    ProcessChoiceRequest, QuestionResponse, SaveStateResponse,
};
use super::AppState;
use crate::game;
use crate::llm::{build_prompt, LlmError};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        // Free-form completions
        .route("/api/generate", post(generate_text))
        .route("/api/stream", post(stream_text))
        // Game loop
        .route("/api/game/create-character", post(create_character))
        .route("/api/game/generate-event", post(generate_event))
        .route("/api/game/process-choice", post(process_choice))
        .route("/api/game/save-state", post(save_game_state))
        .route("/api/game/load-state/:session_id", get(load_game_state))
        .with_state(state)
}

// ============================================================
// Health
// ============================================================

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        model: state.llm.model_id().to_string(),
    })
}

// ============================================================
// Completions
// ============================================================

async fn generate_text(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    if req.prompt.is_empty() {
        return Err(AppError::BadRequest("No prompt provided".to_string()));
    }

    let prompt = build_prompt(&req.history, &req.prompt);
    let response = state.llm.complete(&prompt).await?;

    Ok(Json(GenerateResponse { response }))
}

async fn stream_text(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.prompt.is_empty() {
        return Err(AppError::BadRequest("No prompt provided".to_string()));
    }

    let prompt = build_prompt(&req.history, &req.prompt);
    let events = state.llm.stream(&prompt).await;

    Ok(sse_stream(events))
}

// ============================================================
// Game Loop
// ============================================================

/// Game prompts are standalone: no conversation history is carried.
async fn ask(state: &AppState, instruction: &str) -> Result<String, AppError> {
    let prompt = build_prompt(&[], instruction);
    Ok(state.llm.complete(&prompt).await?)
}

async fn create_character(
    State(state): State<AppState>,
    Json(req): Json<CreateCharacterRequest>,
) -> Result<Json<QuestionResponse>, AppError> {
    let instruction = game::character_question_prompt(&req.answers);
    let question = ask(&state, &instruction).await?;

    Ok(Json(QuestionResponse {
        question,
        session_id: req.session_id,
    }))
}

async fn generate_event(
    State(state): State<AppState>,
    Json(req): Json<GameStateRequest>,
) -> Result<Json<EventResponse>, AppError> {
    let instruction = game::event_prompt(&req.game_state);
    let event = ask(&state, &instruction).await?;

    Ok(Json(EventResponse {
        event,
        session_id: req.session_id,
    }))
}

async fn process_choice(
    State(state): State<AppState>,
    Json(req): Json<ProcessChoiceRequest>,
) -> Result<Json<ConsequencesResponse>, AppError> {
    let instruction = game::consequence_prompt(&req.game_state, &req.event, &req.choice);
    let consequences = ask(&state, &instruction).await?;

    Ok(Json(ConsequencesResponse {
        consequences,
        session_id: req.session_id,
    }))
}

async fn save_game_state(
    State(state): State<AppState>,
    Json(req): Json<GameStateRequest>,
) -> Json<SaveStateResponse> {
    state.sessions.save(&req.session_id, req.game_state).await;

    Json(SaveStateResponse {
        success: true,
        session_id: req.session_id,
    })
}

async fn load_game_state(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<LoadStateResponse> {
    let game_state = state.sessions.load(&session_id).await;

    Json(LoadStateResponse {
        game_state,
        session_id,
    })
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Internal(String),
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        AppError::Internal(e.client_message())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
