use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::composer::hints::RequestHints;
use crate::composer::prompts::DEFAULT_CHAT_MODEL;
use crate::composer::PromptComposer;
use crate::errors::AppError;
use crate::llm_client::ChatMessage;
use crate::referrals::RefContext;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub selected_chat_model: Option<String>,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub model: String,
}

/// POST /api/chat
///
/// Personalizes the system prompt with the current ref and relays the
/// conversation to the language model.
pub async fn handle_chat(
    State(state): State<AppState>,
    ref_ctx: RefContext,
    headers: HeaderMap,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if request.messages.is_empty() {
        return Err(AppError::Validation("messages cannot be empty".to_string()));
    }

    let chat = state
        .chat
        .as_ref()
        .ok_or_else(|| AppError::ServiceUnavailable("chat model is not configured".to_string()))?;

    let model = request
        .selected_chat_model
        .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());
    let hints = RequestHints::from_headers(&headers);
    let system = PromptComposer::new(&state.store).system_prompt(&model, &hints, ref_ctx.value());

    info!(
        "Relaying {} message(s) for ref {:?} with {}",
        request.messages.len(),
        ref_ctx.value(),
        model
    );
    let reply = chat
        .complete(&system, &request.messages)
        .await
        .map_err(|e| AppError::Llm(e.to_string()))?;

    Ok(Json(ChatResponse { reply, model }))
}
