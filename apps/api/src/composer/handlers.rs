//! Axum route handlers exposing the composed prompts.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::composer::hints::RequestHints;
use crate::composer::prompts::DEFAULT_CHAT_MODEL;
use crate::composer::{ArtifactKind, ComposedPrompts, PromptComposer};
use crate::models::agent::MergedAgentData;
use crate::referrals::RefContext;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PromptsQuery {
    pub model: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDocumentRequest {
    pub kind: String,
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateDocumentResponse {
    pub prompt: String,
}

/// GET /api/prompts?model=chat-model
pub async fn handle_get_prompts(
    State(state): State<AppState>,
    ref_ctx: RefContext,
    headers: HeaderMap,
    Query(query): Query<PromptsQuery>,
) -> Json<ComposedPrompts> {
    let model = query.model.as_deref().unwrap_or(DEFAULT_CHAT_MODEL);
    let hints = RequestHints::from_headers(&headers);
    Json(PromptComposer::new(&state.store).compose(ref_ctx.value(), model, &hints))
}

/// GET /api/agent
///
/// The merged agent data for the current ref.
pub async fn handle_get_agent(
    State(state): State<AppState>,
    ref_ctx: RefContext,
) -> Json<MergedAgentData> {
    Json(PromptComposer::new(&state.store).merged_data(ref_ctx.value()))
}

/// POST /api/prompts/update-document
pub async fn handle_update_document(
    State(state): State<AppState>,
    ref_ctx: RefContext,
    Json(request): Json<UpdateDocumentRequest>,
) -> Json<UpdateDocumentResponse> {
    let prompt = PromptComposer::new(&state.store).update_document_prompt(
        request.content.as_deref(),
        ArtifactKind::from_name(&request.kind),
        ref_ctx.value(),
    );
    Json(UpdateDocumentResponse { prompt })
}
