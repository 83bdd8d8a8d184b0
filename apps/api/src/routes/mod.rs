pub mod health;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::chat::handlers::handle_chat;
use crate::composer::handlers::{handle_get_agent, handle_get_prompts, handle_update_document};
use crate::greeting::handlers::{handle_get_greeting, handle_landing_page};
use crate::referrals::context::track_ref;
use crate::referrals::handlers::{handle_receive_get, handle_receive_post};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_landing_page))
        .route("/health", get(health::health_handler))
        // Ref capture
        .route(
            "/api/receive",
            get(handle_receive_get).post(handle_receive_post),
        )
        // Personalization
        .route("/api/greeting", get(handle_get_greeting))
        .route("/api/agent", get(handle_get_agent))
        .route("/api/prompts", get(handle_get_prompts))
        .route("/api/prompts/update-document", post(handle_update_document))
        .route("/api/chat", post(handle_chat))
        .layer(middleware::from_fn_with_state(state.clone(), track_ref))
        .with_state(state)
}
