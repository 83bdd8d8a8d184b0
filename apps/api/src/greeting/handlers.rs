use axum::{extract::State, response::Html, Json};
use serde::Serialize;

use crate::greeting::page::render_page;
use crate::greeting::{render_lines, DisplayFields, GreetingLine, GreetingPresenter};
use crate::referrals::RefContext;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct GreetingResponse {
    #[serde(rename = "ref")]
    pub reference: Option<String>,
    pub fields: DisplayFields,
    pub lines: Vec<GreetingLine>,
}

/// GET /
///
/// Landing page personalized for the ref carried by the request.
pub async fn handle_landing_page(State(state): State<AppState>, ref_ctx: RefContext) -> Html<String> {
    let fields = GreetingPresenter::new(&state.store).present(ref_ctx.value());
    Html(render_page(&render_lines(&fields)))
}

/// GET /api/greeting
pub async fn handle_get_greeting(
    State(state): State<AppState>,
    ref_ctx: RefContext,
) -> Json<GreetingResponse> {
    let fields = GreetingPresenter::new(&state.store).present(ref_ctx.value());
    let lines = render_lines(&fields);
    Json(GreetingResponse {
        reference: ref_ctx.value().map(str::to_string),
        fields,
        lines,
    })
}
