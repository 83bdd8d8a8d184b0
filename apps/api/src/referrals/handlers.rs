//! Ref capture entry point: `GET|POST /api/receive`.

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, RawQuery, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::referrals::resolver::{ref_from_query, REF_PARAM};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReceiveBody {
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
}

/// GET /api/receive?ref=X
pub async fn handle_receive_get(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Response, AppError> {
    let reference = query.as_deref().and_then(ref_from_query);
    capture(&state, reference)
}

/// POST /api/receive with `{"ref": "X"}`
pub async fn handle_receive_post(
    State(state): State<AppState>,
    body: Result<Json<ReceiveBody>, JsonRejection>,
) -> Result<Response, AppError> {
    let reference = match body {
        Ok(Json(body)) => body.reference.filter(|r| !r.is_empty()),
        Err(e) => {
            warn!("Unparsable capture body: {e}");
            None
        }
    };
    capture(&state, reference)
}

/// Redirects to the landing page carrying the ref and persists it as a cookie.
fn capture(state: &AppState, reference: Option<String>) -> Result<Response, AppError> {
    let reference = reference.ok_or(AppError::MissingRef)?;

    let query = serde_urlencoded::to_string([(REF_PARAM, reference.as_str())])
        .context("Failed to encode ref into redirect location")?;
    let mut response = Redirect::temporary(&format!("/?{query}")).into_response();

    if let Some(cookie) = state.cookie_policy.set_cookie(&reference) {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }

    info!("Captured ref '{reference}'");
    Ok(response)
}
