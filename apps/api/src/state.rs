use std::sync::Arc;

use crate::llm_client::ChatModel;
use crate::referrals::resolver::CookiePolicy;
use crate::referrals::RefStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Read-only referral data, loaded once at startup.
    pub store: Arc<RefStore>,
    pub cookie_policy: CookiePolicy,
    /// `None` when no API key is configured; `/api/chat` then answers 503.
    pub chat: Option<Arc<dyn ChatModel>>,
}
