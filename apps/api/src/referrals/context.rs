//! Request-scoped ref propagation.
//!
//! `track_ref` resolves the ref once per request, stores it as a `RefContext`
//! extension for every downstream handler, and persists a ref that arrived in
//! the query string by appending the canonical `Set-Cookie` header.

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::referrals::resolver::{self, RefResolution};
use crate::state::AppState;

/// Path prefixes that never receive the ref cookie from the interceptor:
/// API routes and static assets.
const COOKIE_EXCLUDED_PREFIXES: &[&str] = &["api", "_next/static", "_next/image", "favicon.ico"];

/// The resolved ref for the current request, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefContext {
    value: Option<String>,
}

impl RefContext {
    pub fn new(value: Option<String>) -> Self {
        Self { value }
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl From<&RefResolution> for RefContext {
    fn from(resolution: &RefResolution) -> Self {
        Self::new(resolution.value.clone())
    }
}

/// Never rejects: a request that bypassed `track_ref` simply has no ref.
#[async_trait]
impl<S> FromRequestParts<S> for RefContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<RefContext>().cloned().unwrap_or_default())
    }
}

/// Middleware that resolves the ref and arranges cookie persistence.
pub async fn track_ref(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let resolution = resolver::resolve(req.uri().query(), req.headers());
    let persist_here = resolution.should_persist && !is_cookie_excluded(req.uri().path());

    req.extensions_mut().insert(RefContext::from(&resolution));
    let mut response = next.run(req).await;

    if persist_here {
        if let Some(value) = resolution.value.as_deref() {
            if let Some(cookie) = state.cookie_policy.set_cookie(value) {
                response.headers_mut().append(header::SET_COOKIE, cookie);
            }
        }
    }

    response
}

fn is_cookie_excluded(path: &str) -> bool {
    let path = path.trim_start_matches('/');
    COOKIE_EXCLUDED_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_are_not_excluded() {
        assert!(!is_cookie_excluded("/"));
        assert!(!is_cookie_excluded("/chat/123"));
    }

    #[test]
    fn test_api_and_assets_are_excluded() {
        assert!(is_cookie_excluded("/api/receive"));
        assert!(is_cookie_excluded("/_next/static/chunk.js"));
        assert!(is_cookie_excluded("/_next/image"));
        assert!(is_cookie_excluded("/favicon.ico"));
    }

    #[test]
    fn test_context_from_resolution() {
        let resolution = RefResolution {
            value: Some("REF1".into()),
            should_persist: true,
        };
        assert_eq!(RefContext::from(&resolution).value(), Some("REF1"));
        assert_eq!(RefContext::default().value(), None);
    }
}
