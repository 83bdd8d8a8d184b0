//! RefResolver — decides which ref a request carries and whether it should be
//! persisted in the `ref` cookie.
//!
//! Precedence: the first `ref` query parameter (when non-empty) wins and is
//! persisted; otherwise the `ref` cookie is used as-is; otherwise no ref.
//! Resolution is a pure function of the query string and headers.
//!
//! Cookie values are percent-encoded on write and decoded on read, so any
//! string can be carried as a ref.

use std::time::Duration;

use axum::http::{header, HeaderMap, HeaderValue};
use tracing::{debug, warn};

pub const REF_COOKIE: &str = "ref";
pub const REF_PARAM: &str = "ref";

/// Outcome of resolving a request's ref.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefResolution {
    pub value: Option<String>,
    pub should_persist: bool,
}

/// Resolves the ref from a raw query string (without the leading `?`) and the
/// request headers.
pub fn resolve(query: Option<&str>, headers: &HeaderMap) -> RefResolution {
    if let Some(value) = query.and_then(ref_from_query) {
        debug!("Resolved ref '{value}' from query string");
        return RefResolution {
            value: Some(value),
            should_persist: true,
        };
    }

    let value = ref_from_cookies(headers);
    if let Some(v) = &value {
        debug!("Resolved ref '{v}' from cookie");
    }
    RefResolution {
        value,
        should_persist: false,
    }
}

/// Returns the first `ref` query parameter, or `None` if it is missing or empty.
/// Later occurrences never override the first one.
pub fn ref_from_query(query: &str) -> Option<String> {
    let pairs: Vec<(String, String)> = match serde_urlencoded::from_str(query) {
        Ok(pairs) => pairs,
        Err(e) => {
            warn!("Ignoring unparsable query string: {e}");
            return None;
        }
    };

    pairs
        .into_iter()
        .find(|(key, _)| key == REF_PARAM)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// Reads the `ref` cookie across every `Cookie` header and percent-decodes it.
/// A header that is not valid UTF-8 is skipped with a warning rather than
/// failing the request; an undecodable value is used as sent.
pub fn ref_from_cookies(headers: &HeaderMap) -> Option<String> {
    for header_value in headers.get_all(header::COOKIE) {
        let raw = match header_value.to_str() {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Ignoring malformed Cookie header: {e}");
                continue;
            }
        };

        let found = raw
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| name.trim() == REF_COOKIE)
            .map(|(_, value)| value.trim().trim_matches('"'));

        if let Some(value) = found {
            return (!value.is_empty()).then(|| decode_cookie_value(value));
        }
    }
    None
}

/// The single cookie policy applied wherever the ref is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookiePolicy {
    pub max_age: Duration,
    pub secure: bool,
}

impl CookiePolicy {
    pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(60 * 60 * 24 * 365);

    pub fn new(max_age: Duration, secure: bool) -> Self {
        Self { max_age, secure }
    }

    /// Builds the `Set-Cookie` value for `value`, percent-encoding it.
    pub fn set_cookie(&self, value: &str) -> Option<HeaderValue> {
        let mut cookie = format!(
            "{REF_COOKIE}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
            urlencoding::encode(value),
            self.max_age.as_secs()
        );
        if self.secure {
            cookie.push_str("; Secure");
        }

        match HeaderValue::from_str(&cookie) {
            Ok(header) => Some(header),
            Err(e) => {
                warn!("Not persisting ref '{value}': {e}");
                None
            }
        }
    }
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_AGE, false)
    }
}

fn decode_cookie_value(value: &str) -> String {
    match urlencoding::decode(value) {
        Ok(decoded) => decoded.into_owned(),
        Err(e) => {
            warn!("Using undecodable ref cookie as sent: {e}");
            value.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookie_headers(values: &[&str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for v in values {
            headers.append(header::COOKIE, HeaderValue::from_str(v).unwrap());
        }
        headers
    }

    #[test]
    fn test_query_ref_without_cookie_is_persisted() {
        let resolution = resolve(Some("ref=REF123"), &HeaderMap::new());
        assert_eq!(resolution.value.as_deref(), Some("REF123"));
        assert!(resolution.should_persist);
    }

    #[test]
    fn test_cookie_ref_without_query_is_not_persisted() {
        let resolution = resolve(None, &cookie_headers(&["ref=REF456"]));
        assert_eq!(resolution.value.as_deref(), Some("REF456"));
        assert!(!resolution.should_persist);
    }

    #[test]
    fn test_nothing_resolves_to_none() {
        let resolution = resolve(Some("utm_source=x"), &HeaderMap::new());
        assert_eq!(resolution, RefResolution::default());
    }

    #[test]
    fn test_query_wins_over_cookie() {
        let resolution = resolve(Some("ref=NEW"), &cookie_headers(&["ref=OLD"]));
        assert_eq!(resolution.value.as_deref(), Some("NEW"));
        assert!(resolution.should_persist);
    }

    #[test]
    fn test_empty_query_ref_falls_back_to_cookie() {
        let resolution = resolve(Some("ref="), &cookie_headers(&["ref=OLD"]));
        assert_eq!(resolution.value.as_deref(), Some("OLD"));
        assert!(!resolution.should_persist);
    }

    #[test]
    fn test_repeated_query_param_takes_first_occurrence() {
        assert_eq!(ref_from_query("ref=A&ref=B").as_deref(), Some("A"));
        assert_eq!(ref_from_query("x=1&ref=B&ref=A").as_deref(), Some("B"));
    }

    #[test]
    fn test_query_value_is_percent_decoded() {
        assert_eq!(ref_from_query("ref=Jo%C3%A3o+S").as_deref(), Some("João S"));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let headers = cookie_headers(&["theme=dark; ref=REF456"]);
        let first = resolve(Some("ref=REF123"), &headers);
        let second = resolve(Some("ref=REF123"), &headers);
        assert_eq!(first, second);

        let first = resolve(None, &headers);
        let second = resolve(None, &headers);
        assert_eq!(first, second);
    }

    #[test]
    fn test_cookie_found_among_others_and_across_headers() {
        let headers = cookie_headers(&["theme=dark", "session=abc; ref=REF9 ; lang=pt"]);
        assert_eq!(ref_from_cookies(&headers).as_deref(), Some("REF9"));
    }

    #[test]
    fn test_cookie_name_must_match_exactly() {
        let headers = cookie_headers(&["referrer=x; myref=y"]);
        assert_eq!(ref_from_cookies(&headers), None);
    }

    #[test]
    fn test_non_utf8_cookie_header_degrades_to_none() {
        let mut headers = HeaderMap::new();
        headers.append(
            header::COOKIE,
            HeaderValue::from_bytes(b"ref=\xff\xfe").unwrap(),
        );
        assert_eq!(ref_from_cookies(&headers), None);
        assert_eq!(resolve(None, &headers), RefResolution::default());
    }

    #[test]
    fn test_set_cookie_uses_canonical_attributes() {
        let policy = CookiePolicy::default();
        let value = policy.set_cookie("REF123").unwrap();
        assert_eq!(
            value.to_str().unwrap(),
            "ref=REF123; Path=/; Max-Age=31536000; HttpOnly; SameSite=Lax"
        );
    }

    #[test]
    fn test_set_cookie_marks_secure_in_production() {
        let policy = CookiePolicy::new(CookiePolicy::DEFAULT_MAX_AGE, true);
        let value = policy.set_cookie("REF123").unwrap();
        assert!(value.to_str().unwrap().ends_with("; Secure"));
    }

    #[test]
    fn test_set_cookie_percent_encodes_any_ref() {
        let policy = CookiePolicy::default();
        let value = policy.set_cookie("João Silva").unwrap();
        assert!(value
            .to_str()
            .unwrap()
            .starts_with("ref=Jo%C3%A3o%20Silva; Path=/;"));
        let value = policy.set_cookie("a;b=c").unwrap();
        assert!(value.to_str().unwrap().starts_with("ref=a%3Bb%3Dc;"));
    }

    #[test]
    fn test_written_cookie_reads_back_unchanged() {
        let policy = CookiePolicy::default();
        for reference in ["REF123", "João Silva", "a;b=c", "100% \"quoted\""] {
            let set_cookie = policy.set_cookie(reference).unwrap();
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap().to_string();
            let headers = cookie_headers(&[&pair]);
            assert_eq!(ref_from_cookies(&headers).as_deref(), Some(reference));
        }
    }

    #[test]
    fn test_invalid_percent_sequence_is_used_as_sent() {
        let headers = cookie_headers(&["ref=%FF%FE"]);
        assert_eq!(ref_from_cookies(&headers).as_deref(), Some("%FF%FE"));
    }
}
