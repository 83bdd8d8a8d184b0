//! Geographic hints about where a request originated.

use std::borrow::Cow;

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

const LATITUDE_HEADER: &str = "x-vercel-ip-latitude";
const LONGITUDE_HEADER: &str = "x-vercel-ip-longitude";
const CITY_HEADER: &str = "x-vercel-ip-city";
const COUNTRY_HEADER: &str = "x-vercel-ip-country";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestHints {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

impl RequestHints {
    /// Reads the hints set by the edge network in front of the service.
    /// The city header is percent-encoded upstream and decoded here.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Self {
            latitude: get(LATITUDE_HEADER),
            longitude: get(LONGITUDE_HEADER),
            city: get(CITY_HEADER).map(|city| percent_decode(&city)),
            country: get(COUNTRY_HEADER),
        }
    }
}

fn percent_decode(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| raw.to_string())
}
