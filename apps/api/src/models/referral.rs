use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::lenient;

/// Professional profile shown in prompts. Every field tolerates absence so a
/// partially specified profile can still be overlaid on the default one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub experience: String,
    #[serde(default, deserialize_with = "lenient::list")]
    pub languages: Vec<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub specialties: Vec<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub bio: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub email: String,
    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub whatsapp: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub linkedin: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub availability: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageLinks {
    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub profile_photo: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub avatar: Option<String>,
}

/// A listing in an agent's portfolio. A listing missing any of its core
/// fields is dropped from the portfolio rather than kept half-filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub price: f64,
    pub currency: String,
    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub bedrooms: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub bathrooms: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub units: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub avg_rent: Option<f64>,
    pub sqft: f64,
    pub address: String,
    #[serde(default, deserialize_with = "lenient::list")]
    pub features: Vec<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub images: Vec<String>,
    pub status: String,
    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub roi: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub cap_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketReport {
    pub title: String,
    pub date: String,
    pub url: String,
}

/// Per-ref personalization record. Only `name` is mandatory. Any other field
/// that is `null` or has the wrong shape is treated as absent, and invalid
/// list entries are dropped individually.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralRecord {
    pub name: String,
    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub greeting: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub regular_prompt: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub profile: Option<Profile>,
    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub contact: Option<Contact>,
    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub image: Option<ImageLinks>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub properties: Option<Vec<Property>>,
    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub performance: Option<Map<String, Value>>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub certifications: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub working_hours: Option<BTreeMap<String, String>>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub market_reports: Option<Vec<MarketReport>>,
}

impl ReferralRecord {
    /// Number of listings in the portfolio, zero when the record has none.
    pub fn property_count(&self) -> usize {
        self.properties.as_ref().map_or(0, Vec::len)
    }
}
