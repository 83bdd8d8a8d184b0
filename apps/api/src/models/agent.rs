use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::lenient;
use crate::models::referral::{Contact, ImageLinks, MarketReport, Profile, Property};

/// Per-model system prompt templates carried by the default record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemPromptTemplates {
    pub chat_model_reasoning: String,
    pub default: String,
}

/// Agent data as consumed by the prompt composer.
///
/// The global default record has this shape (template fields mandatory, profile
/// data optional), and so does the result of overlaying a referral record on it.
/// Profile data decodes tolerantly, like a referral record's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentData {
    pub name: String,
    pub artifacts_prompt: String,
    pub regular_prompt: String,
    pub code_prompt: String,
    pub sheet_prompt: String,
    pub update_document_prompt: String,
    pub update_document_code_prompt: String,
    pub update_document_sheet_prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get_request_prompt_from_hints: Option<String>,
    pub system_prompt: SystemPromptTemplates,

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

/// The fallback record used when no ref, or an unknown ref, is resolved.
pub type DefaultRecord = AgentData;

/// A default record with a referral record deep-merged over it.
pub type MergedAgentData = AgentData;
