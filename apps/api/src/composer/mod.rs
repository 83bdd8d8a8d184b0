//! PromptComposer — builds the language-model prompts for the resolved ref.
//!
//! The referral record (if any) is deep-merged over the default record and
//! the merged data drives every prompt. An unknown ref and no ref at all take
//! the same default path, so their outputs are identical.

pub mod handlers;
pub mod hints;
pub mod merge;
pub mod prompts;

use serde::Serialize;
use tracing::warn;

use crate::composer::hints::RequestHints;
use crate::composer::merge::deep_merge;
use crate::composer::prompts::{
    AGENT_DATA_HEADER, DEFAULT_AGENT_NAME, NAME_MARKER, NOT_AVAILABLE, REASONING_MODEL,
    REQUEST_ORIGIN_HEADER, UNKNOWN_HINT,
};
use crate::models::agent::MergedAgentData;
use crate::referrals::RefStore;

/// Document kinds that can be revised through the update-document prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Text,
    Code,
    Sheet,
    Image,
}

impl ArtifactKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "text" => Some(Self::Text),
            "code" => Some(Self::Code),
            "sheet" => Some(Self::Sheet),
            "image" => Some(Self::Image),
            _ => None,
        }
    }
}

/// Every prompt variant for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposedPrompts {
    pub system_prompt: String,
    pub code_prompt: String,
    pub sheet_prompt: String,
    pub location_hint: String,
}

pub struct PromptComposer<'a> {
    store: &'a RefStore,
}

impl<'a> PromptComposer<'a> {
    pub fn new(store: &'a RefStore) -> Self {
        Self { store }
    }

    /// Builds all prompt variants at once.
    pub fn compose(
        &self,
        reference: Option<&str>,
        selected_model: &str,
        hints: &RequestHints,
    ) -> ComposedPrompts {
        let data = self.merged_data(reference);
        ComposedPrompts {
            system_prompt: system_prompt_from(&data, selected_model, hints),
            location_hint: request_prompt_from(&data, hints),
            code_prompt: data.code_prompt,
            sheet_prompt: data.sheet_prompt,
        }
    }

    /// Returns the default record with the ref's record overlaid on it.
    ///
    /// When the referral record does not override the base prompt, the name
    /// marker in the default prompt is replaced with the referral's name.
    pub fn merged_data(&self, reference: Option<&str>) -> MergedAgentData {
        let Some(reference) = reference else {
            return self.default_data();
        };
        let (Some(record), Some(raw)) = (
            self.store.lookup(reference),
            self.store.lookup_raw(reference),
        ) else {
            return self.default_data();
        };

        let merged = deep_merge(self.store.default_raw(), raw);
        let mut data: MergedAgentData = match serde_json::from_value(merged) {
            Ok(data) => data,
            Err(e) => {
                warn!("Merged data for ref '{reference}' does not decode, using defaults: {e}");
                return self.default_data();
            }
        };

        if record.regular_prompt.as_deref().map_or(true, str::is_empty) {
            data.regular_prompt = substitute_name(&data.regular_prompt, &record.name);
        }
        data
    }

    fn default_data(&self) -> MergedAgentData {
        let mut data = self.store.default_record().clone();
        data.regular_prompt = substitute_name(&data.regular_prompt, DEFAULT_AGENT_NAME);
        data
    }

    /// Base prompt, agent data block and request origin block, followed by the
    /// artifacts prompt unless the reasoning model is selected.
    pub fn system_prompt(
        &self,
        selected_model: &str,
        hints: &RequestHints,
        reference: Option<&str>,
    ) -> String {
        system_prompt_from(&self.merged_data(reference), selected_model, hints)
    }

    /// The request origin block: geographic hints plus the agent's name.
    pub fn request_prompt(&self, hints: &RequestHints, reference: Option<&str>) -> String {
        request_prompt_from(&self.merged_data(reference), hints)
    }

    pub fn code_prompt(&self, reference: Option<&str>) -> String {
        self.merged_data(reference).code_prompt
    }

    pub fn sheet_prompt(&self, reference: Option<&str>) -> String {
        self.merged_data(reference).sheet_prompt
    }

    /// Instruction for revising an existing document of the given kind. The
    /// wording comes from the merged record, so a ref may override it. Kinds
    /// without a template yield an empty string.
    pub fn update_document_prompt(
        &self,
        current_content: Option<&str>,
        kind: Option<ArtifactKind>,
        reference: Option<&str>,
    ) -> String {
        let data = self.merged_data(reference);
        let template = match kind {
            Some(ArtifactKind::Text) => &data.update_document_prompt,
            Some(ArtifactKind::Code) => &data.update_document_code_prompt,
            Some(ArtifactKind::Sheet) => &data.update_document_sheet_prompt,
            Some(ArtifactKind::Image) | None => return String::new(),
        };
        format!("{template}\n\n{}", current_content.unwrap_or_default())
    }
}

fn substitute_name(prompt: &str, name: &str) -> String {
    prompt.replacen(NAME_MARKER, &format!("You are {name},"), 1)
}

fn system_prompt_from(data: &MergedAgentData, selected_model: &str, hints: &RequestHints) -> String {
    let mut prompt = format!(
        "{}\n\n{}\n\n{}",
        data.regular_prompt,
        agent_data_snippet(data),
        request_prompt_from(data, hints)
    );
    if selected_model != REASONING_MODEL {
        prompt.push_str("\n\n");
        prompt.push_str(&data.artifacts_prompt);
    }
    prompt
}

fn request_prompt_from(data: &MergedAgentData, hints: &RequestHints) -> String {
    let hint = |v: &Option<String>| v.clone().unwrap_or_else(|| UNKNOWN_HINT.to_string());
    format!(
        "\n{REQUEST_ORIGIN_HEADER}\n- lat: {}\n- lon: {}\n- city: {}\n- country: {}\n- Bot Name: {}\n",
        hint(&hints.latitude),
        hint(&hints.longitude),
        hint(&hints.city),
        hint(&hints.country),
        data.name,
    )
}

/// Verbatim agent data the model is told to rely on exclusively.
fn agent_data_snippet(data: &MergedAgentData) -> String {
    let profile = data.profile.as_ref();
    let contact = data.contact.as_ref();

    let properties = data
        .properties
        .iter()
        .flatten()
        .map(|p| format!("{} ({})", p.title, p.kind))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "\n{AGENT_DATA_HEADER}\n\
         Name: {}\n\
         Title: {}\n\
         Bio: {}\n\
         Experience: {}\n\
         Languages: {}\n\
         Specialties: {}\n\
         Email: {}\n\
         Phone: {}\n\
         WhatsApp: {}\n\
         LinkedIn: {}\n\
         Properties: {}\n",
        data.name,
        or_na(profile.map(|p| p.title.as_str())),
        or_na(profile.map(|p| p.bio.as_str())),
        or_na(profile.map(|p| p.experience.as_str())),
        or_na(profile.map(|p| p.languages.join(", ")).as_deref()),
        or_na(profile.map(|p| p.specialties.join(", ")).as_deref()),
        or_na(contact.map(|c| c.email.as_str())),
        or_na(contact.map(|c| c.phone.as_str())),
        or_na(contact.and_then(|c| c.whatsapp.as_deref())),
        or_na(contact.and_then(|c| c.linkedin.as_deref())),
        or_na(Some(properties.as_str())),
    )
}

fn or_na(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or(NOT_AVAILABLE)
}
