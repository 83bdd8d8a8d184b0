//! GreetingPresenter — the personalized welcome shown before the chat starts.
//!
//! `present` is a pure function of the ref; callers re-run it whenever the
//! ref changes. Rendering to text is separate so the same fields can feed the
//! HTML page and the JSON API.

pub mod handlers;
pub mod page;

use serde::Serialize;

use crate::composer::prompts::DEFAULT_AGENT_NAME;
use crate::referrals::RefStore;

/// Ref used when the caller supplies none.
pub const FALLBACK_GREETING_REF: &str = "REF123";

/// Placeholder for every field of an unknown ref.
pub const NOT_AVAILABLE_PT: &str = "não disponível";

const WELCOME: &str = "Bem-vindo ao nosso sistema imobiliário premium! \
    Estou aqui para ajudá-lo a encontrar as melhores oportunidades.";

/// Reveal delays for the four greeting lines, in order.
const REVEAL_DELAYS_MS: [u32; 4] = [300, 500, 700, 900];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayFields {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub experience: Option<String>,
    pub property_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Headline,
    Contact,
    Portfolio,
    Welcome,
}

/// One line of the greeting, with the delay before it is revealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GreetingLine {
    pub kind: LineKind,
    pub text: String,
    pub delay_ms: u32,
}

pub struct GreetingPresenter<'a> {
    store: &'a RefStore,
}

impl<'a> GreetingPresenter<'a> {
    pub fn new(store: &'a RefStore) -> Self {
        Self { store }
    }

    /// Derives the display fields for `reference`, defaulting to
    /// `FALLBACK_GREETING_REF`. An unknown ref yields placeholder text.
    pub fn present(&self, reference: Option<&str>) -> DisplayFields {
        let reference = reference.unwrap_or(FALLBACK_GREETING_REF);

        match self.store.lookup(reference) {
            Some(record) => {
                let contact = record.contact.as_ref();
                DisplayFields {
                    name: record.name.clone(),
                    email: contact.map(|c| c.email.clone()),
                    phone: contact.map(|c| c.phone.clone()),
                    experience: record.profile.as_ref().map(|p| p.experience.clone()),
                    property_count: record.property_count(),
                }
            }
            None => DisplayFields {
                name: DEFAULT_AGENT_NAME.to_string(),
                email: Some(NOT_AVAILABLE_PT.to_string()),
                phone: Some(NOT_AVAILABLE_PT.to_string()),
                experience: Some(NOT_AVAILABLE_PT.to_string()),
                property_count: 0,
            },
        }
    }
}

/// Renders the four greeting lines: headline, contact, portfolio, welcome.
pub fn render_lines(fields: &DisplayFields) -> Vec<GreetingLine> {
    let name = if fields.name.is_empty() {
        DEFAULT_AGENT_NAME
    } else {
        fields.name.as_str()
    };

    let texts = [
        (LineKind::Headline, format!("Olá, sou {name}!")),
        (LineKind::Contact, contact_sentence(fields)),
        (
            LineKind::Portfolio,
            format!(
                "Atualmente possuo {} propriedades em carteira.",
                fields.property_count
            ),
        ),
        (LineKind::Welcome, WELCOME.to_string()),
    ];

    texts
        .into_iter()
        .zip(REVEAL_DELAYS_MS)
        .map(|((kind, text), delay_ms)| GreetingLine {
            kind,
            text,
            delay_ms,
        })
        .collect()
}

/// Each clause is dropped when its value is missing or empty; "e" joins them
/// only when both are present.
fn contact_sentence(fields: &DisplayFields) -> String {
    let present = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());
    let email = present(&fields.email).map(|e| format!("email {e}"));
    let phone = present(&fields.phone).map(|p| format!("telefone {p}"));

    let clauses = match (email, phone) {
        (Some(e), Some(p)) => format!(" {e} e {p}"),
        (Some(one), None) | (None, Some(one)) => format!(" {one}"),
        (None, None) => String::new(),
    };
    format!("Posso ser contactado pelo{clauses}.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::referrals::store::fixtures::{default_json, empty_store, sample_store};

    fn fields(email: Option<&str>, phone: Option<&str>) -> DisplayFields {
        DisplayFields {
            name: "Ana".into(),
            email: email.map(str::to_string),
            phone: phone.map(str::to_string),
            experience: None,
            property_count: 0,
        }
    }

    #[test]
    fn test_known_ref_extracts_fields() {
        let store = sample_store();
        let fields = GreetingPresenter::new(&store).present(Some("REF123"));
        assert_eq!(fields.name, "Ana Silva");
        assert_eq!(fields.email.as_deref(), Some("ana@gluks.pt"));
        assert_eq!(fields.phone.as_deref(), Some("+351 911"));
        assert_eq!(fields.experience.as_deref(), Some("12 anos"));
        assert_eq!(fields.property_count, 3);
    }

    #[test]
    fn test_no_ref_defaults_to_fallback_ref() {
        let store = sample_store();
        let presenter = GreetingPresenter::new(&store);
        assert_eq!(presenter.present(None), presenter.present(Some("REF123")));
    }

    #[test]
    fn test_unknown_ref_uses_placeholders() {
        let store = sample_store();
        let fields = GreetingPresenter::new(&store).present(Some("NOPE"));
        assert_eq!(fields.name, "Gluks");
        assert_eq!(fields.email.as_deref(), Some(NOT_AVAILABLE_PT));
        assert_eq!(fields.phone.as_deref(), Some(NOT_AVAILABLE_PT));
        assert_eq!(fields.experience.as_deref(), Some(NOT_AVAILABLE_PT));
        assert_eq!(fields.property_count, 0);
    }

    #[test]
    fn test_unknown_ref_matches_no_ref_when_fallback_is_absent() {
        let store = empty_store();
        let presenter = GreetingPresenter::new(&store);
        assert_eq!(presenter.present(Some("NOPE")), presenter.present(None));
    }

    #[test]
    fn test_record_with_malformed_fields_still_greets_by_name() {
        let mut refs = serde_json::Map::new();
        refs.insert(
            "ANA".into(),
            serde_json::json!({
                "name": "Ana Silva",
                "contact": { "phone": null, "email": "ana@gluks.pt" },
                "properties": [
                    { "id": "p1", "title": "T2" },
                    {
                        "id": "p2", "title": "T3", "type": "apartment",
                        "price": 400000, "currency": "EUR", "sqft": 1100,
                        "address": "Rua B", "status": "available"
                    },
                    {
                        "id": "p3", "title": "T1", "type": "apartment",
                        "price": 200000, "currency": "EUR", "sqft": 500,
                        "address": "Rua C", "status": "sold"
                    }
                ]
            }),
        );
        let store = RefStore::new(default_json(), refs).unwrap();

        let fields = GreetingPresenter::new(&store).present(Some("ANA"));
        assert_eq!(fields.name, "Ana Silva");
        assert_eq!(fields.email.as_deref(), Some("ana@gluks.pt"));
        assert_eq!(fields.property_count, 2);
        assert_eq!(
            contact_sentence(&fields),
            "Posso ser contactado pelo email ana@gluks.pt."
        );
    }

    #[test]
    fn test_record_without_properties_counts_zero() {
        let store = sample_store();
        let fields = GreetingPresenter::new(&store).present(Some("REF456"));
        assert_eq!(fields.property_count, 0);
        assert_eq!(fields.experience, None);
    }

    #[test]
    fn test_contact_sentence_variants() {
        assert_eq!(
            contact_sentence(&fields(Some("a@b.pt"), Some("911"))),
            "Posso ser contactado pelo email a@b.pt e telefone 911."
        );
        assert_eq!(
            contact_sentence(&fields(Some("a@b.pt"), None)),
            "Posso ser contactado pelo email a@b.pt."
        );
        assert_eq!(
            contact_sentence(&fields(None, Some("911"))),
            "Posso ser contactado pelo telefone 911."
        );
        assert_eq!(
            contact_sentence(&fields(Some(""), Some(""))),
            "Posso ser contactado pelo."
        );
    }

    #[test]
    fn test_render_lines_order_and_delays() {
        let store = sample_store();
        let lines = render_lines(&GreetingPresenter::new(&store).present(Some("REF123")));

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].text, "Olá, sou Ana Silva!");
        assert_eq!(lines[1].kind, LineKind::Contact);
        assert_eq!(lines[2].text, "Atualmente possuo 3 propriedades em carteira.");
        assert_eq!(lines[3].kind, LineKind::Welcome);
        let delays: Vec<u32> = lines.iter().map(|l| l.delay_ms).collect();
        assert_eq!(delays, vec![300, 500, 700, 900]);
    }

    #[test]
    fn test_empty_name_renders_generic_name() {
        let mut f = fields(None, None);
        f.name.clear();
        assert_eq!(render_lines(&f)[0].text, "Olá, sou Gluks!");
    }
}
