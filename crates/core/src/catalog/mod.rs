//! Catalog of symptoms, questions, syndromes, treatment axes, and herbs.
//!
//! The diagnosis pipeline only ever reads the catalog. Administration of its contents happens
//! elsewhere; here the catalog is a contract ([`CatalogReader`]) plus the structured value types
//! it hands out.

mod memory;

pub use memory::{CatalogFile, CatalogSummary, InMemoryCatalog};

use crate::error::CatalogResult;
use crate::relations::SymptomRelation;
use async_trait::async_trait;
use herbdx_types::NonEmptyText;
use serde::{Deserialize, Serialize};

fn default_active() -> bool {
    true
}

fn default_relevance() -> f64 {
    1.0
}

/// A discrete patient-reported complaint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symptom {
    pub id: String,
    pub name: NonEmptyText,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub display_order: u32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// One selectable option of a radio question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadioOption {
    #[serde(deserialize_with = "string_or_number")]
    pub value: String,
    pub label: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Integer(i) => i.to_string(),
        Raw::Float(f) => f.to_string(),
    })
}

/// How a question is answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QuestionKind {
    Radio { options: Vec<RadioOption> },
    Slider { min: i64, max: i64 },
}

impl QuestionKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            QuestionKind::Radio { .. } => "radio",
            QuestionKind::Slider { .. } => "slider",
        }
    }
}

/// A questionnaire item. `symptom_id == None` marks a universal question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(default)]
    pub symptom_id: Option<String>,
    pub text: NonEmptyText,
    #[serde(flatten)]
    pub kind: QuestionKind,
    #[serde(default)]
    pub display_order: u32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Structured reading of a syndrome's characteristics, when it has that shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyndromeProfile {
    #[serde(default)]
    pub primary_symptoms: Vec<String>,
    #[serde(default)]
    pub tongue: Option<String>,
    #[serde(default)]
    pub pulse: Option<String>,
}

/// A syndrome's characteristics: the text corpus that symptom names are matched against, plus
/// its structured profile when the source was a mapping (or a JSON object string).
///
/// A mapping's corpus is its compact JSON rendering, so matching sees the same text whether
/// the catalog author wrote a mapping or a pre-serialised string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "CharacteristicsRepr")]
pub struct Characteristics {
    corpus: String,
    profile: Option<SyndromeProfile>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CharacteristicsRepr {
    Text(String),
    Structured(serde_json::Value),
}

impl TryFrom<CharacteristicsRepr> for Characteristics {
    type Error = serde_json::Error;

    fn try_from(repr: CharacteristicsRepr) -> Result<Self, Self::Error> {
        match repr {
            CharacteristicsRepr::Text(corpus) => Ok(Self::from_text(corpus)),
            CharacteristicsRepr::Structured(value) => {
                let corpus = serde_json::to_string(&value)?;
                let profile = serde_json::from_value(value).ok();
                Ok(Self { corpus, profile })
            }
        }
    }
}

impl Characteristics {
    pub fn from_text(corpus: impl Into<String>) -> Self {
        let corpus = corpus.into();
        let profile = serde_json::from_str(&corpus).ok();
        Self { corpus, profile }
    }

    pub fn corpus(&self) -> &str {
        &self.corpus
    }

    pub fn profile(&self) -> Option<&SyndromeProfile> {
        self.profile.as_ref()
    }
}

/// A named traditional-medicine pattern (변증).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Syndrome {
    pub id: String,
    pub name: NonEmptyText,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub characteristics: Option<Characteristics>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// A therapeutic direction (치료축) owned by one syndrome.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TreatmentAxis {
    pub id: String,
    pub syndrome_id: String,
    pub name: NonEmptyText,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub display_order: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Herb {
    pub id: String,
    pub name: NonEmptyText,
    #[serde(default)]
    pub scientific_name: Option<String>,
    #[serde(default)]
    pub effect: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Many-to-many link between a syndrome and a herb.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SyndromeHerbLink {
    pub syndrome_id: String,
    pub herb_id: String,
    #[serde(default = "default_relevance")]
    pub relevance_score: f64,
    #[serde(default)]
    pub evidence: Option<String>,
    #[serde(default)]
    pub reference_url: Option<String>,
}

/// A syndrome–herb link joined with its (active) herb.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedHerb {
    pub syndrome_id: String,
    pub herb_id: String,
    pub name: String,
    pub scientific_name: Option<String>,
    pub effect: Option<String>,
    pub relevance_score: f64,
    pub evidence: Option<String>,
    pub reference_url: Option<String>,
}

/// Read-only access to the active catalog.
///
/// Empty results are "no data", never errors. Errors mean the catalog itself could not be
/// consulted.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// Active symptoms, optionally restricted to one category, in display order.
    async fn active_symptoms(&self, category: Option<&str>) -> CatalogResult<Vec<Symptom>>;

    /// Active questions in display order. With a symptom id, only that symptom's questions
    /// and universal questions are returned.
    async fn active_questions(&self, symptom_id: Option<&str>) -> CatalogResult<Vec<Question>>;

    /// Resolve symptom ids regardless of active state, in request order. Unknown ids are
    /// skipped and repeated ids collapse to one entry.
    async fn symptoms_by_ids(&self, ids: &[String]) -> CatalogResult<Vec<Symptom>>;

    async fn active_syndromes(&self) -> CatalogResult<Vec<Syndrome>>;

    /// Rows of the symptom↔syndrome relation table for the given symptoms, grouped by symptom
    /// in the order given.
    async fn symptom_relations(&self, symptom_ids: &[String])
        -> CatalogResult<Vec<SymptomRelation>>;

    /// Axes owned by any of the given syndromes, in display order.
    async fn treatment_axes_for_syndromes(
        &self,
        syndrome_ids: &[String],
    ) -> CatalogResult<Vec<TreatmentAxis>>;

    /// Links from any of the given syndromes to active herbs.
    async fn herb_links_for_syndromes(&self, syndrome_ids: &[String])
        -> CatalogResult<Vec<LinkedHerb>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_characteristics_from_mapping_renders_json_corpus() {
        let yaml = r#"
primarySymptoms: [피로, 무기력]
tongue: 담백설
pulse: 약맥
"#;
        let c: Characteristics = serde_yaml::from_str(yaml).unwrap();

        assert!(c.corpus().contains("\"피로\""));
        assert!(c.corpus().contains("담백설"));
        let profile = c.profile().unwrap();
        assert_eq!(profile.primary_symptoms, vec!["피로", "무기력"]);
        assert_eq!(profile.pulse.as_deref(), Some("약맥"));
    }

    #[test]
    fn test_characteristics_from_free_text() {
        let c: Characteristics = serde_yaml::from_str("'두통과 어지러움이 잦음'").unwrap();

        assert_eq!(c.corpus(), "두통과 어지러움이 잦음");
        assert!(c.profile().is_none());
    }

    #[test]
    fn test_characteristics_from_json_string_keeps_text_and_profile() {
        let c = Characteristics::from_text(r#"{"primarySymptoms":["가래"],"pulse":"활맥"}"#);

        assert_eq!(c.corpus(), r#"{"primarySymptoms":["가래"],"pulse":"활맥"}"#);
        assert_eq!(c.profile().unwrap().primary_symptoms, vec!["가래"]);
    }

    #[test]
    fn test_question_kind_is_tagged() {
        let yaml = r#"
id: q-sleep
text: 수면의 질은 어떤가요?
type: slider
min: 0
max: 10
"#;
        let q: Question = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(q.kind, QuestionKind::Slider { min: 0, max: 10 });
        assert_eq!(q.kind.type_name(), "slider");
        assert!(q.symptom_id.is_none());
        assert!(q.is_active);
    }

    #[test]
    fn test_radio_option_values_accept_numbers() {
        let yaml = r#"
id: q-appetite
text: 식욕은 어떤 편인가요?
type: radio
options:
  - { value: 1, label: 매우 좋음 }
  - { value: "2", label: 보통 }
"#;
        let q: Question = serde_yaml::from_str(yaml).unwrap();

        match q.kind {
            QuestionKind::Radio { options } => {
                assert_eq!(options[0].value, "1");
                assert_eq!(options[1].value, "2");
            }
            other => panic!("expected radio question, got {:?}", other),
        }
    }

    #[test]
    fn test_link_relevance_defaults_to_one() {
        let link: SyndromeHerbLink =
            serde_yaml::from_str("{ syndrome_id: s1, herb_id: h1 }").unwrap();
        assert_eq!(link.relevance_score, 1.0);
    }
}
