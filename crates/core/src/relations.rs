//! Symptom↔syndrome relation table.
//!
//! Every (symptom, active syndrome) pair is evaluated once when the catalog is loaded and the
//! contributing pairs are stored as tagged, weighted rows. Scoring then reads rows by symptom id
//! instead of searching syndrome text on every request.
//!
//! Known limitation: a `Characteristic` row exists whenever the symptom name is a case-sensitive
//! substring of the syndrome's characteristics corpus. Prose edits to the corpus can add or drop
//! rows silently, and short names can match inside unrelated words.

use crate::catalog::{Symptom, Syndrome};
use crate::constants::{CATEGORY_MATCH_WEIGHT, CHARACTERISTIC_MATCH_WEIGHT};
use std::collections::{HashMap, HashSet};

/// Why a symptom contributes to a syndrome's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// The symptom name occurs in the syndrome's characteristics corpus.
    Characteristic,
    /// The symptom and the syndrome share a category.
    Category,
}

impl RelationKind {
    pub fn weight(self) -> u32 {
        match self {
            RelationKind::Characteristic => CHARACTERISTIC_MATCH_WEIGHT,
            RelationKind::Category => CATEGORY_MATCH_WEIGHT,
        }
    }

    /// Only characteristic matches are cited as evidence; category matches add score silently.
    pub fn records_evidence(self) -> bool {
        matches!(self, RelationKind::Characteristic)
    }
}

/// One row of the relation table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymptomRelation {
    pub symptom_id: String,
    pub symptom_name: String,
    pub syndrome_id: String,
    pub kind: RelationKind,
}

impl SymptomRelation {
    pub fn weight(&self) -> u32 {
        self.kind.weight()
    }
}

/// Relation rows indexed by symptom id.
#[derive(Debug, Clone, Default)]
pub struct RelationIndex {
    by_symptom: HashMap<String, Vec<SymptomRelation>>,
}

impl RelationIndex {
    /// Build the table from all symptoms and the syndromes eligible for matching.
    ///
    /// Rows for one symptom follow the order of `syndromes`; a characteristic row precedes the
    /// category row of the same pair.
    pub fn build(symptoms: &[Symptom], syndromes: &[Syndrome]) -> Self {
        let mut by_symptom: HashMap<String, Vec<SymptomRelation>> = HashMap::new();

        for symptom in symptoms {
            let name = symptom.name.as_str();
            let mut rows = Vec::new();

            for syndrome in syndromes {
                let in_corpus = syndrome
                    .characteristics
                    .as_ref()
                    .is_some_and(|c| c.corpus().contains(name));
                if in_corpus {
                    rows.push(SymptomRelation {
                        symptom_id: symptom.id.clone(),
                        symptom_name: name.to_string(),
                        syndrome_id: syndrome.id.clone(),
                        kind: RelationKind::Characteristic,
                    });
                }

                let same_category = matches!(
                    (&symptom.category, &syndrome.category),
                    (Some(a), Some(b)) if a == b
                );
                if same_category {
                    rows.push(SymptomRelation {
                        symptom_id: symptom.id.clone(),
                        symptom_name: name.to_string(),
                        syndrome_id: syndrome.id.clone(),
                        kind: RelationKind::Category,
                    });
                }
            }

            if !rows.is_empty() {
                by_symptom.insert(symptom.id.clone(), rows);
            }
        }

        Self { by_symptom }
    }

    /// Rows for the given symptoms, grouped by symptom in the order given. Repeated ids are
    /// only expanded once.
    pub fn relations_for(&self, symptom_ids: &[String]) -> Vec<SymptomRelation> {
        let mut seen = HashSet::new();
        symptom_ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .filter_map(|id| self.by_symptom.get(id))
            .flat_map(|rows| rows.iter().cloned())
            .collect()
    }

    /// Total number of rows.
    pub fn len(&self) -> usize {
        self.by_symptom.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_symptom.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Characteristics;
    use herbdx_types::NonEmptyText;

    fn symptom(id: &str, name: &str, category: Option<&str>) -> Symptom {
        Symptom {
            id: id.into(),
            name: NonEmptyText::new(name).unwrap(),
            description: None,
            category: category.map(Into::into),
            display_order: 0,
            is_active: true,
        }
    }

    fn syndrome(id: &str, category: Option<&str>, corpus: Option<&str>) -> Syndrome {
        Syndrome {
            id: id.into(),
            name: NonEmptyText::new(id).unwrap(),
            description: None,
            category: category.map(Into::into),
            characteristics: corpus.map(Characteristics::from_text),
            is_active: true,
        }
    }

    #[test]
    fn test_substring_match_creates_characteristic_row() {
        let index = RelationIndex::build(
            &[symptom("s-headache", "두통", None)],
            &[syndrome("blood-stasis", None, Some("편두통, 어지러움"))],
        );

        let rows = index.relations_for(&["s-headache".to_string()]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kind, RelationKind::Characteristic);
        assert_eq!(rows[0].weight(), 30);
        assert_eq!(rows[0].symptom_name, "두통");
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let index = RelationIndex::build(
            &[symptom("s1", "Headache", None)],
            &[syndrome("x", None, Some("chronic headache"))],
        );

        assert!(index.is_empty());
    }

    #[test]
    fn test_category_row_has_no_evidence() {
        let index = RelationIndex::build(
            &[symptom("s-indigestion", "소화불량", Some("소화기"))],
            &[syndrome("spleen", Some("소화기"), None)],
        );

        let rows = index.relations_for(&["s-indigestion".to_string()]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kind, RelationKind::Category);
        assert_eq!(rows[0].weight(), 10);
        assert!(!rows[0].kind.records_evidence());
    }

    #[test]
    fn test_both_kinds_for_one_pair() {
        let index = RelationIndex::build(
            &[symptom("s-fatigue", "피로", Some("허증"))],
            &[syndrome("qi-def", Some("허증"), Some("피로, 무기력"))],
        );

        let kinds: Vec<RelationKind> = index
            .relations_for(&["s-fatigue".to_string()])
            .into_iter()
            .map(|r| r.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![RelationKind::Characteristic, RelationKind::Category]
        );
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_null_categories_never_match() {
        let index = RelationIndex::build(
            &[symptom("s1", "a", None)],
            &[syndrome("x", None, Some("zzz"))],
        );

        assert!(index.is_empty());
    }

    #[test]
    fn test_relations_for_keeps_request_order_and_skips_unknown_and_repeats() {
        let index = RelationIndex::build(
            &[
                symptom("s-a", "가래", None),
                symptom("s-b", "피로", None),
            ],
            &[syndrome("x", None, Some("가래 피로"))],
        );

        let ids = vec![
            "s-b".to_string(),
            "unknown".to_string(),
            "s-a".to_string(),
            "s-b".to_string(),
        ];
        let names: Vec<String> = index
            .relations_for(&ids)
            .into_iter()
            .map(|r| r.symptom_name)
            .collect();
        assert_eq!(names, vec!["피로", "가래"]);
    }
}
