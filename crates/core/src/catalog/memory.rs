//! YAML-backed in-memory catalog.
//!
//! The whole catalog is loaded and validated once, at startup. Lookups afterwards are plain
//! slice/hash-map reads over an immutable snapshot, so the catalog can be shared across
//! concurrent requests behind an `Arc` without locking.

use super::{
    CatalogReader, Herb, LinkedHerb, Question, QuestionKind, Symptom, Syndrome, SyndromeHerbLink,
    TreatmentAxis,
};
use crate::error::{CatalogError, CatalogResult};
use crate::relations::{RelationIndex, SymptomRelation};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// On-disk shape of a catalog document.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub symptoms: Vec<Symptom>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub syndromes: Vec<Syndrome>,
    #[serde(default)]
    pub treatment_axes: Vec<TreatmentAxis>,
    #[serde(default)]
    pub herbs: Vec<Herb>,
    #[serde(default)]
    pub syndrome_herbs: Vec<SyndromeHerbLink>,
}

/// Entity counts of a loaded catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogSummary {
    pub symptoms: usize,
    pub questions: usize,
    pub syndromes: usize,
    pub active_syndromes: usize,
    pub treatment_axes: usize,
    pub herbs: usize,
    pub syndrome_herbs: usize,
    pub relations: usize,
}

#[derive(Debug)]
pub struct InMemoryCatalog {
    symptoms: Vec<Symptom>,
    symptom_index: HashMap<String, usize>,
    questions: Vec<Question>,
    syndromes: Vec<Syndrome>,
    treatment_axes: Vec<TreatmentAxis>,
    herbs: HashMap<String, Herb>,
    links: Vec<SyndromeHerbLink>,
    relations: RelationIndex,
    warnings: Vec<String>,
}

impl InMemoryCatalog {
    /// Load and validate a catalog YAML file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::FileRead` if the file cannot be read, or any validation error
    /// from [`InMemoryCatalog::from_catalog_file`].
    pub fn from_file(path: &Path) -> CatalogResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(yaml: &str) -> CatalogResult<Self> {
        let file: CatalogFile =
            serde_yaml::from_str(yaml).map_err(CatalogError::YamlDeserialization)?;
        Self::from_catalog_file(file)
    }

    /// Validate a parsed catalog and build its lookup structures.
    ///
    /// # Errors
    ///
    /// - `DuplicateId` when two entities of one kind share an id
    /// - `UnknownReference` when a question, axis, or link points at a missing entity
    /// - `InvalidEntry` for radio questions with fewer than two options, sliders whose bounds
    ///   are not increasing, or negative/non-finite relevance scores
    pub fn from_catalog_file(file: CatalogFile) -> CatalogResult<Self> {
        let CatalogFile {
            mut symptoms,
            mut questions,
            syndromes,
            mut treatment_axes,
            herbs,
            syndrome_herbs,
        } = file;

        ensure_unique("symptom", symptoms.iter().map(|s| s.id.as_str()))?;
        ensure_unique("question", questions.iter().map(|q| q.id.as_str()))?;
        ensure_unique("syndrome", syndromes.iter().map(|s| s.id.as_str()))?;
        ensure_unique("treatment axis", treatment_axes.iter().map(|a| a.id.as_str()))?;
        ensure_unique("herb", herbs.iter().map(|h| h.id.as_str()))?;

        let symptom_ids: HashSet<&str> = symptoms.iter().map(|s| s.id.as_str()).collect();
        let syndrome_ids: HashSet<&str> = syndromes.iter().map(|s| s.id.as_str()).collect();
        let herb_ids: HashSet<&str> = herbs.iter().map(|h| h.id.as_str()).collect();

        for question in &questions {
            if let Some(symptom_id) = &question.symptom_id {
                if !symptom_ids.contains(symptom_id.as_str()) {
                    return Err(unknown_reference("question", &question.id, "symptom", symptom_id));
                }
            }
            validate_question_kind(question)?;
        }

        for axis in &treatment_axes {
            if !syndrome_ids.contains(axis.syndrome_id.as_str()) {
                return Err(unknown_reference(
                    "treatment axis",
                    &axis.id,
                    "syndrome",
                    &axis.syndrome_id,
                ));
            }
        }

        let mut seen_links = HashSet::new();
        for link in &syndrome_herbs {
            let link_id = format!("{}→{}", link.syndrome_id, link.herb_id);
            if !syndrome_ids.contains(link.syndrome_id.as_str()) {
                return Err(unknown_reference(
                    "syndrome herb",
                    &link_id,
                    "syndrome",
                    &link.syndrome_id,
                ));
            }
            if !herb_ids.contains(link.herb_id.as_str()) {
                return Err(unknown_reference(
                    "syndrome herb",
                    &link_id,
                    "herb",
                    &link.herb_id,
                ));
            }
            if !link.relevance_score.is_finite() || link.relevance_score < 0.0 {
                return Err(CatalogError::InvalidEntry {
                    kind: "syndrome herb",
                    id: link_id,
                    reason: format!(
                        "relevance score must be a finite value >= 0, got {}",
                        link.relevance_score
                    ),
                });
            }
            if !seen_links.insert(link_id.clone()) {
                return Err(CatalogError::DuplicateId {
                    kind: "syndrome herb",
                    id: link_id,
                });
            }
        }

        let warnings = profile_warnings(&symptoms, &syndromes);

        // Stable sorts: equal display orders keep file order.
        symptoms.sort_by_key(|s| s.display_order);
        questions.sort_by_key(|q| q.display_order);
        treatment_axes.sort_by_key(|a| a.display_order);

        let active_syndromes: Vec<Syndrome> =
            syndromes.iter().filter(|s| s.is_active).cloned().collect();
        let relations = RelationIndex::build(&symptoms, &active_syndromes);

        let symptom_index = symptoms
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();
        let herbs = herbs.into_iter().map(|h| (h.id.clone(), h)).collect();

        Ok(Self {
            symptoms,
            symptom_index,
            questions,
            syndromes,
            treatment_axes,
            herbs,
            links: syndrome_herbs,
            relations,
            warnings,
        })
    }

    /// Non-fatal findings from loading, for operators.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn summary(&self) -> CatalogSummary {
        CatalogSummary {
            symptoms: self.symptoms.len(),
            questions: self.questions.len(),
            syndromes: self.syndromes.len(),
            active_syndromes: self.syndromes.iter().filter(|s| s.is_active).count(),
            treatment_axes: self.treatment_axes.len(),
            herbs: self.herbs.len(),
            syndrome_herbs: self.links.len(),
            relations: self.relations.len(),
        }
    }
}

fn ensure_unique<'a>(kind: &'static str, ids: impl Iterator<Item = &'a str>) -> CatalogResult<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if id.trim().is_empty() {
            return Err(CatalogError::InvalidEntry {
                kind,
                id: id.to_string(),
                reason: "id cannot be empty".into(),
            });
        }
        if !seen.insert(id) {
            return Err(CatalogError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

fn unknown_reference(
    kind: &'static str,
    id: &str,
    target: &'static str,
    reference: &str,
) -> CatalogError {
    CatalogError::UnknownReference {
        kind,
        id: id.to_string(),
        target,
        reference: reference.to_string(),
    }
}

fn validate_question_kind(question: &Question) -> CatalogResult<()> {
    let reason = match &question.kind {
        QuestionKind::Radio { options } if options.len() < 2 => Some(format!(
            "radio questions need at least 2 options, got {}",
            options.len()
        )),
        QuestionKind::Slider { min, max } if min >= max => Some(format!(
            "slider min ({}) must be less than max ({})",
            min, max
        )),
        _ => None,
    };

    match reason {
        Some(reason) => Err(CatalogError::InvalidEntry {
            kind: "question",
            id: question.id.clone(),
            reason,
        }),
        None => Ok(()),
    }
}

fn profile_warnings(symptoms: &[Symptom], syndromes: &[Syndrome]) -> Vec<String> {
    let names: HashSet<&str> = symptoms.iter().map(|s| s.name.as_str()).collect();
    let mut warnings = Vec::new();

    for syndrome in syndromes {
        let Some(profile) = syndrome.characteristics.as_ref().and_then(|c| c.profile()) else {
            continue;
        };
        for primary in &profile.primary_symptoms {
            if !names.contains(primary.as_str()) {
                warnings.push(format!(
                    "syndrome {} lists primary symptom '{}' which is not a catalog symptom",
                    syndrome.id, primary
                ));
            }
        }
    }

    warnings
}

fn id_set(ids: &[String]) -> HashSet<&str> {
    ids.iter().map(String::as_str).collect()
}

#[async_trait]
impl CatalogReader for InMemoryCatalog {
    async fn active_symptoms(&self, category: Option<&str>) -> CatalogResult<Vec<Symptom>> {
        Ok(self
            .symptoms
            .iter()
            .filter(|s| s.is_active)
            .filter(|s| category.map_or(true, |c| s.category.as_deref() == Some(c)))
            .cloned()
            .collect())
    }

    async fn active_questions(&self, symptom_id: Option<&str>) -> CatalogResult<Vec<Question>> {
        Ok(self
            .questions
            .iter()
            .filter(|q| q.is_active)
            .filter(|q| match (symptom_id, q.symptom_id.as_deref()) {
                (None, _) => true,
                (Some(_), None) => true,
                (Some(wanted), Some(owner)) => wanted == owner,
            })
            .cloned()
            .collect())
    }

    async fn symptoms_by_ids(&self, ids: &[String]) -> CatalogResult<Vec<Symptom>> {
        let mut seen = HashSet::new();
        Ok(ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .filter_map(|id| self.symptom_index.get(id))
            .map(|&i| self.symptoms[i].clone())
            .collect())
    }

    async fn active_syndromes(&self) -> CatalogResult<Vec<Syndrome>> {
        Ok(self
            .syndromes
            .iter()
            .filter(|s| s.is_active)
            .cloned()
            .collect())
    }

    async fn symptom_relations(
        &self,
        symptom_ids: &[String],
    ) -> CatalogResult<Vec<SymptomRelation>> {
        Ok(self.relations.relations_for(symptom_ids))
    }

    async fn treatment_axes_for_syndromes(
        &self,
        syndrome_ids: &[String],
    ) -> CatalogResult<Vec<TreatmentAxis>> {
        let wanted = id_set(syndrome_ids);
        Ok(self
            .treatment_axes
            .iter()
            .filter(|a| wanted.contains(a.syndrome_id.as_str()))
            .cloned()
            .collect())
    }

    async fn herb_links_for_syndromes(
        &self,
        syndrome_ids: &[String],
    ) -> CatalogResult<Vec<LinkedHerb>> {
        let wanted = id_set(syndrome_ids);
        Ok(self
            .links
            .iter()
            .filter(|l| wanted.contains(l.syndrome_id.as_str()))
            .filter_map(|l| {
                let herb = self.herbs.get(&l.herb_id).filter(|h| h.is_active)?;
                Some(LinkedHerb {
                    syndrome_id: l.syndrome_id.clone(),
                    herb_id: herb.id.clone(),
                    name: herb.name.to_string(),
                    scientific_name: herb.scientific_name.clone(),
                    effect: herb.effect.clone(),
                    relevance_score: l.relevance_score,
                    evidence: l.evidence.clone(),
                    reference_url: l.reference_url.clone(),
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relations::RelationKind;
    use crate::test_support::{ids, sample_catalog, SAMPLE_CATALOG_YAML};
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_active_symptoms_are_filtered_and_ordered() {
        let catalog = sample_catalog();

        let names: Vec<String> = catalog
            .active_symptoms(None)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name.to_string())
            .collect();

        assert_eq!(names, vec!["두통", "피로", "소화불량", "불면"]);
    }

    #[tokio::test]
    async fn test_active_symptoms_by_category() {
        let catalog = sample_catalog();

        let symptoms = catalog.active_symptoms(Some("소화기")).await.unwrap();
        assert_eq!(symptoms.len(), 1);
        assert_eq!(symptoms[0].id, "s-indigestion");

        assert!(catalog.active_symptoms(Some("없음")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_active_questions_include_universal_ones() {
        let catalog = sample_catalog();

        let all = catalog.active_questions(None).await.unwrap();
        assert_eq!(all.len(), 3);

        let for_headache: Vec<String> = catalog
            .active_questions(Some("s-headache"))
            .await
            .unwrap()
            .into_iter()
            .map(|q| q.id)
            .collect();
        assert_eq!(for_headache, vec!["q-fatigue", "q-headache-intensity", "q-sleep"]);

        let for_fatigue: Vec<String> = catalog
            .active_questions(Some("s-fatigue"))
            .await
            .unwrap()
            .into_iter()
            .map(|q| q.id)
            .collect();
        assert_eq!(for_fatigue, vec!["q-fatigue", "q-sleep"]);
    }

    #[tokio::test]
    async fn test_symptoms_by_ids_keeps_request_order_and_includes_inactive() {
        let catalog = sample_catalog();

        let resolved = catalog
            .symptoms_by_ids(&ids(&["s-retired", "s-fatigue", "missing", "s-fatigue"]))
            .await
            .unwrap();

        let got: Vec<&str> = resolved.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(got, vec!["s-retired", "s-fatigue"]);
    }

    #[tokio::test]
    async fn test_inactive_syndromes_have_no_relations() {
        let catalog = sample_catalog();

        let syndromes = catalog.active_syndromes().await.unwrap();
        assert!(syndromes.iter().all(|s| s.id != "retired-pattern"));

        let rows = catalog
            .symptom_relations(&ids(&["s-headache"]))
            .await
            .unwrap();
        assert!(rows.iter().all(|r| r.syndrome_id != "retired-pattern"));
        assert!(rows
            .iter()
            .any(|r| r.syndrome_id == "blood-stasis" && r.kind == RelationKind::Characteristic));
    }

    #[tokio::test]
    async fn test_herb_links_skip_inactive_herbs() {
        let catalog = sample_catalog();

        let links = catalog
            .herb_links_for_syndromes(&ids(&["qi-deficiency"]))
            .await
            .unwrap();

        let herbs: Vec<&str> = links.iter().map(|l| l.herb_id.as_str()).collect();
        assert_eq!(herbs, vec!["h-ginseng", "h-astragalus"]);
    }

    #[tokio::test]
    async fn test_treatment_axes_in_display_order() {
        let catalog = sample_catalog();

        let axes = catalog
            .treatment_axes_for_syndromes(&ids(&["blood-stasis", "qi-deficiency"]))
            .await
            .unwrap();

        let orders: Vec<u32> = axes.iter().map(|a| a.display_order).collect();
        let mut sorted = orders.clone();
        sorted.sort();
        assert_eq!(orders, sorted);
        assert!(axes.iter().all(|a| a.syndrome_id != "phlegm"));
    }

    #[test]
    fn test_summary_counts() {
        let summary = sample_catalog().summary();

        assert_eq!(summary.symptoms, 5);
        assert_eq!(summary.syndromes, 4);
        assert_eq!(summary.active_syndromes, 3);
        assert!(summary.relations > 0);
    }

    #[test]
    fn test_sample_yaml_parses() {
        assert!(InMemoryCatalog::from_yaml_str(SAMPLE_CATALOG_YAML).is_ok());
    }

    #[test]
    fn test_rejects_duplicate_symptom_ids() {
        let yaml = r#"
symptoms:
  - { id: s1, name: 두통 }
  - { id: s1, name: 피로 }
"#;
        let err = InMemoryCatalog::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId { kind: "symptom", .. }));
    }

    #[test]
    fn test_rejects_dangling_axis() {
        let yaml = r#"
treatment_axes:
  - { id: a1, syndrome_id: nowhere, name: 보기법 }
"#;
        let err = InMemoryCatalog::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownReference { target: "syndrome", .. }));
    }

    #[test]
    fn test_rejects_radio_with_single_option() {
        let yaml = r#"
questions:
  - id: q1
    text: 하나뿐?
    type: radio
    options:
      - { value: 1, label: 예 }
"#;
        let err = InMemoryCatalog::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidEntry { kind: "question", .. }));
    }

    #[test]
    fn test_rejects_inverted_slider() {
        let yaml = r#"
questions:
  - { id: q1, text: 강도, type: slider, min: 10, max: 0 }
"#;
        assert!(InMemoryCatalog::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_rejects_negative_relevance() {
        let yaml = r#"
syndromes:
  - { id: x, name: 기허 }
herbs:
  - { id: h, name: 인삼 }
syndrome_herbs:
  - { syndrome_id: x, herb_id: h, relevance_score: -1.0 }
"#;
        let err = InMemoryCatalog::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidEntry { kind: "syndrome herb", .. }));
    }

    #[test]
    fn test_rejects_blank_names() {
        let yaml = r#"
symptoms:
  - { id: s1, name: "   " }
"#;
        assert!(matches!(
            InMemoryCatalog::from_yaml_str(yaml),
            Err(CatalogError::YamlDeserialization(_))
        ));
    }

    #[test]
    fn test_warns_about_unknown_primary_symptoms() {
        let yaml = r#"
symptoms:
  - { id: s1, name: 피로 }
syndromes:
  - id: qi
    name: 기허
    characteristics:
      primarySymptoms: [피로, 호흡곤란]
"#;
        let catalog = InMemoryCatalog::from_yaml_str(yaml).unwrap();

        assert_eq!(catalog.warnings().len(), 1);
        assert!(catalog.warnings()[0].contains("호흡곤란"));
    }

    #[test]
    fn test_from_file_reports_missing_file() {
        let err = InMemoryCatalog::from_file(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, CatalogError::FileRead { .. }));
    }

    #[test]
    fn test_bundled_seed_catalog_loads() {
        let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        let seed = manifest_dir
            .ancestors()
            .map(|a| a.join(crate::constants::DEFAULT_CATALOG_PATH))
            .find(|p| p.is_file())
            .expect("seed catalog should exist in the workspace");

        let catalog = InMemoryCatalog::from_file(&seed).unwrap();
        assert!(catalog.summary().active_syndromes > 0);
    }
}
