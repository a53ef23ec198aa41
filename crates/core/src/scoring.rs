//! Syndrome scoring.
//!
//! Pure and deterministic given fixed catalog data: every active syndrome starts at zero,
//! collects the weights of its relation rows for the selected symptoms, receives the
//! high-intensity answer bonus, and is clamped to `0..=100`.
//!
//! The answer bonus is added to *every* syndrome alike. It cannot tell syndromes apart and
//! only matters when other scores are close, yet it can lift a syndrome with no symptom
//! support above zero. That is existing behaviour and is kept as is.
//!
//! Equal scores keep catalog order. Callers must not rely on that; ties are unordered by
//! contract.

use crate::catalog::Syndrome;
use crate::constants::{HIGH_INTENSITY_ANSWER_BONUS, HIGH_INTENSITY_THRESHOLD, MAX_SYNDROMES};
use crate::diagnosis::{Answer, AnswerValue};
use crate::relations::SymptomRelation;
use herbdx_types::MatchScore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A syndrome that scored above zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyndromeMatch {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub match_score: MatchScore,
    /// Names of symptoms found in the syndrome's characteristics, in selection order.
    pub evidences: Vec<String>,
}

/// Bonus added to every syndrome: [`HIGH_INTENSITY_ANSWER_BONUS`] per numeric answer at or
/// above [`HIGH_INTENSITY_THRESHOLD`]. Label answers never count.
pub fn high_intensity_bonus(answers: &[Answer]) -> u32 {
    let count = answers
        .iter()
        .filter(|a| matches!(a.value, AnswerValue::Number(n) if n >= HIGH_INTENSITY_THRESHOLD))
        .count();
    HIGH_INTENSITY_ANSWER_BONUS.saturating_mul(u32::try_from(count).unwrap_or(u32::MAX))
}

/// Score `syndromes` and return the top [`MAX_SYNDROMES`] with a positive score, best first.
///
/// `relations` must come from the selected symptoms; rows for syndromes not in `syndromes`
/// are ignored.
pub fn score_syndromes(
    syndromes: &[Syndrome],
    relations: &[SymptomRelation],
    answers: &[Answer],
) -> Vec<SyndromeMatch> {
    let bonus = i64::from(high_intensity_bonus(answers));

    let position: HashMap<&str, usize> = syndromes
        .iter()
        .enumerate()
        .map(|(i, s)| (s.id.as_str(), i))
        .collect();

    let mut raw = vec![bonus; syndromes.len()];
    let mut evidences: Vec<Vec<String>> = vec![Vec::new(); syndromes.len()];

    for relation in relations {
        let Some(&i) = position.get(relation.syndrome_id.as_str()) else {
            continue;
        };
        raw[i] += i64::from(relation.weight());
        if relation.kind.records_evidence() {
            evidences[i].push(relation.symptom_name.clone());
        }
    }

    let mut matches: Vec<SyndromeMatch> = syndromes
        .iter()
        .zip(raw)
        .zip(evidences)
        .map(|((syndrome, raw), evidences)| SyndromeMatch {
            id: syndrome.id.clone(),
            name: syndrome.name.to_string(),
            description: syndrome.description.clone(),
            match_score: MatchScore::clamped(raw),
            evidences,
        })
        .filter(|m| m.match_score.is_positive())
        .collect();

    matches.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    matches.truncate(MAX_SYNDROMES);
    matches
}
