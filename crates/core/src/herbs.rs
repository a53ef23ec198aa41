//! Herb recommendation.

use crate::catalog::LinkedHerb;
use crate::constants::MAX_HERBS;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HerbRecommendation {
    pub id: String,
    pub name: String,
    pub scientific_name: Option<String>,
    pub effect: Option<String>,
    pub relevance_score: f64,
    pub evidence: Option<String>,
    pub reference_url: Option<String>,
}

impl From<LinkedHerb> for HerbRecommendation {
    fn from(link: LinkedHerb) -> Self {
        Self {
            id: link.herb_id,
            name: link.name,
            scientific_name: link.scientific_name,
            effect: link.effect,
            relevance_score: link.relevance_score,
            evidence: link.evidence,
            reference_url: link.reference_url,
        }
    }
}

/// Rank herb links from all matched syndromes together and keep the best [`MAX_HERBS`]
/// distinct herbs.
///
/// Links are sorted by relevance across syndromes, not per syndrome. A herb linked to several
/// matched syndromes is reported once, carrying its most relevant link. Equal relevance keeps
/// input order.
pub fn recommend_herbs(mut links: Vec<LinkedHerb>) -> Vec<HerbRecommendation> {
    links.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));

    let mut seen = HashSet::new();
    links
        .into_iter()
        .filter(|l| seen.insert(l.herb_id.clone()))
        .take(MAX_HERBS)
        .map(HerbRecommendation::from)
        .collect()
}
