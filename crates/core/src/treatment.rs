//! Treatment-axis selection.

use crate::catalog::TreatmentAxis;
use crate::constants::MAX_TREATMENT_AXES;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentAxisMatch {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

impl From<TreatmentAxis> for TreatmentAxisMatch {
    fn from(axis: TreatmentAxis) -> Self {
        Self {
            id: axis.id,
            name: axis.name.into_inner(),
            description: axis.description,
        }
    }
}

/// Pick the treatment axes to report for the matched syndromes.
///
/// Axes are pooled across all matched syndromes and ordered by display order alone, so the
/// first [`MAX_TREATMENT_AXES`] may all belong to one syndrome and need not follow syndrome
/// rank. Equal display orders keep the order they were given in.
pub fn select_treatment_axes(mut axes: Vec<TreatmentAxis>) -> Vec<TreatmentAxisMatch> {
    axes.sort_by_key(|a| a.display_order);
    axes.into_iter()
        .take(MAX_TREATMENT_AXES)
        .map(TreatmentAxisMatch::from)
        .collect()
}
