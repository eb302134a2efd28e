//! AggregatedInsights and its parts.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::PersonaId;

/// Adoption within one value of one persona characteristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentAdoption {
    pub dimension: String,
    pub value: String,
    /// `"<Dimension>: <value>"`.
    pub label: String,
    pub adopters: usize,
    pub total: usize,
    pub adoption_rate: f64,
}

/// A group of similar objections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectionCluster {
    /// Reasoning of the earliest persona in the cluster.
    pub objection: String,
    /// Keyword theme shared by the cluster, when one was detected.
    pub theme: Option<String>,
    pub frequency: usize,
    pub affected_personas: Vec<PersonaId>,
}

impl ObjectionCluster {
    /// Short label used in recommendations.
    pub fn label(&self) -> String {
        match &self.theme {
            Some(theme) => format!("{} concerns", theme),
            None => self.objection.trim_end_matches('.').to_lowercase(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessFactor {
    pub factor: String,
    /// Share of adopters naming this factor, in [0, 1].
    pub importance: f64,
    pub supporting_personas: Vec<PersonaId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub messaging: Vec<String>,
    pub target_segments: Vec<String>,
    pub feature_improvements: Vec<String>,
}

/// A theme recurring across responses of any decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningPattern {
    pub description: String,
    pub theme: Option<String>,
    pub frequency: usize,
    /// At most three quotes, in persona order.
    pub example_quotes: Vec<String>,
    pub affected_personas: Vec<PersonaId>,
    /// Share of the pattern's personas that adopted.
    pub adoption_share: f64,
}

/// Statistics and recommendations derived from one feature's responses.
///
/// Always recomputed from the full response set; never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedInsights {
    pub total_responses: usize,
    pub overall_adoption_rate: f64,
    /// 95% Wilson score interval, `(lower, upper)`.
    pub confidence_interval: (f64, f64),
    pub adoption_by_segment: Vec<SegmentAdoption>,
    pub top_objections: Vec<ObjectionCluster>,
    pub key_success_factors: Vec<SuccessFactor>,
    pub recommendations: Recommendations,
    pub reasoning_patterns: Option<Vec<ReasoningPattern>>,
    pub data_quality_notes: Vec<String>,
}

impl AggregatedInsights {
    /// Looks up a segment by its label.
    pub fn segment(&self, label: &str) -> Option<&SegmentAdoption> {
        self.adoption_by_segment.iter().find(|s| s.label == label)
    }

    /// Segments belonging to one dimension.
    pub fn segments_for<'a>(
        &'a self,
        dimension: &'a str,
    ) -> impl Iterator<Item = &'a SegmentAdoption> + 'a {
        self.adoption_by_segment
            .iter()
            .filter(move |s| s.dimension == dimension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn themed_cluster_label_names_theme() {
        let cluster = ObjectionCluster {
            objection: "Too expensive for us.".to_string(),
            theme: Some("cost".to_string()),
            frequency: 2,
            affected_personas: vec![],
        };
        assert_eq!(cluster.label(), "cost concerns");
    }

    #[test]
    fn unthemed_cluster_label_uses_objection_text() {
        let cluster = ObjectionCluster {
            objection: "Our CFO would never sign off.".to_string(),
            theme: None,
            frequency: 1,
            affected_personas: vec![],
        };
        assert_eq!(cluster.label(), "our cfo would never sign off");
    }
}
