//! Aggregator - turns a response set into AggregatedInsights.
//!
//! Pure and order-independent: responses are put into canonical order
//! (the experiment's persona order) before anything order-sensitive runs.

use std::collections::{HashMap, HashSet};

use crate::domain::foundation::PersonaId;
use crate::domain::persona::SyntheticPersona;
use crate::domain::simulation::{Decision, SimulationResponse};

use super::clustering::{ClusterInput, ReasoningClusterer, TextCluster, DEFAULT_SIMILARITY_THRESHOLD};
use super::model::{
    AggregatedInsights, ObjectionCluster, Recommendations, ReasoningPattern, SegmentAdoption,
    SuccessFactor,
};
use super::stats::{adoption_rate, wilson_interval, Z_95};

/// Characteristics personas are segmented by.
pub const SEGMENT_DIMENSIONS: [&str; 4] = ["Role", "Company Size", "Industry", "Technology Adoption"];

/// Value used when a persona has no value for a dimension.
pub const UNKNOWN_SEGMENT: &str = "Unknown";

const HIGH_CONFIDENCE: f64 = 0.8;
const MEDIUM_CONFIDENCE: f64 = 0.5;
const MAX_EXAMPLE_QUOTES: usize = 3;

/// Tunables for aggregation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregationSettings {
    pub similarity_threshold: f64,
    /// Minimum personas sharing a reasoning pattern for it to be reported.
    pub min_pattern_frequency: usize,
    pub include_reasoning_patterns: bool,
    pub max_objections: usize,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            min_pattern_frequency: 2,
            include_reasoning_patterns: true,
            max_objections: 5,
        }
    }
}

pub struct Aggregator {
    settings: AggregationSettings,
    clusterer: ReasoningClusterer,
}

impl Aggregator {
    pub fn new(settings: AggregationSettings) -> Self {
        Self {
            settings,
            clusterer: ReasoningClusterer::new(settings.similarity_threshold),
        }
    }

    /// Computes insights for one feature's full response set.
    ///
    /// `personas` supplies segment attributes and canonical order. Responses
    /// for personas not in the list are counted in the overall rate and
    /// reported as a data-quality note.
    pub fn aggregate(
        &self,
        responses: &[SimulationResponse],
        personas: &[SyntheticPersona],
    ) -> AggregatedInsights {
        let positions: HashMap<PersonaId, usize> =
            personas.iter().enumerate().map(|(i, p)| (p.id, i)).collect();
        let by_id: HashMap<PersonaId, &SyntheticPersona> =
            personas.iter().map(|p| (p.id, p)).collect();

        let mut ordered: Vec<&SimulationResponse> = responses.iter().collect();
        ordered.sort_by_key(|r| {
            (
                positions.get(&r.persona_id).copied().unwrap_or(usize::MAX),
                r.persona_id,
            )
        });

        let total = ordered.len();
        let adopters = ordered
            .iter()
            .filter(|r| r.decision == Decision::Adopt)
            .count();
        let overall_adoption_rate = adoption_rate(adopters, total);
        let confidence_interval = wilson_interval(adopters, total, Z_95);

        let known: Vec<(&SimulationResponse, &SyntheticPersona)> = ordered
            .iter()
            .filter_map(|r| by_id.get(&r.persona_id).map(|p| (*r, *p)))
            .collect();
        let adoption_by_segment = if known.is_empty() {
            segment_by_confidence(&ordered)
        } else {
            segment_by_persona(&known)
        };

        let top_objections = self.cluster_objections(&ordered);
        let key_success_factors = success_factors(&ordered);
        let reasoning_patterns = self
            .settings
            .include_reasoning_patterns
            .then(|| self.reasoning_patterns(&ordered));

        let recommendations = recommendations(
            &ordered,
            overall_adoption_rate,
            &adoption_by_segment,
            &top_objections,
            &key_success_factors,
        );

        let data_quality_notes =
            data_quality_notes(&ordered, personas, &by_id, known.is_empty() && total > 0);

        AggregatedInsights {
            total_responses: total,
            overall_adoption_rate,
            confidence_interval,
            adoption_by_segment,
            top_objections,
            key_success_factors,
            recommendations,
            reasoning_patterns,
            data_quality_notes,
        }
    }

    fn cluster_objections(&self, ordered: &[&SimulationResponse]) -> Vec<ObjectionCluster> {
        let inputs: Vec<ClusterInput<'_>> = ordered
            .iter()
            .filter(|r| r.decision.is_objection() && !r.is_marker())
            .map(|r| ClusterInput {
                persona_id: r.persona_id,
                text: &r.reasoning,
            })
            .collect();

        self.clusterer
            .cluster(&inputs)
            .into_iter()
            .take(self.settings.max_objections)
            .map(|cluster| ObjectionCluster {
                frequency: cluster.frequency(),
                objection: cluster.representative,
                theme: cluster.theme.map(str::to_string),
                affected_personas: cluster.members,
            })
            .collect()
    }

    fn reasoning_patterns(&self, ordered: &[&SimulationResponse]) -> Vec<ReasoningPattern> {
        let decisions: HashMap<PersonaId, Decision> =
            ordered.iter().map(|r| (r.persona_id, r.decision)).collect();
        let inputs: Vec<ClusterInput<'_>> = ordered
            .iter()
            .filter(|r| !r.is_marker())
            .map(|r| ClusterInput {
                persona_id: r.persona_id,
                text: &r.reasoning,
            })
            .collect();

        self.clusterer
            .cluster(&inputs)
            .into_iter()
            .filter(|c| c.frequency() >= self.settings.min_pattern_frequency)
            .map(|cluster| pattern_from_cluster(cluster, &decisions))
            .collect()
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(AggregationSettings::default())
    }
}

fn pattern_from_cluster(
    cluster: TextCluster,
    decisions: &HashMap<PersonaId, Decision>,
) -> ReasoningPattern {
    let adopting = cluster
        .members
        .iter()
        .filter(|id| decisions.get(*id) == Some(&Decision::Adopt))
        .count();
    let description = match cluster.theme {
        Some(theme) => format!("{} considerations", capitalize(theme)),
        None => cluster.representative.clone(),
    };
    ReasoningPattern {
        description,
        theme: cluster.theme.map(str::to_string),
        frequency: cluster.frequency(),
        example_quotes: cluster.texts.into_iter().take(MAX_EXAMPLE_QUOTES).collect(),
        adoption_share: adoption_rate(adopting, cluster.members.len()),
        affected_personas: cluster.members,
    }
}

fn dimension_value(persona: &SyntheticPersona, dimension: &str) -> String {
    let value = match dimension {
        "Role" => Some(persona.demographics.role.trim().to_string()),
        "Company Size" => persona.demographics.company_size.map(|s| s.to_string()),
        "Industry" => persona.demographics.industry.as_ref().map(|i| i.trim().to_string()),
        "Technology Adoption" => Some(persona.behavior_patterns.technology_adoption.to_string()),
        _ => None,
    };
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| UNKNOWN_SEGMENT.to_string())
}

/// Every dimension partitions the known responses exactly once.
fn segment_by_persona(known: &[(&SimulationResponse, &SyntheticPersona)]) -> Vec<SegmentAdoption> {
    let mut segments = Vec::new();
    for dimension in SEGMENT_DIMENSIONS {
        let groups = group_in_order(known.iter().map(|(response, persona)| {
            (dimension_value(persona, dimension), response.decision)
        }));
        segments.extend(groups.into_iter().map(|(value, adopters, total)| {
            segment(dimension, value, adopters, total)
        }));
    }
    segments
}

fn segment_by_confidence(ordered: &[&SimulationResponse]) -> Vec<SegmentAdoption> {
    let groups = group_in_order(ordered.iter().map(|r| {
        let band = if r.confidence >= HIGH_CONFIDENCE {
            "High"
        } else if r.confidence >= MEDIUM_CONFIDENCE {
            "Medium"
        } else {
            "Low"
        };
        (band.to_string(), r.decision)
    }));
    groups
        .into_iter()
        .map(|(value, adopters, total)| segment("Confidence", value, adopters, total))
        .collect()
}

/// Groups `(value, decision)` pairs by value in first-seen order.
fn group_in_order(
    items: impl Iterator<Item = (String, Decision)>,
) -> Vec<(String, usize, usize)> {
    let mut groups: Vec<(String, usize, usize)> = Vec::new();
    for (value, decision) in items {
        let adopted = usize::from(decision == Decision::Adopt);
        match groups.iter_mut().find(|(v, _, _)| *v == value) {
            Some(group) => {
                group.1 += adopted;
                group.2 += 1;
            }
            None => groups.push((value, adopted, 1)),
        }
    }
    groups
}

fn segment(dimension: &str, value: String, adopters: usize, total: usize) -> SegmentAdoption {
    SegmentAdoption {
        dimension: dimension.to_string(),
        label: format!("{}: {}", dimension, value),
        value,
        adopters,
        total,
        adoption_rate: adoption_rate(adopters, total),
    }
}

fn success_factors(ordered: &[&SimulationResponse]) -> Vec<SuccessFactor> {
    let adoptions: Vec<&&SimulationResponse> = ordered
        .iter()
        .filter(|r| r.decision == Decision::Adopt)
        .collect();
    if adoptions.is_empty() {
        return Vec::new();
    }

    // (normalized key, display text, supporting personas), first-seen order
    let mut tally: Vec<(String, String, Vec<PersonaId>)> = Vec::new();
    for response in &adoptions {
        let mut seen = HashSet::new();
        for factor in &response.key_factors {
            let display = factor.trim();
            let key = display.to_lowercase();
            if key.is_empty() || !seen.insert(key.clone()) {
                continue;
            }
            match tally.iter_mut().find(|(k, _, _)| *k == key) {
                Some(entry) => entry.2.push(response.persona_id),
                None => tally.push((key, display.to_string(), vec![response.persona_id])),
            }
        }
    }

    let mut factors: Vec<SuccessFactor> = tally
        .into_iter()
        .map(|(_, factor, supporting_personas)| SuccessFactor {
            importance: supporting_personas.len() as f64 / adoptions.len() as f64,
            factor,
            supporting_personas,
        })
        .collect();
    factors.sort_by(|a, b| b.supporting_personas.len().cmp(&a.supporting_personas.len()));
    factors
}

fn recommendations(
    ordered: &[&SimulationResponse],
    adoption_rate: f64,
    segments: &[SegmentAdoption],
    objections: &[ObjectionCluster],
    factors: &[SuccessFactor],
) -> Recommendations {
    let mut recommendations = Recommendations::default();
    if ordered.is_empty() {
        return recommendations;
    }

    if let Some(top) = factors.first() {
        let factor = top.factor.to_lowercase();
        recommendations
            .messaging
            .push(format!("Emphasize {} in marketing materials", factor));
        recommendations
            .messaging
            .push(format!("Lead with value proposition around {}", factor));
    }
    if let Some(second) = factors.get(1) {
        recommendations.messaging.push(format!(
            "Reinforce {} in demos and onboarding",
            second.factor.to_lowercase()
        ));
    }
    if let Some(top) = objections.first() {
        recommendations
            .messaging
            .push(format!("Address {} proactively in communications", top.label()));
    }

    let best_segment = segments
        .iter()
        .filter(|s| s.adopters > 0)
        .fold(None::<&SegmentAdoption>, |best, s| match best {
            Some(b) if b.adoption_rate > s.adoption_rate => Some(b),
            Some(b) if b.adoption_rate == s.adoption_rate && b.total >= s.total => Some(b),
            _ => Some(s),
        });
    if let Some(best) = best_segment {
        recommendations.target_segments.push(format!(
            "Prioritize {} ({:.0}% adoption across {} personas)",
            best.label,
            best.adoption_rate * 100.0,
            best.total
        ));
    }
    let high_confidence_adopters = ordered
        .iter()
        .any(|r| r.decision == Decision::Adopt && r.confidence >= HIGH_CONFIDENCE);
    if high_confidence_adopters {
        recommendations
            .target_segments
            .push("Focus initial launch on high-confidence early adopters".to_string());
        recommendations
            .target_segments
            .push("Use early adopters as case studies and references".to_string());
    }

    for objection in objections.iter().take(2) {
        recommendations
            .feature_improvements
            .push(format!("Consider improvements to address {}", objection.label()));
    }
    if adoption_rate < 0.3 {
        recommendations
            .feature_improvements
            .push("Consider significant feature enhancements before launch".to_string());
        recommendations
            .feature_improvements
            .push("Conduct additional user research to identify missing value".to_string());
    } else if adoption_rate < 0.6 {
        recommendations
            .feature_improvements
            .push("Minor feature refinements could improve adoption".to_string());
    }

    recommendations
}

fn data_quality_notes(
    ordered: &[&SimulationResponse],
    personas: &[SyntheticPersona],
    by_id: &HashMap<PersonaId, &SyntheticPersona>,
    confidence_fallback: bool,
) -> Vec<String> {
    let mut notes = Vec::new();

    let degraded: Vec<&str> = personas
        .iter()
        .filter(|p| p.degraded)
        .map(|p| p.name.as_str())
        .collect();
    if !degraded.is_empty() {
        notes.push(format!(
            "{} of {} personas were partially backfilled with default attributes: {}",
            degraded.len(),
            personas.len(),
            degraded.join(", ")
        ));
    }

    let parse_failures = ordered.iter().filter(|r| r.is_parse_failure()).count();
    if parse_failures > 0 {
        notes.push(format!(
            "{} responses could not be parsed and were counted as UNSURE",
            parse_failures
        ));
    }

    let failed = ordered.iter().filter(|r| r.is_failure_placeholder()).count();
    if failed > 0 {
        notes.push(format!(
            "{} personas failed to simulate and were counted as UNSURE with zero confidence",
            failed
        ));
    }

    let unknown = ordered
        .iter()
        .filter(|r| !by_id.contains_key(&r.persona_id))
        .count();
    if unknown > 0 && !personas.is_empty() {
        notes.push(format!(
            "{} responses reference personas outside this experiment",
            unknown
        ));
    }

    if !ordered.is_empty() {
        let answered: HashSet<PersonaId> = ordered.iter().map(|r| r.persona_id).collect();
        let missing = personas.iter().filter(|p| !answered.contains(&p.id)).count();
        if missing > 0 {
            notes.push(format!("{} personas have no response", missing));
        }
    }

    if confidence_fallback {
        notes.push(
            "No persona attributes available; segments are based on response confidence"
                .to_string(),
        );
    }

    notes
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
