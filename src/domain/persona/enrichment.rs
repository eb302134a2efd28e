//! Enrichment prompts and parsing of model-supplied persona fields.
//!
//! The model is asked for the free-text parts of a persona as a JSON object.
//! Output is parsed leniently: any field that is absent, blank, or of the
//! wrong shape is treated as missing, so the caller can ask again for just
//! those fields and finally backfill from [`AxisDefaults`].

use serde_json::{Map, Value};

use super::axes::AgeBracket;
use super::defaults::AxisDefaults;
use super::model::{
    BehaviorPatterns, ContextualFactors, Demographics, Psychographics, SyntheticPersona,
};
use super::seed::PersonaSeed;
use crate::domain::company::CompanyContext;
use crate::domain::foundation::PersonaId;

/// Upper bound on items kept per list field.
const MAX_LIST_ITEMS: usize = 5;

/// Fields the enrichment call must supply, in prompt order.
pub const ENRICHMENT_FIELDS: [&str; 12] = [
    "name",
    "age",
    "personality_traits",
    "values",
    "motivations",
    "pain_points",
    "decision_making_style",
    "information_sources",
    "current_solutions",
    "budget",
    "time_constraints",
    "team_influence",
];

/// Persona fields obtained from the model so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichmentFields {
    pub name: Option<String>,
    pub age: Option<u8>,
    pub traits: Option<Vec<String>>,
    pub values: Option<Vec<String>>,
    pub motivations: Option<Vec<String>>,
    pub pain_points: Option<Vec<String>>,
    pub decision_making_style: Option<String>,
    pub information_sources: Option<Vec<String>>,
    pub current_solutions: Option<Vec<String>>,
    pub budget: Option<String>,
    pub time_constraints: Option<String>,
    pub team_influence: Option<String>,
}

impl EnrichmentFields {
    /// Parses model output for a seed.
    ///
    /// Looks for the outermost JSON object in `raw`. An age outside the
    /// seed's bracket is discarded so the model cannot drift the axis.
    pub fn parse(raw: &str, age_bracket: AgeBracket) -> Self {
        let Some(object) = extract_json_object(raw) else {
            return Self::default();
        };

        Self {
            name: text_field(&object, &["name"]),
            age: object
                .get("age")
                .and_then(|v| v.as_u64().or_else(|| v.as_str()?.trim().parse().ok()))
                .and_then(|age| u8::try_from(age).ok())
                .filter(|age| age_bracket.contains(*age)),
            traits: list_field(&object, &["personality_traits", "traits"], false),
            values: list_field(&object, &["values"], false),
            motivations: list_field(&object, &["motivations"], false),
            pain_points: list_field(&object, &["pain_points"], false),
            decision_making_style: text_field(&object, &["decision_making_style"]),
            information_sources: list_field(&object, &["information_sources"], false),
            current_solutions: list_field(&object, &["current_solutions"], true),
            budget: text_field(&object, &["budget"]),
            time_constraints: text_field(&object, &["time_constraints"]),
            team_influence: text_field(&object, &["team_influence"]),
        }
    }

    /// Names of fields still missing, using prompt field names.
    pub fn missing(&self) -> Vec<&'static str> {
        let present = [
            self.name.is_some(),
            self.age.is_some(),
            self.traits.is_some(),
            self.values.is_some(),
            self.motivations.is_some(),
            self.pain_points.is_some(),
            self.decision_making_style.is_some(),
            self.information_sources.is_some(),
            self.current_solutions.is_some(),
            self.budget.is_some(),
            self.time_constraints.is_some(),
            self.team_influence.is_some(),
        ];
        ENRICHMENT_FIELDS
            .iter()
            .zip(present)
            .filter(|(_, present)| !present)
            .map(|(field, _)| *field)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// Fills fields missing here from `other`; fields already present win.
    pub fn merge(self, other: EnrichmentFields) -> Self {
        Self {
            name: self.name.or(other.name),
            age: self.age.or(other.age),
            traits: self.traits.or(other.traits),
            values: self.values.or(other.values),
            motivations: self.motivations.or(other.motivations),
            pain_points: self.pain_points.or(other.pain_points),
            decision_making_style: self.decision_making_style.or(other.decision_making_style),
            information_sources: self.information_sources.or(other.information_sources),
            current_solutions: self.current_solutions.or(other.current_solutions),
            budget: self.budget.or(other.budget),
            time_constraints: self.time_constraints.or(other.time_constraints),
            team_influence: self.team_influence.or(other.team_influence),
        }
    }

    /// Builds the persona, backfilling missing fields from axis defaults.
    ///
    /// Axis values always come from the seed. The persona is marked degraded
    /// when any field had to be backfilled.
    pub fn into_persona(self, id: PersonaId, seed: &PersonaSeed) -> SyntheticPersona {
        let defaults = AxisDefaults::for_seed(seed);
        let degraded_fields: Vec<String> = self.missing().into_iter().map(String::from).collect();

        SyntheticPersona {
            id,
            name: self.name.unwrap_or_else(|| defaults.name()),
            segment: seed.segment.clone(),
            demographics: Demographics {
                age: self.age.unwrap_or_else(|| defaults.age()),
                age_bracket: seed.age_bracket,
                role: seed.role.clone(),
                company_size: seed.company_size,
                industry: seed.industry.clone(),
                income: seed.income_bracket,
            },
            psychographics: Psychographics {
                traits: self.traits.unwrap_or_else(|| defaults.traits()),
                values: self.values.unwrap_or_else(|| defaults.values()),
                motivations: self.motivations.unwrap_or_else(|| defaults.motivations()),
                pain_points: self.pain_points.unwrap_or_else(|| defaults.pain_points()),
            },
            behavior_patterns: BehaviorPatterns {
                technology_adoption: seed.technology_adoption,
                decision_making_style: self
                    .decision_making_style
                    .unwrap_or_else(|| defaults.decision_making_style()),
                risk_tolerance: seed.risk_tolerance,
                information_sources: self
                    .information_sources
                    .unwrap_or_else(|| defaults.information_sources()),
            },
            contextual_factors: ContextualFactors {
                current_solutions: self
                    .current_solutions
                    .unwrap_or_else(|| defaults.current_solutions()),
                budget: self.budget.unwrap_or_else(|| defaults.budget()),
                time_constraints: self
                    .time_constraints
                    .unwrap_or_else(|| defaults.time_constraints()),
                team_influence: self
                    .team_influence
                    .unwrap_or_else(|| defaults.team_influence()),
            },
            degraded: !degraded_fields.is_empty(),
            degraded_fields,
        }
    }
}

/// Renders the enrichment prompt for one seed.
///
/// The seed's axis values appear verbatim and are marked as fixed.
pub fn enrichment_prompt(seed: &PersonaSeed, context: &CompanyContext) -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "You are helping create a realistic synthetic persona for market research.\n\n",
    );
    prompt.push_str(&format!("Company Context:\n{}\n", context.summary()));
    prompt.push_str(&format!("Market Segment: {}\n\n", seed.segment));

    prompt.push_str("Fixed persona attributes (use exactly as given, do not change):\n");
    prompt.push_str(&format!("- Role: {}\n", seed.role));
    prompt.push_str(&format!("- Age Bracket: {}\n", seed.age_bracket));
    prompt.push_str(&format!("- Income Bracket: {}\n", seed.income_bracket));
    prompt.push_str(&format!("- Risk Tolerance: {}\n", seed.risk_tolerance));
    prompt.push_str(&format!("- Technology Adoption: {}\n", seed.technology_adoption));
    if let Some(size) = seed.company_size {
        prompt.push_str(&format!("- Employer Size: {}\n", size));
    }
    if let Some(industry) = &seed.industry {
        prompt.push_str(&format!("- Employer Industry: {}\n", industry));
    }

    prompt.push_str(&format!(
        "\nFill in the remaining attributes so they are consistent with the fixed ones. \
         The age must fall within {}.\n\n",
        seed.age_bracket
    ));
    prompt.push_str("Respond with only a JSON object:\n");
    prompt.push_str(&json_skeleton(&ENRICHMENT_FIELDS));
    prompt
}

/// Renders the stricter follow-up asking only for `missing` fields.
pub fn follow_up_prompt(seed: &PersonaSeed, missing: &[&str]) -> String {
    format!(
        "Your previous answer for the {role} persona (age {age}, {adoption}, {risk} risk \
         tolerance) was incomplete.\n\
         Return ONLY the missing fields as a JSON object, with no other text:\n{skeleton}",
        role = seed.role,
        age = seed.age_bracket,
        adoption = seed.technology_adoption,
        risk = seed.risk_tolerance,
        skeleton = json_skeleton(missing),
    )
}

fn json_skeleton(fields: &[&str]) -> String {
    let lines: Vec<String> = fields
        .iter()
        .map(|field| {
            let placeholder = match *field {
                "name" => "\"full name\"".to_string(),
                "age" => "number".to_string(),
                "decision_making_style" | "budget" | "time_constraints" | "team_influence" => {
                    "\"short phrase\"".to_string()
                }
                _ => "[\"item1\", \"item2\"]".to_string(),
            };
            format!("  \"{}\": {}", field, placeholder)
        })
        .collect();
    format!("{{\n{}\n}}\n", lines.join(",\n"))
}

/// Returns the object between the first `{` and the last `}`.
fn extract_json_object(raw: &str) -> Option<Map<String, Value>> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&raw[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn text_field(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn list_field(object: &Map<String, Value>, keys: &[&str], allow_empty: bool) -> Option<Vec<String>> {
    let value = keys.iter().find_map(|key| object.get(*key))?;
    let items: Vec<String> = match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .take(MAX_LIST_ITEMS)
            .collect(),
        Value::String(s) => s
            .split([',', ';'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .take(MAX_LIST_ITEMS)
            .collect(),
        _ => return None,
    };
    if items.is_empty() && !allow_empty {
        None
    } else {
        Some(items)
    }
}
