//! Parsing of model output into simulation responses.
//!
//! Parsing never fails: output without a recognisable decision becomes
//! [`ParsedResponse::Unparsed`], and [`ParsedResponse::into_response`] is the
//! single place that turns it into the UNSURE fallback.

use crate::domain::foundation::{PersonaId, Timestamp};

use super::response::{Decision, SimulationResponse, PARSING_FAILED};

const DEFAULT_CONFIDENCE: f64 = 0.5;
const DEFAULT_REASONING: &str = "No reasoning provided";

/// Result of reading one model answer.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedResponse {
    Parsed {
        decision: Decision,
        confidence: f64,
        reasoning: String,
        key_factors: Vec<String>,
    },
    Unparsed {
        raw_text: String,
    },
}

#[derive(Clone, Copy, PartialEq)]
enum Label {
    Decision,
    Confidence,
    Reasoning,
    KeyFactors,
}

impl ParsedResponse {
    /// Reads the four labeled lines from raw model output.
    ///
    /// Labels are matched case-insensitively and may carry markdown emphasis
    /// or list bullets. Reasoning may continue over following unlabeled lines.
    pub fn parse(raw: &str) -> Self {
        let mut decision = None;
        let mut confidence = None;
        let mut reasoning: Option<String> = None;
        let mut key_factors: Option<Vec<String>> = None;
        let mut current = None;

        for line in raw.lines() {
            let cleaned = clean_line(line);
            if cleaned.is_empty() {
                continue;
            }

            match split_label(&cleaned) {
                Some((label, value)) => {
                    current = Some(label);
                    match label {
                        Label::Decision if decision.is_none() => {
                            decision = Some(value.parse::<Decision>().ok());
                        }
                        Label::Confidence if confidence.is_none() => {
                            confidence = Some(parse_confidence(&value));
                        }
                        Label::Reasoning if reasoning.is_none() => {
                            reasoning = Some(value);
                        }
                        Label::KeyFactors if key_factors.is_none() => {
                            key_factors = Some(split_factors(&value));
                        }
                        _ => current = None,
                    }
                }
                None => match (current, reasoning.as_mut()) {
                    (Some(Label::Reasoning), Some(text)) => {
                        if !text.is_empty() {
                            text.push(' ');
                        }
                        text.push_str(&cleaned);
                    }
                    (Some(Label::KeyFactors), _) => {
                        if let Some(factors) = key_factors.as_mut() {
                            factors.extend(split_factors(&cleaned));
                        }
                    }
                    _ => {}
                },
            }
        }

        match decision.flatten() {
            Some(decision) => ParsedResponse::Parsed {
                decision,
                confidence: confidence.unwrap_or(DEFAULT_CONFIDENCE),
                reasoning: reasoning
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty())
                    .unwrap_or_else(|| DEFAULT_REASONING.to_string()),
                key_factors: key_factors.unwrap_or_default(),
            },
            None => ParsedResponse::Unparsed {
                raw_text: raw.to_string(),
            },
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, ParsedResponse::Parsed { .. })
    }

    /// Converts into a response; unparsed output becomes UNSURE with zero
    /// confidence and the `parsing_failed` marker as reasoning.
    pub fn into_response(
        self,
        persona_id: PersonaId,
        model_used: impl Into<String>,
    ) -> SimulationResponse {
        let (decision, confidence, reasoning, key_factors) = match self {
            ParsedResponse::Parsed {
                decision,
                confidence,
                reasoning,
                key_factors,
            } => (decision, confidence, reasoning, key_factors),
            ParsedResponse::Unparsed { .. } => {
                (Decision::Unsure, 0.0, PARSING_FAILED.to_string(), Vec::new())
            }
        };
        SimulationResponse {
            persona_id,
            decision,
            confidence,
            reasoning,
            key_factors,
            timestamp: Timestamp::now(),
            model_used: model_used.into(),
        }
    }
}

/// Strips bullets, markdown emphasis and surrounding whitespace.
fn clean_line(line: &str) -> String {
    line.replace("**", "")
        .replace("__", "")
        .trim()
        .trim_start_matches(['-', '*', '•', '#', '>'])
        .trim()
        .to_string()
}

fn split_label(line: &str) -> Option<(Label, String)> {
    let (label, value) = line.split_once(':')?;
    let label = label.trim().to_ascii_uppercase().replace([' ', '-'], "_");
    let label = match label.as_str() {
        "DECISION" => Label::Decision,
        "CONFIDENCE" => Label::Confidence,
        "REASONING" => Label::Reasoning,
        "KEY_FACTORS" | "KEYFACTORS" => Label::KeyFactors,
        _ => return None,
    };
    let value = value
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim()
        .to_string();
    Some((label, value))
}

/// Parses a confidence value and clamps it to [0, 1].
///
/// A trailing `%` divides by 100. Unreadable values fall back to 0.5.
fn parse_confidence(value: &str) -> f64 {
    let value = value.trim().trim_end_matches('.');
    let (number, scale) = match value.strip_suffix('%') {
        Some(number) => (number.trim(), 100.0),
        None => (value, 1.0),
    };
    match number.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => (parsed / scale).clamp(0.0, 1.0),
        _ => DEFAULT_CONFIDENCE,
    }
}

fn split_factors(value: &str) -> Vec<String> {
    value
        .split([',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn parsed(raw: &str) -> (Decision, f64, String, Vec<String>) {
        match ParsedResponse::parse(raw) {
            ParsedResponse::Parsed {
                decision,
                confidence,
                reasoning,
                key_factors,
            } => (decision, confidence, reasoning, key_factors),
            ParsedResponse::Unparsed { raw_text } => panic!("unparsed: {raw_text}"),
        }
    }

    #[test]
    fn parses_well_formed_answer() {
        let (decision, confidence, reasoning, factors) = parsed(
            "DECISION: ADOPT\nCONFIDENCE: 0.82\nREASONING: Saves my team hours.\nKEY_FACTORS: time savings, price; integrations",
        );
        assert_eq!(decision, Decision::Adopt);
        assert!((confidence - 0.82).abs() < 1e-9);
        assert_eq!(reasoning, "Saves my team hours.");
        assert_eq!(factors, vec!["time savings", "price", "integrations"]);
    }

    #[test]
    fn decision_is_case_insensitive_and_tolerates_markdown() {
        let (decision, ..) = parsed("**Decision:** reject\n- Confidence: 0.4");
        assert_eq!(decision, Decision::Reject);
    }

    #[test]
    fn unknown_decision_is_unparsed() {
        let result = ParsedResponse::parse("DECISION: MAYBE\nCONFIDENCE: 0.9");
        assert_eq!(
            result,
            ParsedResponse::Unparsed {
                raw_text: "DECISION: MAYBE\nCONFIDENCE: 0.9".to_string()
            }
        );
    }

    #[test]
    fn missing_decision_is_unparsed() {
        assert!(!ParsedResponse::parse("I would probably use it.").is_parsed());
    }

    #[test]
    fn unparsed_normalizes_to_parsing_failed_unsure() {
        let persona_id = PersonaId::new();
        let response = ParsedResponse::parse("DECISION: MAYBE").into_response(persona_id, "mock");
        assert_eq!(response.decision, Decision::Unsure);
        assert_eq!(response.confidence, 0.0);
        assert_eq!(response.reasoning, PARSING_FAILED);
        assert_eq!(response.persona_id, persona_id);
    }

    #[test]
    fn confidence_out_of_range_is_clamped() {
        assert_eq!(parsed("DECISION: ADOPT\nCONFIDENCE: 1.7").1, 1.0);
        assert_eq!(parsed("DECISION: ADOPT\nCONFIDENCE: -0.2").1, 0.0);
    }

    #[test]
    fn confidence_percentage_is_scaled() {
        assert!((parsed("DECISION: ADOPT\nCONFIDENCE: 85%").1 - 0.85).abs() < 1e-9);
    }

    #[test]
    fn unreadable_confidence_defaults_to_half() {
        assert_eq!(parsed("DECISION: UNSURE\nCONFIDENCE: high").1, 0.5);
        assert_eq!(parsed("DECISION: UNSURE").1, 0.5);
    }

    #[test]
    fn key_factors_drop_empty_entries() {
        let (.., factors) = parsed("DECISION: ADOPT\nKEY_FACTORS: [cost, , ;speed ]");
        assert_eq!(factors, vec!["cost", "speed"]);
    }

    #[test]
    fn reasoning_continues_over_unlabeled_lines() {
        let (_, _, reasoning, _) =
            parsed("DECISION: REJECT\nREASONING: Too expensive\nfor our team size.\nKEY_FACTORS: cost");
        assert_eq!(reasoning, "Too expensive for our team size.");
    }

    #[test]
    fn missing_reasoning_gets_placeholder() {
        assert_eq!(parsed("DECISION: ADOPT").2, DEFAULT_REASONING);
    }

    proptest! {
        #[test]
        fn parse_is_total_and_confidence_bounded(raw in ".{0,200}") {
            let response = ParsedResponse::parse(&raw).into_response(PersonaId::new(), "mock");
            prop_assert!((0.0..=1.0).contains(&response.confidence));
        }

        #[test]
        fn any_confidence_is_clamped(value in proptest::num::f64::ANY) {
            let raw = format!("DECISION: ADOPT\nCONFIDENCE: {value}");
            let response = ParsedResponse::parse(&raw).into_response(PersonaId::new(), "mock");
            prop_assert!((0.0..=1.0).contains(&response.confidence));
        }
    }
}
