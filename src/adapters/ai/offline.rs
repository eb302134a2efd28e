//! Deterministic offline replies for the mock provider.
//!
//! Lets the whole pipeline run without network access: enrichment prompts get
//! a complete persona JSON object consistent with the fixed attributes in the
//! prompt, and evaluation prompts get a four-line answer driven by the
//! persona's technology-adoption stage and risk tolerance.

use serde_json::json;
use sha2::{Digest, Sha256};

use super::MockAIProvider;
use crate::domain::persona::AgeBracket;

const NAMES: [&str; 10] = [
    "Sarah Chen",
    "Marcus Johnson",
    "Priya Patel",
    "Tomás García",
    "Emily Nakamura",
    "David Okafor",
    "Hannah Müller",
    "Ravi Srinivasan",
    "Olivia Brooks",
    "Kenji Watanabe",
];

impl MockAIProvider {
    /// A mock that answers every pipeline prompt with [`offline_reply`].
    pub fn offline() -> Self {
        MockAIProvider::new().with_script(offline_reply)
    }
}

/// Builds a plausible reply for an enrichment or evaluation prompt.
pub fn offline_reply(prompt: &str) -> String {
    if prompt.contains("Would you adopt this feature?") {
        evaluation_reply(prompt)
    } else {
        enrichment_reply(prompt)
    }
}

fn enrichment_reply(prompt: &str) -> String {
    let role = labeled(prompt, "- Role:").unwrap_or("Professional");
    let age = labeled(prompt, "- Age Bracket:")
        .and_then(|label| AgeBracket::ALL.into_iter().find(|b| b.label() == label))
        .map(|bracket| {
            let (low, high) = bracket.bounds();
            low + (fingerprint(prompt) % usize::from(high - low + 1)) as u8
        });
    let name = NAMES[fingerprint(prompt) % NAMES.len()];

    let mut reply = json!({
        "name": name,
        "personality_traits": ["Pragmatic", "Detail-oriented"],
        "values": ["Efficiency", "Reliability"],
        "motivations": [format!("Be more effective as a {}", role)],
        "pain_points": ["Manual, repetitive work", "Tools that do not integrate"],
        "decision_making_style": "Weighs evidence before committing",
        "information_sources": ["Peer recommendations", "Industry newsletters"],
        "current_solutions": ["Spreadsheets", "Email"],
        "budget": "Moderate, needs clear return",
        "time_constraints": "Busy, evaluates tools in short windows",
        "team_influence": "Consults the team before adopting",
    });
    if let Some(age) = age {
        reply["age"] = json!(age);
    }
    reply.to_string()
}

fn evaluation_reply(prompt: &str) -> String {
    let adoption = labeled(prompt, "- Technology adoption:").unwrap_or_default();
    let risk = labeled(prompt, "- Risk tolerance:").unwrap_or_default();

    let (decision, confidence, reasoning, factors) = match (adoption, risk) {
        ("Early Adopter", _) => (
            "ADOPT",
            0.9,
            "It saves time on work I do every week",
            "time savings, ease of use",
        ),
        ("Early Majority", "Low") => (
            "UNSURE",
            0.5,
            "The cost is hard to justify before I see results from peers",
            "cost, proven results",
        ),
        ("Early Majority", _) => (
            "ADOPT",
            0.7,
            "It fits how my team already works and saves time",
            "time savings, fit with workflow",
        ),
        ("Late Majority", "High") => (
            "UNSURE",
            0.55,
            "Integration with our existing tools looks like a lot of work",
            "integration, setup effort",
        ),
        ("Late Majority", _) => (
            "REJECT",
            0.6,
            "The cost is too high for what we would get",
            "cost, budget",
        ),
        _ => (
            "REJECT",
            0.8,
            "Too risky to change a process that already works",
            "risk, change management",
        ),
    };

    format!(
        "DECISION: {}\nCONFIDENCE: {}\nREASONING: {}\nKEY_FACTORS: {}",
        decision, confidence, reasoning, factors
    )
}

/// Value after `label` on the first line starting with it.
fn labeled<'a>(prompt: &'a str, label: &str) -> Option<&'a str> {
    prompt
        .lines()
        .find_map(|line| line.trim_start().strip_prefix(label))
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Stable per-prompt number from the first eight bytes of its SHA-256.
fn fingerprint(prompt: &str) -> usize {
    let digest = Sha256::digest(prompt.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix) as usize
}
