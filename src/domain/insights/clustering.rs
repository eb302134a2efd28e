//! Deterministic clustering of free-text reasoning.
//!
//! Each text is first matched against a fixed keyword-theme table; the theme
//! with the most keyword hits wins, ties going to the earlier theme in the
//! table. Texts with no theme are compared by Jaccard similarity over
//! stop-word-filtered tokens against each unthemed cluster's representative
//! (its first member) and join the first cluster at or above the threshold.
//!
//! Output depends only on the input texts, their order, and the threshold.

use once_cell::sync::Lazy;
use std::collections::{BTreeSet, HashSet};

use crate::domain::foundation::PersonaId;

/// Default Jaccard threshold for joining an unthemed cluster.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.5;

/// Keyword themes in priority order.
///
/// Single-word keywords match any token starting with them; multi-word
/// keywords match as a phrase.
const THEMES: [(&str, &[&str]); 9] = [
    ("cost", &["cost", "price", "pricing", "expensive", "budget", "afford"]),
    ("complexity", &["complex", "complicated", "difficult", "learning curve", "hard to use"]),
    ("integration", &["integrat", "compatib", "existing system", "current system", "current stack"]),
    ("time", &["time", "timeline", "schedule", "delay", "slow", "bandwidth"]),
    ("security", &["security", "secure", "privacy", "data protection", "compliance"]),
    ("scalability", &["scale", "scalab", "growth", "capacity"]),
    ("value", &["value", "benefit", "roi", "return on"]),
    ("risk", &["risk", "uncertain", "unproven", "untested"]),
    ("fit", &["fit", "relevant", "applicable", "suitable", "need"]),
];

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "has", "have", "i",
        "in", "is", "it", "its", "me", "my", "not", "of", "on", "or", "our", "so", "that", "the",
        "this", "to", "too", "us", "was", "we", "were", "will", "with", "would", "you", "your",
    ]
    .into_iter()
    .collect()
});

/// One input to clustering.
#[derive(Debug, Clone)]
pub struct ClusterInput<'a> {
    pub persona_id: PersonaId,
    pub text: &'a str,
}

/// A cluster of similar texts, members in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct TextCluster {
    pub theme: Option<&'static str>,
    pub representative: String,
    pub members: Vec<PersonaId>,
    pub texts: Vec<String>,
    /// Input index of the first member.
    pub first_index: usize,
}

impl TextCluster {
    pub fn frequency(&self) -> usize {
        self.members.len()
    }
}

/// Clusters reasoning texts.
pub struct ReasoningClusterer {
    threshold: f64,
}

impl ReasoningClusterer {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Places every input in exactly one cluster.
    ///
    /// Clusters are sorted by frequency descending, ties broken by the
    /// input position of their first member.
    pub fn cluster(&self, inputs: &[ClusterInput<'_>]) -> Vec<TextCluster> {
        let mut clusters: Vec<TextCluster> = Vec::new();
        let mut unthemed_tokens: Vec<(usize, BTreeSet<String>)> = Vec::new();

        for (index, input) in inputs.iter().enumerate() {
            let text = input.text.trim();
            let tokens = tokenize(text);

            let theme = dominant_theme(text, &tokens);
            let target = match theme {
                Some(theme) => clusters.iter().position(|c| c.theme == Some(theme)),
                None => {
                    let significant = significant_tokens(&tokens);
                    let found = unthemed_tokens
                        .iter()
                        .find(|(_, rep)| jaccard(rep, &significant) >= self.threshold)
                        .map(|(cluster_index, _)| *cluster_index);
                    if found.is_none() {
                        unthemed_tokens.push((clusters.len(), significant));
                    }
                    found
                }
            };

            match target {
                Some(cluster_index) => {
                    let cluster = &mut clusters[cluster_index];
                    cluster.members.push(input.persona_id);
                    cluster.texts.push(text.to_string());
                }
                None => clusters.push(TextCluster {
                    theme,
                    representative: text.to_string(),
                    members: vec![input.persona_id],
                    texts: vec![text.to_string()],
                    first_index: index,
                }),
            }
        }

        clusters.sort_by(|a, b| {
            b.frequency()
                .cmp(&a.frequency())
                .then(a.first_index.cmp(&b.first_index))
        });
        clusters
    }
}

impl Default for ReasoningClusterer {
    fn default() -> Self {
        Self::new(DEFAULT_SIMILARITY_THRESHOLD)
    }
}

/// Theme with the most keyword hits, if any.
pub fn dominant_theme(text: &str, tokens: &[String]) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    let mut best: Option<(&'static str, usize)> = None;
    for (theme, keywords) in THEMES {
        let hits: usize = keywords
            .iter()
            .map(|keyword| {
                if keyword.contains(' ') {
                    lowered.matches(keyword).count()
                } else {
                    tokens.iter().filter(|t| t.starts_with(keyword)).count()
                }
            })
            .sum();
        if hits > 0 && best.map_or(true, |(_, best_hits)| hits > best_hits) {
            best = Some((theme, hits));
        }
    }
    best.map(|(theme, _)| theme)
}

/// Lowercase alphanumeric tokens in order.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn significant_tokens(tokens: &[String]) -> BTreeSet<String> {
    tokens
        .iter()
        .filter(|t| !STOP_WORDS.contains(t.as_str()))
        .cloned()
        .collect()
}

/// Jaccard similarity; two empty sets are identical.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}
