//! Insights module - aggregation of simulation responses.
//!
//! - `stats` - adoption rate and Wilson interval
//! - `clustering` - deterministic grouping of reasoning text
//! - `aggregator` - builds [`AggregatedInsights`]
//! - `export` - flat rows for external formatters

mod aggregator;
mod clustering;
mod export;
mod model;
mod stats;

pub use aggregator::{AggregationSettings, Aggregator, SEGMENT_DIMENSIONS, UNKNOWN_SEGMENT};
pub use clustering::{
    dominant_theme, jaccard, tokenize, ClusterInput, ReasoningClusterer, TextCluster,
    DEFAULT_SIMILARITY_THRESHOLD,
};
pub use export::{export_rows, ExportRow, EXPORT_HEADERS, NOT_APPLICABLE};
pub use model::{
    AggregatedInsights, ObjectionCluster, Recommendations, ReasoningPattern, SegmentAdoption,
    SuccessFactor,
};
pub use stats::{adoption_rate, wilson_interval, Z_95};
