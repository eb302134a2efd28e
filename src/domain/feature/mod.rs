//! Feature module - the candidate feature under evaluation.

mod description;

pub use description::{FeatureDescription, ImplementationComplexity};
