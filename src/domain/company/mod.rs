//! Company module - the company description an experiment is built around.

mod context;
mod input;

pub use context::CompanyContext;
pub use input::{
    BusinessModel, CompanyInput, CompanySize, InputAssessment, InsufficientContextError,
};

use crate::domain::foundation::{DomainError, ErrorCode};

impl From<InsufficientContextError> for DomainError {
    fn from(err: InsufficientContextError) -> Self {
        DomainError::new(ErrorCode::InsufficientContext, err.to_string())
            .with_detail("missing_fields", err.missing_fields.join(","))
    }
}
