use codemerge_core::ProviderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("language error: {0}")]
    Language(String),
    #[error("parse failed")]
    ParseFailed,
    #[error("source does not hold a single expression")]
    NotAnExpression,
    /// A generated element named two different logical ids through its
    /// class-name and props accessors.
    #[error("element carries conflicting ids `{class_id}` and `{props_id}`")]
    ConflictingIds { class_id: String, props_id: String },
}

#[derive(Debug, Error)]
pub enum MergeError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("no managed markup found in the {version} version of component {component}")]
    MissingManagedRegion {
        component: String,
        version: &'static str,
    },
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("merge task failed: {0}")]
    Task(String),
}
