use thiserror::Error;

/// Failure to obtain the base metadata for a project revision.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no sync metadata for project {project_id} at revision {revision}")]
    NotFound { project_id: String, revision: u64 },
    #[error("metadata io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed metadata: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Other(String),
}
