use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced to callers of [`crate::api::runner::ApiRunner`].
///
/// Only playbook-level problems become errors. Host unreachability and task
/// failures are data, reported inside the run result instead of raised.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("playbook {} does not exist", path.display())]
    FileNotFound { path: PathBuf },
    #[error("invalid type {type_name} for parameter `{param}`")]
    InvalidParameter {
        param: &'static str,
        type_name: String,
    },
    #[error("failed to parse playbook: {msg}")]
    ParsePlaybook { msg: String },
    /// Any other engine-level failure, propagated unmodified.
    #[error(transparent)]
    Engine(#[from] anyhow::Error),
}
