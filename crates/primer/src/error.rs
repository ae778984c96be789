//! CLI error types.

use primer_render::RenderError;
use primer_repo::RepoError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Render(#[from] RenderError),

    #[error("{0}")]
    Repo(#[from] RepoError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),
}
