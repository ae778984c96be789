//! Rendering error type.

use std::path::PathBuf;

use primer_docx::DocxError;

/// Errors raised by the rendering pipeline.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Source or destination I/O failure, with the path involved.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The template path points at an existing directory.
    #[error("template path is a directory: {}", .0.display())]
    TemplateIsDirectory(PathBuf),

    /// Document package failure.
    #[error(transparent)]
    Docx(#[from] DocxError),
}

impl RenderError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
