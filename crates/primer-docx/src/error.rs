//! Package I/O error type.

use std::path::PathBuf;

/// Errors raised while loading or persisting a document package.
#[derive(Debug, thiserror::Error)]
pub enum DocxError {
    /// Filesystem failure, with the path involved.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The package container could not be read or written.
    #[error("{}: {source}", .path.display())]
    Container {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// A document part is not well-formed XML.
    #[error("malformed document part: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A document part holds text in an unsupported encoding.
    #[error("{0}")]
    Encoding(#[from] quick_xml::encoding::EncodingError),

    /// The package is missing a part the model requires.
    #[error("{}: missing package part {part}", .path.display())]
    MissingPart { path: PathBuf, part: &'static str },
}

impl DocxError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn container(path: impl Into<PathBuf>, source: zip::result::ZipError) -> Self {
        Self::Container {
            path: path.into(),
            source,
        }
    }
}
