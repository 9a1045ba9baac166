//! Errors raised while reading blog content

use std::path::PathBuf;
use thiserror::Error;

/// Failures of the content repository.
///
/// A missing content directory or a missing post file is not an error;
/// those come back as an empty list or `None`.
#[derive(Error, Debug)]
pub enum ContentError {
    /// An externally supplied slug failed the allow-list check
    #[error("Invalid slug format: {0:?} (only alphanumeric characters, hyphens and underscores are allowed)")]
    InvalidSlugFormat(String),

    /// The file exists but its metadata header cannot be decoded
    #[error("Malformed front-matter in {path:?}: {source}")]
    MalformedFrontMatter {
        path: PathBuf,
        #[source]
        source: FrontMatterError,
    },

    /// A filesystem failure other than "does not exist"
    #[error("Failed to read {path:?}: {source}")]
    ContentRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a front-matter block could not be decoded
#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("front-matter block has no closing `---` line")]
    Unterminated,

    #[error("unsupported front-matter language {0:?}")]
    UnsupportedLanguage(String),

    #[error("front-matter must be a mapping of keys to values")]
    NotAMapping,

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ContentError {
    /// Whether the error was caused by caller input rather than by the content store
    pub fn is_client_error(&self) -> bool {
        matches!(self, ContentError::InvalidSlugFormat(_))
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, source: FrontMatterError) -> Self {
        ContentError::MalformedFrontMatter {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ContentError::ContentRead {
            path: path.into(),
            source,
        }
    }
}

pub type ContentResult<T> = std::result::Result<T, ContentError>;
