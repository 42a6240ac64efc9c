use std::io;
use std::path::Path;

use reqwest::StatusCode;
use thiserror::Error;

use crate::version::VersionParseError;

/// Everything that can abort an update run.
///
/// Manifest and version errors surface before any mutation. `Download`
/// aborts mid-install: files written so far keep their new content, the
/// version record is not touched, and the backup created just before
/// installation is the recovery path.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error(transparent)]
    Version(#[from] VersionParseError),

    #[error("configuration error: {reason}")]
    Configuration { reason: &'static str },

    #[error("failed to fetch manifest: HTTP {status}")]
    ManifestFetch { status: StatusCode },

    #[error("failed to parse manifest: {source}")]
    ManifestParse {
        #[source]
        source: reqwest::Error,
    },

    #[error("download failed for {file}: HTTP {status}")]
    Download { file: String, status: StatusCode },

    #[error("{context}: {source}")]
    Http {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{context}: {source}")]
    Filesystem {
        context: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("{context}: {source}")]
    Record {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl UpdateError {
    pub(crate) fn http(context: &'static str, source: reqwest::Error) -> Self {
        Self::Http { context, source }
    }

    pub(crate) fn fs(context: &'static str, source: io::Error) -> Self {
        Self::Filesystem { context, source }
    }

    pub(crate) fn fs_with_path(context: &'static str, path: &Path, source: &io::Error) -> Self {
        Self::fs(
            context,
            io::Error::new(source.kind(), format!("{}: {source}", path.display())),
        )
    }

    pub(crate) fn record(context: &'static str, source: serde_json::Error) -> Self {
        Self::Record { context, source }
    }
}
