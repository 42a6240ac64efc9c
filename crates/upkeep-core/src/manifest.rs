use std::path::{Component, Path, PathBuf};

use log::warn;
use serde::Deserialize;

use crate::error::UpdateError;
use crate::store::BOOTSTRAP_VERSION;

/// File suffix marking an entry as the application's main executable.
pub const EXECUTABLE_SUFFIX: &str = ".exe";

/// One file of a release: where it lives after the update and where to
/// fetch it from.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub download_url: String,
    #[serde(default)]
    pub previous_name: Option<String>,
}

impl FileEntry {
    /// Install target relative to the installation root, with leading
    /// separators stripped. `None` for unnamed entries and for names that
    /// try to escape the root via `..`.
    #[must_use]
    pub fn target_path(&self) -> Option<&Path> {
        sanitize(&self.name)
    }

    /// Whether this entry is the main executable, by naming convention.
    #[must_use]
    pub fn is_executable(&self) -> bool {
        self.name.ends_with(EXECUTABLE_SUFFIX)
    }

    /// Where the current installation of this entry lives, for backup
    /// purposes. Executables without an explicit `previous_name` are
    /// assumed to sit at `{current version}.exe`, tying the on-disk
    /// executable name to the last recorded version string.
    #[must_use]
    pub fn backup_source(&self, current_version: &str) -> Option<PathBuf> {
        if self.name.is_empty() {
            return None;
        }
        if self.is_executable() {
            match &self.previous_name {
                Some(previous) => sanitize(previous).map(Path::to_path_buf),
                None => Some(PathBuf::from(format!(
                    "{current_version}{EXECUTABLE_SUFFIX}"
                ))),
            }
        } else {
            sanitize(&self.name).map(Path::to_path_buf)
        }
    }
}

fn sanitize(name: &str) -> Option<&Path> {
    let name = name.trim_start_matches('/');
    if name.is_empty() {
        return None;
    }
    let path = Path::new(name);
    if path
        .components()
        .any(|component| matches!(component, Component::ParentDir))
    {
        warn!("Skipping manifest entry with unsafe path: {name}");
        return None;
    }
    Some(path)
}

/// The remote release manifest. Fetched fresh on every check, never
/// persisted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

impl Manifest {
    /// The advertised release version, trimmed. A manifest without a
    /// `version` field reports the bootstrap sentinel, which never
    /// compares newer than an installed release.
    #[must_use]
    pub fn version(&self) -> &str {
        self.version
            .as_deref()
            .map_or(BOOTSTRAP_VERSION, str::trim)
    }
}

/// Fetch and parse the release manifest.
///
/// # Errors
/// Returns `ManifestFetch` carrying the HTTP status on any non-success
/// response, `ManifestParse` when the body is not valid JSON, and `Http`
/// when the request itself fails.
pub async fn fetch(client: &reqwest::Client, url: &str) -> Result<Manifest, UpdateError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|error| UpdateError::http("manifest request failed", error))?;

    let status = response.status();
    if !status.is_success() {
        return Err(UpdateError::ManifestFetch { status });
    }

    let manifest: Manifest = response
        .json()
        .await
        .map_err(|error| UpdateError::ManifestParse { source: error })?;

    if manifest.version.is_none() {
        warn!("Manifest at {url} has no version field, assuming {BOOTSTRAP_VERSION}");
    }

    Ok(manifest)
}
