use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures_util::StreamExt;
use log::info;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;

use crate::backup;
use crate::error::UpdateError;
use crate::manifest;
use crate::store;
use crate::version;

/// Configuration consumed by [`run_update`]. Deserializes straight from
/// the front-end's JSON config file.
///
/// Relative paths resolve against `install_root`, which defaults to the
/// working directory.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateConfig {
    #[serde(default = "default_version_file")]
    pub version_file: PathBuf,
    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,
    #[serde(default)]
    pub manifest_url: Option<String>,
    #[serde(default = "default_install_root")]
    pub install_root: PathBuf,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            version_file: default_version_file(),
            backup_dir: default_backup_dir(),
            manifest_url: None,
            install_root: default_install_root(),
        }
    }
}

fn default_version_file() -> PathBuf {
    PathBuf::from("version.json")
}

fn default_backup_dir() -> PathBuf {
    PathBuf::from(".backup")
}

fn default_install_root() -> PathBuf {
    PathBuf::from(".")
}

/// Terminal result of an update run that did not error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Every file installed and the new version was recorded.
    Updated { version: String },
    /// The remote release is not newer than the installed one.
    UpToDate,
    /// The caller declined the update at the confirmation point.
    Cancelled,
}

impl UpdateOutcome {
    #[must_use]
    pub fn updated(&self) -> bool {
        matches!(self, Self::Updated { .. })
    }
}

/// Caller-supplied interaction capability: the confirmation decision and a
/// progress/report channel. The blocking-console implementation lives in
/// the front-end; tests supply canned deciders.
#[async_trait]
pub trait UpdateReporter: Send + Sync {
    /// Decide whether to apply the update to `candidate`. This is the only
    /// suspension point of a run; returning `false` cancels before any
    /// mutation.
    async fn confirm(&self, candidate: &str) -> bool;

    /// Receive a human-readable progress message.
    fn report(&self, message: &str);
}

/// Run one end-to-end update: check, confirm, back up, install, commit.
///
/// Steps are strictly sequential and files install in manifest order. On a
/// mid-install failure, files already written keep their new content, the
/// version record stays at the old version, and the snapshot taken just
/// before installation is the operator's recovery path. The engine never
/// retries and never rolls back on its own.
///
/// # Errors
/// Returns one of the [`UpdateError`] kinds; see its docs for which phase
/// each belongs to.
pub async fn run_update(
    client: &reqwest::Client,
    config: &UpdateConfig,
    reporter: &dyn UpdateReporter,
) -> Result<UpdateOutcome, UpdateError> {
    let root = config.install_root.as_path();
    let version_path = root.join(&config.version_file);

    let record = store::load(&version_path)?;
    let current_version = record.version;
    reporter.report(&format!("Current version: {current_version}"));

    let manifest_url = config
        .manifest_url
        .as_deref()
        .ok_or(UpdateError::Configuration {
            reason: "manifest URL not specified in configuration",
        })?;

    let manifest = manifest::fetch(client, manifest_url).await?;
    let remote_version = manifest.version().to_string();
    reporter.report(&format!("Remote version: {remote_version}"));

    if version::compare(&remote_version, &current_version)? != Ordering::Greater {
        reporter.report("No update available.");
        return Ok(UpdateOutcome::UpToDate);
    }

    reporter.report("Update available!");
    if !reporter.confirm(&remote_version).await {
        info!("Update to {remote_version} declined");
        reporter.report("Update cancelled.");
        return Ok(UpdateOutcome::Cancelled);
    }

    reporter.report("Creating backup...");
    backup::snapshot(
        root,
        &config.backup_dir,
        &manifest,
        &current_version,
        &config.version_file,
    )?;

    reporter.report("Downloading new files...");
    for entry in &manifest.files {
        let Some(target) = entry.target_path() else {
            continue;
        };
        if entry.download_url.is_empty() {
            continue;
        }
        reporter.report(&format!("Updating {}...", target.display()));
        install_file(client, &entry.download_url, &root.join(target), target).await?;
        reporter.report(&format!("Updated {}", target.display()));
    }

    store::save(&version_path, &remote_version, &current_version)?;
    info!("Updated from {current_version} to {remote_version}");
    reporter.report(&format!("Update successful to version {remote_version}"));
    Ok(UpdateOutcome::Updated {
        version: remote_version,
    })
}

async fn install_file(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    name: &Path,
) -> Result<(), UpdateError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|error| UpdateError::http("file download request failed", error))?;

    let status = response.status();
    if !status.is_success() {
        return Err(UpdateError::Download {
            file: name.display().to_string(),
            status,
        });
    }

    if let Some(parent) = dest.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|error| {
            UpdateError::fs_with_path("failed to create target directory", parent, &error)
        })?;
    }

    let mut file = tokio::fs::File::create(dest).await.map_err(|error| {
        UpdateError::fs_with_path("failed to create target file", dest, &error)
    })?;

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|error| UpdateError::http("download stream error", error))?;
        file.write_all(&chunk).await.map_err(|error| {
            UpdateError::fs_with_path("failed to write downloaded data", dest, &error)
        })?;
    }

    file.flush().await.map_err(|error| {
        UpdateError::fs_with_path("failed to flush target file", dest, &error)
    })?;

    Ok(())
}
