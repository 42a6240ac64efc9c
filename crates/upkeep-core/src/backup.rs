use std::path::Path;

use log::{debug, info};

use crate::error::UpdateError;
use crate::manifest::{EXECUTABLE_SUFFIX, Manifest};

/// Snapshot every file the manifest is about to overwrite into
/// `backup_dir`, plus the version record itself.
///
/// The backup directory is recreated from scratch, so exactly one backup
/// generation exists at a time. Executables are moved (the original is
/// gone afterwards, so the install step cannot leave a stale copy behind);
/// everything else is copied. Sources that do not exist are skipped.
///
/// Relative paths mirror under `backup_dir`; `root` anchors both the
/// sources and, when they are relative, `backup_dir` and `version_file`.
///
/// # Errors
/// Returns `Filesystem` when recreating the directory or copying/moving an
/// existing source fails.
pub fn snapshot(
    root: &Path,
    backup_dir: &Path,
    manifest: &Manifest,
    current_version: &str,
    version_file: &Path,
) -> Result<(), UpdateError> {
    let backup_root = root.join(backup_dir);
    if backup_root.exists() {
        std::fs::remove_dir_all(&backup_root).map_err(|error| {
            UpdateError::fs_with_path("failed to clear previous backup", &backup_root, &error)
        })?;
    }
    std::fs::create_dir_all(&backup_root).map_err(|error| {
        UpdateError::fs_with_path("failed to create backup directory", &backup_root, &error)
    })?;

    for entry in &manifest.files {
        let Some(source) = entry.backup_source(current_version) else {
            continue;
        };
        back_up_file(root, &backup_root, &source)?;
    }

    // The record is part of the recovery story even though no manifest
    // entry names it.
    if root.join(version_file).exists() {
        back_up_file(root, &backup_root, version_file)?;
    }

    Ok(())
}

fn back_up_file(root: &Path, backup_root: &Path, relative: &Path) -> Result<(), UpdateError> {
    let source = root.join(relative);
    if !source.exists() {
        debug!("Backup source {} does not exist, skipping", source.display());
        return Ok(());
    }

    let dest = backup_root.join(relative);
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|error| {
            UpdateError::fs_with_path("failed to create backup subdirectory", parent, &error)
        })?;
    }

    let is_executable = relative
        .to_string_lossy()
        .to_ascii_lowercase()
        .ends_with(EXECUTABLE_SUFFIX);
    if is_executable {
        move_file(&source, &dest)?;
        info!("Moved {} to {}", source.display(), dest.display());
    } else {
        std::fs::copy(&source, &dest).map_err(|error| {
            UpdateError::fs_with_path("failed to copy file into backup", &dest, &error)
        })?;
        info!("Copied {} to {}", source.display(), dest.display());
    }
    Ok(())
}

fn move_file(source: &Path, dest: &Path) -> Result<(), UpdateError> {
    if std::fs::rename(source, dest).is_ok() {
        return Ok(());
    }

    // Rename fails across filesystems; fall back to copy plus remove.
    std::fs::copy(source, dest).map_err(|error| {
        UpdateError::fs_with_path("failed to copy executable into backup", dest, &error)
    })?;
    std::fs::remove_file(source).map_err(|error| {
        UpdateError::fs_with_path("failed to remove original executable", source, &error)
    })?;
    Ok(())
}
