use std::io::{self, Write as _};
use std::path::Path;

use chrono::Local;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::UpdateError;

/// Version string a fresh installation reports before any update has
/// ever been recorded.
pub const BOOTSTRAP_VERSION: &str = "v0";

/// The persisted marker of which version is currently installed.
///
/// Written only after every manifest file has been installed, so a record
/// claiming a version implies that version's files all landed on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    #[serde(default = "bootstrap_version")]
    pub version: String,
    #[serde(default)]
    pub installed_on: String,
    #[serde(default)]
    pub previous_version: String,
}

impl Default for VersionRecord {
    fn default() -> Self {
        Self {
            version: bootstrap_version(),
            installed_on: String::new(),
            previous_version: String::new(),
        }
    }
}

fn bootstrap_version() -> String {
    BOOTSTRAP_VERSION.to_string()
}

/// Read the version record, falling back to the bootstrap default when the
/// file does not exist yet.
///
/// # Errors
/// Returns an error when the file exists but cannot be read or parsed.
pub fn load(path: &Path) -> Result<VersionRecord, UpdateError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => serde_json::from_str(&contents)
            .map_err(|error| UpdateError::record("failed to parse version record", error)),
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            debug!("No version record at {}, assuming first run", path.display());
            Ok(VersionRecord::default())
        }
        Err(error) => Err(UpdateError::fs_with_path(
            "failed to read version record",
            path,
            &error,
        )),
    }
}

/// Record a completed update.
///
/// The record is staged in a temp file next to the target and renamed into
/// place, so a crash mid-write never leaves invalid JSON behind.
///
/// # Errors
/// Returns an error when the record cannot be serialized or persisted.
pub fn save(
    path: &Path,
    new_version: &str,
    current_version: &str,
) -> Result<VersionRecord, UpdateError> {
    let record = VersionRecord {
        version: new_version.to_string(),
        installed_on: Local::now().to_rfc3339(),
        previous_version: current_version.to_string(),
    };
    let json = serde_json::to_string_pretty(&record)
        .map_err(|error| UpdateError::record("failed to serialize version record", error))?;

    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|error| {
        UpdateError::fs_with_path("failed to stage version record", path, &error)
    })?;
    temp.write_all(json.as_bytes())
        .map_err(|error| UpdateError::fs_with_path("failed to write version record", path, &error))?;
    temp.persist(path).map_err(|error| {
        UpdateError::fs_with_path("failed to persist version record", path, &error.error)
    })?;

    debug!("Recorded version {new_version} at {}", path.display());
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::{BOOTSTRAP_VERSION, VersionRecord, load, save};

    #[test]
    fn load_missing_file_returns_bootstrap_default() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let record = load(&temp.path().join("version.json")).expect("load should not fail");

        assert_eq!(record.version, BOOTSTRAP_VERSION);
        assert_eq!(record.installed_on, "");
        assert_eq!(record.previous_version, "");
    }

    #[test]
    fn load_rejects_invalid_json() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let path = temp.path().join("version.json");
        std::fs::write(&path, "{not json").expect("fixture should be written");

        assert!(load(&path).is_err());
    }

    #[test]
    fn save_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let path = temp.path().join("version.json");

        let saved = save(&path, "v1.1", "v1.0").expect("save should succeed");
        let loaded = load(&path).expect("load should succeed");

        assert_eq!(loaded, saved);
        assert_eq!(loaded.version, "v1.1");
        assert_eq!(loaded.previous_version, "v1.0");
        assert!(!loaded.installed_on.is_empty());
    }

    #[test]
    fn save_overwrites_previous_record() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let path = temp.path().join("version.json");

        save(&path, "v1.1", "v1.0").expect("first save should succeed");
        save(&path, "v1.2", "v1.1").expect("second save should succeed");

        let loaded = load(&path).expect("load should succeed");
        assert_eq!(loaded.version, "v1.2");
        assert_eq!(loaded.previous_version, "v1.1");
    }

    #[test]
    fn save_leaves_no_stray_temp_files() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let path = temp.path().join("version.json");

        save(&path, "v2.0", "v1.0").expect("save should succeed");

        let entries: Vec<_> = std::fs::read_dir(temp.path())
            .expect("directory should be readable")
            .map(|entry| entry.expect("entry should be readable").file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("version.json")]);
    }

    #[test]
    fn partial_record_fills_defaults() {
        let record: VersionRecord =
            serde_json::from_str(r#"{"version": "v1.3"}"#).expect("partial record should parse");
        assert_eq!(record.version, "v1.3");
        assert_eq!(record.installed_on, "");
    }
}
