use std::path::Path;

use anyhow::Context as _;
use upkeep_core::UpdateConfig;

/// Load the updater configuration file. Unlike the version record, a
/// missing config file is a hard error: there is nothing sensible to
/// update without a manifest URL.
pub fn load(path: &Path) -> anyhow::Result<UpdateConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("invalid configuration in {}", path.display()))
}
