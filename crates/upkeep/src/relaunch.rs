use anyhow::Context as _;
use log::info;

use upkeep_core::manifest;
use upkeep_core::UpdateConfig;

/// Start the freshly installed main executable, assumed to be the first
/// file in the manifest. Invoked only after the engine reports success;
/// stopping the old instance is the operator's concern.
pub async fn relaunch_main_executable(
    client: &reqwest::Client,
    config: &UpdateConfig,
) -> anyhow::Result<()> {
    let url = config
        .manifest_url
        .as_deref()
        .context("manifest URL not configured")?;
    let manifest = manifest::fetch(client, url).await?;

    let target = manifest
        .files
        .first()
        .and_then(manifest::FileEntry::target_path)
        .context("manifest lists no launchable file")?;
    let exe = config.install_root.join(target);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755));
    }

    std::process::Command::new(&exe)
        .spawn()
        .with_context(|| format!("failed to relaunch {}", exe.display()))?;
    info!("Relaunched {}", exe.display());
    Ok(())
}
