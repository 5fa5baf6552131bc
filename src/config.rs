use crate::types::*;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const BINARY_NAME: &str = "rust_template";
pub const LAUNCHER_NAME: &str = "vct";
pub const RELEASE_HOST: &str = "github.com";
pub const RELEASE_REPO: &str = "Mai0313/rust_template";
pub const USER_AGENT: &str = "rust_template-installer";
pub const BINARIES_DIR_NAME: &str = "binaries";
pub const BIN_DIR_NAME: &str = "bin";
pub const SETTINGS_FILE_NAME: &str = "shim.json";

/// Package root: the parent of the directory holding the running executable.
///
/// Both binaries ship in `<root>/bin/`, so this is the same directory for the
/// installer and the launcher.
pub fn get_package_root() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Could not determine the current executable")?;
    let root = exe
        .parent()
        .and_then(Path::parent)
        .ok_or_else(|| anyhow::anyhow!("Executable {} has no package root", exe.display()))?
        .to_path_buf();
    tracing::debug!("Package root: {}", root.display());
    Ok(root)
}

pub fn get_settings_file_path(root: &Path) -> PathBuf {
    root.join(SETTINGS_FILE_NAME)
}

/// Loads `shim.json` from the package root, falling back to defaults when
/// the file does not exist.
pub fn load_settings(root: &Path) -> Result<ShimSettings> {
    let settings_path = get_settings_file_path(root);

    if !settings_path.exists() {
        tracing::debug!(
            "No settings file at {}, using defaults",
            settings_path.display()
        );
        return Ok(ShimSettings::default());
    }

    let content = fs::read_to_string(&settings_path).with_context(|| {
        format!(
            "Could not read settings file at {}",
            settings_path.display()
        )
    })?;

    let settings: ShimSettings = serde_json::from_str(&content).with_context(|| {
        format!(
            "Could not parse settings file {} as JSON",
            settings_path.display()
        )
    })?;

    Ok(settings)
}
