//! Post-install download of the release binary.
//!
//! Resolves the platform, builds the release asset URL, downloads the
//! archive into the install directory, extracts the executable and removes
//! the archive again.

use crate::download::{download_file, extract_archive};
use crate::error::ShimError;
use crate::platform;
use crate::types::*;
use anyhow::{Context, Result};
use console::style;
use std::fs;
use std::path::{Path, PathBuf};

/// Platform entry for this machine; fails on unsupported combinations.
pub fn resolve_platform() -> Result<&'static PlatformEntry> {
    platform::current()
}

/// `<binary>-v<version>-<tag>.<zip|tar.gz>`
pub fn archive_name(binary_name: &str, version: &str, platform: &PlatformEntry) -> String {
    format!(
        "{}-v{}-{}.{}",
        binary_name,
        version,
        platform.tag,
        platform.archive_ext()
    )
}

/// `<releases_base>/v<version>/<archive_name>`
pub fn build_download_url(
    releases_base: &str,
    binary_name: &str,
    version: &str,
    platform: &PlatformEntry,
) -> String {
    format!(
        "{}/v{}/{}",
        releases_base.trim_end_matches('/'),
        version,
        archive_name(binary_name, version, platform)
    )
}

/// Accepts `1.2.3` or `v1.2.3` and returns the bare semver string.
pub fn normalize_version(version: &str) -> Result<String> {
    let bare = version.trim().trim_start_matches('v');
    semver::Version::parse(bare).map_err(|_| ShimError::InvalidVersion {
        version: version.to_string(),
    })?;
    Ok(bare.to_string())
}

pub struct Installer {
    pub settings: ShimSettings,
    pub platform: &'static PlatformEntry,
    /// Package root the install location is computed from
    pub root: PathBuf,
    /// Replaces `settings.releases_base()` when set
    pub base_url: Option<String>,
}

impl Installer {
    pub fn new(settings: ShimSettings, platform: &'static PlatformEntry, root: &Path) -> Self {
        Self {
            settings,
            platform,
            root: root.to_path_buf(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn location(&self) -> InstallLocation {
        InstallLocation::new(
            &self.root,
            self.settings.layout,
            self.platform,
            &self.settings.binary_name,
        )
    }

    pub fn download_url(&self, version: &str) -> String {
        let base = self
            .base_url
            .clone()
            .unwrap_or_else(|| self.settings.releases_base());
        build_download_url(&base, &self.settings.binary_name, version, self.platform)
    }

    /// Downloads and extracts the release binary, returning its final path.
    pub async fn install(&self) -> Result<PathBuf> {
        let version = normalize_version(&self.settings.version)?;
        let binary_name = &self.settings.binary_name;
        let location = self.location();

        println!(
            "Installing {} v{} for {}...",
            binary_name, version, self.platform.tag
        );

        if !location.dir.exists() {
            fs::create_dir_all(&location.dir).with_context(|| {
                format!("Could not create directory {}", location.dir.display())
            })?;
        }

        let archive_path = location
            .dir
            .join(archive_name(binary_name, &version, self.platform));
        let url = self.download_url(&version);

        println!("Downloading: {}", url);
        download_file(&url, &archive_path).await?;
        println!("Download complete!");

        println!("Extracting binary...");
        let executable_path =
            extract_archive(&archive_path, &location.dir, &location.executable_name)?;

        fs::remove_file(&archive_path)
            .with_context(|| format!("Could not remove archive {}", archive_path.display()))?;

        println!(
            "{} Successfully installed {} to {}",
            style("✓").green(),
            binary_name,
            location.dir.display()
        );
        println!(
            "\nYou can now run: {}",
            style(format!("{} --help", crate::config::LAUNCHER_NAME)).bold()
        );

        tracing::info!("Installed {}", executable_path.display());
        Ok(executable_path)
    }
}
