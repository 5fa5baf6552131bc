use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One row of the supported-platform table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformEntry {
    /// Operating system as reported by `std::env::consts::OS`
    pub os: &'static str,
    /// CPU architecture as reported by `std::env::consts::ARCH`
    pub arch: &'static str,
    /// Canonical tag used in archive names and install subdirectories
    pub tag: &'static str,
    pub exe_suffix: &'static str,
}

impl PlatformEntry {
    pub fn is_windows(&self) -> bool {
        self.os == "windows"
    }

    /// File name of the executable on this platform.
    pub fn executable_name(&self, binary_name: &str) -> String {
        format!("{}{}", binary_name, self.exe_suffix)
    }

    /// Extension of the release archive, without the leading dot.
    pub fn archive_ext(&self) -> &'static str {
        if self.is_windows() {
            "zip"
        } else {
            "tar.gz"
        }
    }
}

/// How the installed binary is laid out under the package root.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    /// `binaries/<platform-tag>/<executable>`
    #[default]
    PerPlatform,
    /// `bin/<executable>`, next to the launcher
    Flat,
}

/// Where the executable lives (or will live) on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLocation {
    pub dir: PathBuf,
    pub executable_name: String,
}

impl InstallLocation {
    pub fn new(root: &Path, layout: Layout, platform: &PlatformEntry, binary_name: &str) -> Self {
        let dir = match layout {
            Layout::PerPlatform => root.join(crate::config::BINARIES_DIR_NAME).join(platform.tag),
            Layout::Flat => root.join(crate::config::BIN_DIR_NAME),
        };
        Self {
            dir,
            executable_name: platform.executable_name(binary_name),
        }
    }

    pub fn executable_path(&self) -> PathBuf {
        self.dir.join(&self.executable_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShimSettings {
    #[serde(default = "default_binary_name")]
    pub binary_name: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_repo")]
    pub repo: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub layout: Layout,
}

fn default_binary_name() -> String {
    crate::config::BINARY_NAME.to_string()
}
fn default_host() -> String {
    crate::config::RELEASE_HOST.to_string()
}
fn default_repo() -> String {
    crate::config::RELEASE_REPO.to_string()
}
fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

impl Default for ShimSettings {
    fn default() -> Self {
        Self {
            binary_name: default_binary_name(),
            host: default_host(),
            repo: default_repo(),
            version: default_version(),
            layout: Layout::default(),
        }
    }
}

impl ShimSettings {
    /// `https://<host>/<repo>/releases/download`
    pub fn releases_base(&self) -> String {
        format!("https://{}/{}/releases/download", self.host, self.repo)
    }

    /// Release page users are pointed at when the automatic install fails.
    pub fn manual_install_url(&self) -> String {
        format!(
            "https://{}/{}/releases/tag/v{}",
            self.host,
            self.repo,
            self.version.trim_start_matches('v')
        )
    }
}
