use std::path::PathBuf;
use thiserror::Error;

/// Every failure the installer and launcher can report.
///
/// All of them are terminal: the binaries print the message and exit with a
/// non-zero status. Library code raises them through `anyhow`, so callers
/// that need the kind use `downcast_ref::<ShimError>()`.
#[derive(Debug, Error)]
pub enum ShimError {
    #[error(
        "Unsupported platform: {os}-{arch}. Supported platforms: macOS (x64, arm64), Linux (x64, arm64), Windows (x64, arm64)"
    )]
    UnsupportedPlatform { os: String, arch: String },

    #[error("Binaries directory not found: {}", path.display())]
    DirectoryMissing { path: PathBuf },

    #[error("Binary not found for your platform: {}", path.display())]
    BinaryMissing { path: PathBuf },

    #[error("Failed to download {url}: HTTP {status}")]
    DownloadStatus { url: String, status: u16 },

    #[error("Failed to download {url}: HTTP {status} without a Location header")]
    MissingRedirectLocation { url: String, status: u16 },

    #[error("Failed to download {url}: more than {limit} redirects")]
    TooManyRedirects { url: String, limit: usize },

    #[error("Unsupported archive format: {}", path.display())]
    UnsupportedArchive { path: PathBuf },

    #[error("Failed to extract {}: {reason}", archive.display())]
    Extraction { archive: PathBuf, reason: String },

    #[error("Failed to start binary {}: {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid release version '{version}'")]
    InvalidVersion { version: String },
}
