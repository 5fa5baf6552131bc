use crate::error::ShimError;
use crate::types::*;
use anyhow::Result;

/// Every platform a release archive is published for.
pub static PLATFORMS: &[PlatformEntry] = &[
    PlatformEntry {
        os: "macos",
        arch: "x86_64",
        tag: "macos-x64",
        exe_suffix: "",
    },
    PlatformEntry {
        os: "macos",
        arch: "aarch64",
        tag: "macos-arm64",
        exe_suffix: "",
    },
    PlatformEntry {
        os: "linux",
        arch: "x86_64",
        tag: "linux-x64-gnu",
        exe_suffix: "",
    },
    PlatformEntry {
        os: "linux",
        arch: "aarch64",
        tag: "linux-arm64-gnu",
        exe_suffix: "",
    },
    PlatformEntry {
        os: "windows",
        arch: "x86_64",
        tag: "windows-x64",
        exe_suffix: ".exe",
    },
    PlatformEntry {
        os: "windows",
        arch: "aarch64",
        tag: "windows-arm64",
        exe_suffix: ".exe",
    },
];

fn normalize_os(os: &str) -> &str {
    match os {
        "darwin" | "osx" => "macos",
        "win32" => "windows",
        _ => os,
    }
}

fn normalize_arch(arch: &str) -> &str {
    match arch {
        "x64" | "amd64" => "x86_64",
        "arm64" => "aarch64",
        _ => arch,
    }
}

/// Looks up the platform entry for an (os, arch) pair.
///
/// Accepts Rust's `std::env::consts` spellings as well as the common
/// `darwin`/`win32` and `x64`/`amd64`/`arm64` aliases.
pub fn resolve(os: &str, arch: &str) -> Result<&'static PlatformEntry> {
    let os_lower = os.to_lowercase();
    let arch_lower = arch.to_lowercase();
    let wanted_os = normalize_os(&os_lower);
    let wanted_arch = normalize_arch(&arch_lower);

    tracing::trace!(
        "Resolving platform for OS: '{}', ARCH: '{}'",
        wanted_os,
        wanted_arch
    );

    PLATFORMS
        .iter()
        .find(|entry| entry.os == wanted_os && entry.arch == wanted_arch)
        .ok_or_else(|| {
            ShimError::UnsupportedPlatform {
                os: os.to_string(),
                arch: arch.to_string(),
            }
            .into()
        })
}

/// Platform entry for the machine this process is running on.
pub fn current() -> Result<&'static PlatformEntry> {
    resolve(std::env::consts::OS, std::env::consts::ARCH)
}
