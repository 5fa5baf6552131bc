//! Installer and launcher for the prebuilt `rust_template` release binaries.
//!
//! `vct-install` runs once after the package is installed and fetches the
//! archive matching this machine; `vct` then forwards every invocation to
//! the extracted executable.

pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod install;
pub mod launcher;
pub mod platform;
pub mod types;

pub use error::ShimError;

/// Installs the global `tracing` subscriber. Output always goes to stderr.
pub fn setup_logging(level: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();
}
