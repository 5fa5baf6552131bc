use crate::types::Layout;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

fn get_version() -> &'static str {
    const BASE_VERSION: &str = env!("CARGO_PKG_VERSION");

    if let Some(tag) = option_env!("VCT_GIT_TAG") {
        if option_env!("VCT_GIT_DIRTY").is_none() {
            return tag;
        }
    }

    let commit = option_env!("VCT_GIT_COMMIT").unwrap_or("unknown");
    let branch = option_env!("VCT_GIT_BRANCH").unwrap_or("unknown");
    let dirty = if option_env!("VCT_GIT_DIRTY").is_some() {
        "-dirty"
    } else {
        ""
    };

    // Leaked once at startup so clap can hold a 'static str
    let version = format!("v{}-{}{} ({})", BASE_VERSION, commit, dirty, branch);
    Box::leak(version.into_boxed_str())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LayoutArg {
    /// binaries/<platform>/<binary>
    PerPlatform,
    /// bin/<binary>
    Flat,
}

impl From<LayoutArg> for Layout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::PerPlatform => Layout::PerPlatform,
            LayoutArg::Flat => Layout::Flat,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "vct-install")]
#[command(about = "Download the rust_template release binary for this platform")]
#[command(version = get_version())]
pub struct InstallCli {
    /// Increase verbosity (use multiple times for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Reduce output to errors only
    #[arg(short, long)]
    pub quiet: bool,

    /// Package root to install into (defaults to the parent of this executable's directory)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Release version to install instead of the package version (e.g. '1.2.3')
    #[arg(long)]
    pub release: Option<String>,

    /// Where to place the binary under the package root
    #[arg(long, value_enum)]
    pub layout: Option<LayoutArg>,

    /// Base URL that release assets are served from
    #[arg(long)]
    pub base_url: Option<String>,
}

impl InstallCli {
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose == 0 {
            "warn"
        } else if self.verbose == 1 {
            "info"
        } else {
            "debug"
        }
    }
}
