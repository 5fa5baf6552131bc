use clap::Parser;
use console::style;
use vct_shim::cli::InstallCli;
use vct_shim::config::{get_package_root, load_settings};
use vct_shim::install::{resolve_platform, Installer};
use vct_shim::setup_logging;
use vct_shim::types::ShimSettings;

#[tokio::main]
async fn main() {
    let cli = InstallCli::parse();
    setup_logging(cli.log_level());

    let mut settings = ShimSettings::default();
    if let Err(e) = run(&cli, &mut settings).await {
        tracing::debug!("Installation error: {:?}", e);
        eprintln!("{} {:#}", style("Installation failed:").for_stderr().red().bold(), e);
        eprintln!("\nPlease install manually from:");
        eprintln!("{}", settings.manual_install_url());
        std::process::exit(1);
    }
}

/// Fills `settings` as it goes so the fallback URL reflects what was attempted.
async fn run(cli: &InstallCli, settings: &mut ShimSettings) -> anyhow::Result<()> {
    let platform = resolve_platform()?;

    let root = match &cli.root {
        Some(root) => root.clone(),
        None => get_package_root()?,
    };
    *settings = load_settings(&root)?;

    if let Some(release) = &cli.release {
        settings.version = release.trim_start_matches('v').to_string();
    }
    if let Some(layout) = cli.layout {
        settings.layout = layout.into();
    }

    Installer::new(settings.clone(), platform, &root)
        .with_base_url(cli.base_url.clone())
        .install()
        .await?;
    Ok(())
}
