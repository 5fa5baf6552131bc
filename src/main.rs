use console::style;
use vct_shim::config::{get_package_root, load_settings};
use vct_shim::launcher::{locate_binary, run};
use vct_shim::{platform, setup_logging, ShimError};

fn main() {
    setup_logging("warn");

    let binary_path = match find_binary() {
        Ok(path) => path,
        Err(e) => {
            eprintln!("{} {}", style("Error:").for_stderr().red().bold(), e);
            if matches!(
                e.downcast_ref::<ShimError>(),
                Some(ShimError::DirectoryMissing { .. } | ShimError::BinaryMissing { .. })
            ) {
                eprintln!("Please reinstall the package.");
            }
            std::process::exit(1);
        }
    };

    match run(&binary_path, std::env::args_os().skip(1)) {
        Ok(termination) => termination.exit(),
        Err(e) => {
            eprintln!("{} {}", style("Failed to start binary:").for_stderr().red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn find_binary() -> anyhow::Result<std::path::PathBuf> {
    let platform = platform::current()?;
    let root = get_package_root()?;
    let settings = load_settings(&root)?;
    locate_binary(&root, settings.layout, platform, &settings.binary_name)
}
