//! Forwards an invocation to the installed release binary.
//!
//! `Idle -> Resolving -> Spawned -> {Exited | Signaled | SpawnFailed}`:
//! [`locate_binary`] covers resolving, [`run`] spawns and waits, and
//! [`Termination::exit`] turns the child's fate into this process's fate.

use crate::config::BINARIES_DIR_NAME;
use crate::error::ShimError;
use crate::types::*;
use anyhow::Result;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// How the child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Exited(i32),
    Signaled(i32),
}

impl Termination {
    pub fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Termination::Exited(code);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Termination::Signaled(signal);
            }
        }

        Termination::Exited(1)
    }

    /// Ends the current process the same way the child ended.
    pub fn exit(self) -> ! {
        match self {
            Termination::Exited(code) => std::process::exit(code),
            Termination::Signaled(signal) => {
                tracing::debug!("Child terminated by signal {}, re-raising", signal);
                #[cfg(unix)]
                raise_default(signal);
                std::process::exit(128 + signal)
            }
        }
    }
}

#[cfg(unix)]
fn raise_default(signal: i32) {
    use nix::sys::signal::{self, SigHandler, Signal};

    let Ok(named) = Signal::try_from(signal) else {
        // Realtime signals have no `Signal` variant
        // SAFETY: SIG_DFL installs no handler and raise only targets this thread
        let raised = unsafe {
            libc::signal(signal, libc::SIG_DFL);
            libc::raise(signal)
        };
        if raised != 0 {
            tracing::warn!(
                "Could not re-raise signal {}: {}",
                signal,
                std::io::Error::last_os_error()
            );
        }
        return;
    };

    // SIGKILL refuses a new disposition but is still delivered by raise
    // SAFETY: restoring the default disposition installs no Rust handler
    if let Err(e) = unsafe { signal::signal(named, SigHandler::SigDfl) } {
        tracing::debug!("Could not reset {} to its default action: {}", named, e);
    }
    if let Err(e) = signal::raise(named) {
        tracing::warn!("Could not re-raise {}: {}", named, e);
    }
}

/// Path of the installed executable, failing when it is not on disk.
pub fn locate_binary(
    root: &Path,
    layout: Layout,
    platform: &PlatformEntry,
    binary_name: &str,
) -> Result<PathBuf> {
    if layout == Layout::PerPlatform {
        let binaries_dir = root.join(BINARIES_DIR_NAME);
        if !binaries_dir.is_dir() {
            return Err(ShimError::DirectoryMissing { path: binaries_dir }.into());
        }
    }

    let location = InstallLocation::new(root, layout, platform, binary_name);
    let binary_path = location.executable_path();
    tracing::debug!("Expecting binary at {}", binary_path.display());

    if !binary_path.is_file() {
        return Err(ShimError::BinaryMissing { path: binary_path }.into());
    }

    ensure_executable(&binary_path);
    Ok(binary_path)
}

/// Best-effort `chmod 755`; a failure is logged and otherwise ignored.
pub fn ensure_executable(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let result = std::fs::metadata(path).and_then(|meta| {
            let mut perms = meta.permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(path, perms)
        });
        if let Err(e) = result {
            tracing::debug!("Could not mark {} executable: {}", path.display(), e);
        }
    }

    #[cfg(not(unix))]
    let _ = path;
}

/// Spawns `binary_path` with `args`, inheriting stdio, and waits for it.
pub fn run<I>(binary_path: &Path, args: I) -> Result<Termination>
where
    I: IntoIterator<Item = OsString>,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let mut cmd = Command::new(binary_path);
    cmd.args(&args);

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        cmd.creation_flags(CREATE_NO_WINDOW);
    }

    tracing::debug!("Executing: {:?} {:?}", binary_path, args);

    let mut child = cmd.spawn().map_err(|source| ShimError::Spawn {
        path: binary_path.to_path_buf(),
        source,
    })?;
    let status = child.wait().map_err(|source| ShimError::Spawn {
        path: binary_path.to_path_buf(),
        source,
    })?;

    let termination = Termination::from_status(status);
    tracing::debug!("Child finished: {:?}", termination);
    Ok(termination)
}
