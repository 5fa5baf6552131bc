use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A throwaway package root with the compiled binaries copied into `bin/`,
/// so that both resolve their package root to the temp directory.
#[allow(dead_code)]
pub struct TestContext {
    pub _temp_dir: TempDir,
    pub root: PathBuf,
    pub bin_dir: PathBuf,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        let bin_dir = root.join("bin");
        fs::create_dir_all(&bin_dir).expect("Failed to create bin dir");

        for (name, source) in [
            ("vct", env!("CARGO_BIN_EXE_vct")),
            ("vct-install", env!("CARGO_BIN_EXE_vct-install")),
        ] {
            let target = bin_dir.join(format!("{}{}", name, std::env::consts::EXE_SUFFIX));
            fs::copy(source, &target).expect("Failed to copy binary");
        }

        Self {
            _temp_dir: temp_dir,
            root,
            bin_dir,
        }
    }

    pub fn launcher(&self) -> Command {
        self.cmd("vct")
    }

    pub fn installer(&self) -> Command {
        self.cmd("vct-install")
    }

    fn cmd(&self, name: &str) -> Command {
        let mut cmd = Command::new(
            self.bin_dir
                .join(format!("{}{}", name, std::env::consts::EXE_SUFFIX)),
        );
        cmd.env_remove("RUST_LOG");
        cmd
    }

    pub fn write_settings(&self, json: &str) {
        fs::write(self.root.join("shim.json"), json).expect("Failed to write shim.json");
    }

    /// Writes a shell script that appends each argument on its own line to
    /// `args_file` and then runs `tail`.
    #[cfg(unix)]
    pub fn write_fake_binary(&self, path: &Path, args_file: &Path, tail: &str) {
        use std::os::unix::fs::PermissionsExt;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create binary dir");
        }
        let script = format!(
            "#!/bin/sh\nfor a in \"$@\"; do printf '%s\\n' \"$a\" >> '{}'; done\n{}\n",
            args_file.display(),
            tail
        );
        fs::write(path, script).expect("Failed to write fake binary");
        let mut perms = fs::metadata(path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms).unwrap();
    }
}

/// Runs `cmd` to completion, retrying while a freshly written executable is
/// still held open by a sibling test's fork (ETXTBSY).
#[allow(dead_code)]
pub fn run(cmd: &mut Command) -> CommandOutput {
    for _ in 0..10 {
        match cmd.output() {
            Ok(output) => {
                let output = CommandOutput::from(output);
                if !output.stderr.contains("Text file busy") {
                    return output;
                }
            }
            Err(e) if e.raw_os_error() == Some(26) => {}
            Err(e) => panic!("Failed to run {:?}: {}", cmd, e),
        }
        std::thread::sleep(std::time::Duration::from_millis(50));
    }
    panic!("{:?} kept failing with ETXTBSY", cmd);
}

#[allow(dead_code)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            status: output.status,
        }
    }
}

#[allow(dead_code)]
impl CommandOutput {
    pub fn assert_success(&self) -> &Self {
        if !self.status.success() {
            panic!(
                "Command failed with status {:?}\nstdout: {}\nstderr: {}",
                self.status.code(),
                self.stdout,
                self.stderr
            );
        }
        self
    }

    pub fn assert_code(&self, code: i32) -> &Self {
        assert_eq!(
            self.status.code(),
            Some(code),
            "Unexpected exit status\nstdout: {}\nstderr: {}",
            self.stdout,
            self.stderr
        );
        self
    }

    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Stdout did not contain '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }

    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Stderr did not contain '{}'\nActual stderr: {}",
            text,
            self.stderr
        );
        self
    }
}

/// Builds an in-memory `.tar.gz` with the given `(name, contents, mode)` members.
#[allow(dead_code)]
pub fn tar_gz(entries: &[(&str, &str, u32)]) -> Vec<u8> {
    use flate2::write::GzEncoder;
    use flate2::Compression;

    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, data, mode) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(*mode);
        header.set_cksum();
        builder
            .append_data(&mut header, name, data.as_bytes())
            .expect("Failed to append tar entry");
    }
    builder
        .into_inner()
        .and_then(|encoder| encoder.finish())
        .expect("Failed to finish archive")
}
