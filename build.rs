use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn main() {
    let commit = git(&["rev-parse", "--short", "HEAD"]).unwrap_or_else(|| "unknown".to_string());
    let branch = git(&["branch", "--show-current"]).unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=VCT_GIT_COMMIT={}", commit);
    println!("cargo:rustc-env=VCT_GIT_BRANCH={}", branch);

    // Release builds are cut from a tagged HEAD
    if let Some(tag) = git(&["tag", "--points-at", "HEAD"]) {
        println!("cargo:rustc-env=VCT_GIT_TAG={}", tag);
    }

    if git(&["status", "--porcelain"]).is_some() {
        println!("cargo:rustc-env=VCT_GIT_DIRTY=1");
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-changed=.git/index");
}
