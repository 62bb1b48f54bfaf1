// Expose BUILD_VERSION as `<package version>-<short commit hash>`

use std::process::Command;

fn commit_hash() -> String {
    if let Ok(hash) = std::env::var("REELCHAIN_COMMIT_HASH") {
        return hash.chars().take(7).collect();
    }

    match Command::new("git").args(["rev-parse", "--short", "HEAD"]).output() {
        Ok(output) if output.status.success() => {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        }
        _ => "unknown".to_string(),
    }
}

fn main() {
    let build_version = format!("{}-{}", env!("CARGO_PKG_VERSION"), commit_hash());
    println!("cargo:rerun-if-env-changed=REELCHAIN_COMMIT_HASH");
    println!("cargo:rustc-env=BUILD_VERSION={build_version}");
}
