// Shared test helpers for pipeline and dump tests.
//
// Stub tools are small /bin/sh scripts written into a temp directory; the
// fake shell prepends that directory to PATH so the real dump tools are never
// needed.

#![allow(dead_code)] // Each test binary uses a different subset

use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;

/// Creates an empty scratch directory.
pub fn scratch() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// Writes an executable script `name` into `dir`.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("Failed to write script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to chmod script");
    path
}

/// A shell wrapper that puts `bin_dir` first on PATH, then runs `/bin/sh`.
#[cfg(unix)]
pub fn shell_with_path(dir: &Path, bin_dir: &Path) -> PathBuf {
    write_script(
        dir,
        "stub-sh",
        &format!(
            "PATH='{}':\"$PATH\"\nexport PATH\nexec /bin/sh \"$@\"",
            bin_dir.display()
        ),
    )
}

/// Number of entries in `dir`.
pub fn entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).expect("Failed to read dir").count()
}

/// Waits long enough for a backgrounded `sleep` in a stub to have fired.
pub async fn settle(duration: Duration) {
    tokio::time::sleep(duration).await;
}
