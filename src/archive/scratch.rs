//! Scratch path allocation.

use std::path::{Path, PathBuf};

use rand::Rng;

use crate::config::SCRATCH_SUFFIX_BYTES;

/// Directory that holds intermediate archives.
///
/// Shared by every concurrent pipeline. Names carry 64 random bits, so two
/// pipelines never target the same file and no locking is needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchDir {
    root: PathBuf,
}

impl ScratchDir {
    /// Uses `root` as the scratch directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Uses the platform temporary directory.
    pub fn system() -> Self {
        Self::new(std::env::temp_dir())
    }

    /// Directory the paths are allocated in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns `<root>/<prefix>-<random hex>.<extension>`.
    ///
    /// The file is not created. A leading dot on `extension` is ignored and an
    /// empty extension yields a name without one.
    pub fn new_path(&self, prefix: &str, extension: &str) -> PathBuf {
        let suffix = random_hex(SCRATCH_SUFFIX_BYTES);
        let extension = extension.trim_start_matches('.');
        let name = if extension.is_empty() {
            format!("{}-{}", prefix, suffix)
        } else {
            format!("{}-{}.{}", prefix, suffix, extension)
        };
        self.root.join(name)
    }
}

impl Default for ScratchDir {
    fn default() -> Self {
        Self::system()
    }
}

fn random_hex(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::rng().fill(&mut bytes[..]);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
