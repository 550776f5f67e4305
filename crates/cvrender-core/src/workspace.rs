//! Scoped temporary workspace
//!
//! Holds the canonical payload and the files the services write. The
//! directory is removed when the workspace is dropped.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use crate::error::{RenderError, Result};

/// File name of the canonical payload inside a workspace
pub const INPUT_FILE: &str = "cv.json";

/// A temporary directory owned by one render
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a fresh workspace under the system temporary directory
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("cvrender-")
            .tempdir()
            .map_err(|e| RenderError::internal(format!("Failed to create workspace: {}", e)))?;
        debug!(path = %dir.path().display(), "created workspace");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where the canonical payload is written
    pub fn input_path(&self) -> PathBuf {
        self.dir.path().join(INPUT_FILE)
    }

    /// Path of a file inside the workspace
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removed_on_drop() {
        let workspace = Workspace::new().unwrap();
        let root = workspace.path().to_path_buf();
        std::fs::write(workspace.file("scratch.txt"), "x").unwrap();
        assert!(root.is_dir());
        assert_eq!(workspace.input_path(), root.join("cv.json"));

        drop(workspace);
        assert!(!root.exists());
    }
}
