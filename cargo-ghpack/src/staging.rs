use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::error::Result;

/// Subdirectory holding the shell completion scripts
pub const COMPLETE_DIR: &str = "complete";

/// A temporary directory laid out as `<tmp>/<name>/complete/`.
///
/// The whole tree is removed when the value is dropped, so every exit path
/// of the packager releases it.
pub struct StagingTree {
    temp_dir: TempDir,
    name: String,
    root: PathBuf,
}

impl StagingTree {
    /// Create a fresh staging tree under `parent`, or the system temporary
    /// directory when `parent` is `None`
    pub fn create(parent: Option<&Path>, name: &str) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("ghpack.");
        let temp_dir = match parent {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };

        let root = temp_dir.path().join(name);
        fs::create_dir_all(root.join(COMPLETE_DIR))?;
        tracing::debug!("Created staging tree: {}", root.display());

        Ok(Self {
            temp_dir,
            name: name.to_string(),
            root,
        })
    }

    /// The temporary directory containing the tree
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// `<tmp>/<name>`
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn complete_dir(&self) -> PathBuf {
        self.root.join(COMPLETE_DIR)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Remove the tree, reporting any failure
    pub fn close(self) -> Result<()> {
        let path = self.temp_dir.path().to_path_buf();
        self.temp_dir.close()?;
        tracing::debug!("Removed staging tree: {}", path.display());
        Ok(())
    }
}
