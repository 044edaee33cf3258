//! Test-case directory layout under a common root.
//!
//! Each case owns four subdirectories (source/target, in/out) addressed by the
//! suffixes from its definition. Files pair across directories by sorted-name
//! order, so listings are always returned sorted.

use crate::error::{FlowRegressError, Result};
use std::path::{Path, PathBuf};

/// Handle on the test-case root directory.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a case directory suffix.
    pub fn dir(&self, suffix: &str) -> PathBuf {
        self.root.join(suffix)
    }

    /// Absolute path of a file inside a case directory.
    pub fn file(&self, suffix: &str, file_name: &str) -> PathBuf {
        self.dir(suffix).join(file_name)
    }

    /// List the regular files in a case directory, sorted by file name.
    pub fn list_files(&self, suffix: &str) -> Result<Vec<PathBuf>> {
        let dir = self.dir(suffix);
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Delete every regular file directly inside a case directory.
    ///
    /// Creates the directory when it does not exist yet, so a fresh checkout
    /// of a test-case tree works without manual setup.
    pub fn clear_dir(&self, suffix: &str) -> Result<()> {
        let dir = self.dir(suffix);
        if !dir.exists() {
            std::fs::create_dir_all(&dir)?;
            return Ok(());
        }
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                std::fs::remove_file(entry.path())?;
            }
        }
        Ok(())
    }

    /// Persist an extracted payload, creating the directory as needed.
    pub fn write_payload(&self, suffix: &str, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.file(suffix, file_name);
        let persist = |path: &Path| -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, bytes)
        };
        persist(&path).map_err(|e| FlowRegressError::Persistence {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok(path)
    }
}

/// File an outbound injection request is dumped to when debugging is enabled.
pub fn debug_dump_path(debug_dir: &Path, flow_name: &str, message_id: &str) -> PathBuf {
    debug_dir.join(format!("{}_{}.txt", flow_name, message_id))
}
