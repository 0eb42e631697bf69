use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::TempDir;

use crate::{config::ServerConfig, errors::SharedError};

/// A throwaway document root that is removed when dropped.
pub struct TestDocumentRoot {
    dir: TempDir,
}

impl TestDocumentRoot {
    pub fn new() -> Result<Self, SharedError> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Root formatted the way the config file carries it, with a trailing
    /// separator so resource paths can be appended directly.
    pub fn root_string(&self) -> String {
        format!("{}/", self.dir.path().display())
    }

    pub fn add_file(&self, name: &str, contents: impl AsRef<[u8]>) -> Result<PathBuf, SharedError> {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn add_dir(&self, name: &str) -> Result<PathBuf, SharedError> {
        let path = self.dir.path().join(name);
        fs::create_dir_all(&path)?;
        Ok(path)
    }

    pub fn config(&self) -> ServerConfig {
        ServerConfig {
            root: self.root_string(),
            max_workers: 2,
            ..ServerConfig::default()
        }
    }
}
