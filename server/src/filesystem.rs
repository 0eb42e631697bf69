use std::{fs, io, path::Path};

/// Filesystem operations the response builder depends on.
pub trait FileSystem: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn is_regular_file(&self, path: &Path) -> bool;

    fn read_bytes(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Lines without their terminators.
    fn read_lines(&self, path: &Path) -> io::Result<Vec<String>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_regular_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_bytes(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn read_lines(&self, path: &Path) -> io::Result<Vec<String>> {
        Ok(fs::read_to_string(path)?.lines().map(str::to_string).collect())
    }
}
