//! Filesystem storer: one file per target name inside a folder.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::Storer;

/// Stores targets as files under `folder`. The folder (and any missing
/// parents) is created on first write. An empty folder means the current
/// directory.
#[derive(Debug, Clone)]
pub struct FileStorer {
    folder: PathBuf,
}

impl FileStorer {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Full path of `name` inside the folder.
    pub fn path(&self, name: &str) -> PathBuf {
        self.folder.join(name)
    }

    fn ensure_folder(&self) -> io::Result<()> {
        if self.folder.as_os_str().is_empty() {
            return Ok(());
        }
        fs::create_dir_all(&self.folder)
    }

    /// Opens `name` for writing, truncating any previous contents.
    pub fn create(&self, name: &str) -> io::Result<fs::File> {
        self.ensure_folder()?;
        fs::File::create(self.path(name))
    }

    /// Removes the folder and everything in it. Missing folder is not an error.
    pub fn remove_folder(&self) -> io::Result<()> {
        match fs::remove_dir_all(&self.folder) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

impl Storer for FileStorer {
    fn append(&self, name: &str, data: &[u8]) -> io::Result<()> {
        self.ensure_folder()?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path(name))?;
        file.write_all(data)
    }

    fn get(&self, name: &str) -> io::Result<Vec<u8>> {
        fs::read(self.path(name))
    }

    fn remove(&self, name: &str) -> io::Result<()> {
        match fs::remove_file(self.path(name)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    fn rename(&self, from: &str, to: &str) -> io::Result<()> {
        fs::rename(self.path(from), self.path(to))
    }

    fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }

    fn location(&self, name: &str) -> String {
        self.path(name).display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_missing_folders_on_first_write() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("a/b/c");
        let s = FileStorer::new(&folder);
        assert!(!folder.exists());
        s.append("f.txt", b"x").unwrap();
        assert!(folder.join("f.txt").is_file());
        assert_eq!(s.location("f.txt"), folder.join("f.txt").display().to_string());
    }

    #[test]
    fn create_truncates_and_makes_folder() {
        let dir = tempfile::tempdir().unwrap();
        let s = FileStorer::new(dir.path().join("stage"));
        s.append("p", b"stale").unwrap();
        let mut f = s.create("p").unwrap();
        f.write_all(b"new").unwrap();
        assert_eq!(s.get("p").unwrap(), b"new");
    }

    #[test]
    fn empty_zero_length_append_still_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let s = FileStorer::new(dir.path());
        s.append("empty", b"").unwrap();
        assert!(s.exists("empty"));
        assert!(s.get("empty").unwrap().is_empty());
    }

    #[test]
    fn remove_folder_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let s = FileStorer::new(dir.path().join("stage"));
        s.append("x.0", b"1").unwrap();
        s.remove_folder().unwrap();
        assert!(!dir.path().join("stage").exists());
        s.remove_folder().unwrap();
    }
}
