//! Storage layer for roadrecord.
//!
//! Records live in a flat, line-oriented text store. The core only needs
//! three operations from it: read every line, replace every line, and append
//! text for a first-time insert. [`FileStore`] backs those with a file on
//! disk; [`MemoryStore`] keeps lines in memory for tests and dry runs.
//!
//! The store is assumed to be owned by a single process. There is no locking,
//! so concurrent writers race and the last write wins.

pub mod codec;

use std::cell::RefCell;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, error};

use crate::error::{Error, Result};

/// Default store file name, relative to the working directory.
pub const DEFAULT_STORE_FILE: &str = "person.txt";

/// Minimal read-all / write-all text interface over the durable store.
pub trait RecordStore {
    /// Read the whole store as lines, without line terminators.
    ///
    /// A store that does not exist yet reads as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the store exists but cannot be read.
    fn read_all(&self) -> Result<Vec<String>>;

    /// Replace the whole store with `lines`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn write_all(&self, lines: &[String]) -> Result<()>;

    /// Add `text` to the end of the store without rewriting prior content.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn append(&self, text: &str) -> Result<()>;

    /// Human-readable location of the store, for logs.
    fn describe(&self) -> String;
}

/// A store backed by a text file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Use the file at `path` as the store. The file is created on first write.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the path to the store file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the store file; `.` for a bare file name.
    fn parent_dir(&self) -> &Path {
        self.path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        let parent = self.parent_dir();
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|source| self.write_error(source))?;
        }
        Ok(())
    }

    fn write_error(&self, source: std::io::Error) -> Error {
        error!("Failed to write store {}: {}", self.path.display(), source);
        Error::StoreWrite {
            path: self.path.clone(),
            source,
        }
    }
}

impl RecordStore for FileStore {
    fn read_all(&self) -> Result<Vec<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => {
                let lines: Vec<String> = text.lines().map(str::to_string).collect();
                debug!("Read {} lines from {}", lines.len(), self.path.display());
                Ok(lines)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("Store {} does not exist yet", self.path.display());
                Ok(Vec::new())
            }
            Err(source) => {
                error!("Failed to read store {}: {}", self.path.display(), source);
                Err(Error::StoreRead {
                    path: self.path.clone(),
                    source,
                })
            }
        }
    }

    fn write_all(&self, lines: &[String]) -> Result<()> {
        self.ensure_parent_dir()?;

        // Write beside the target and rename over it so readers never see a
        // half-written store.
        let mut temp =
            NamedTempFile::new_in(self.parent_dir()).map_err(|e| self.write_error(e))?;
        temp.write_all(codec::render(lines).as_bytes())
            .map_err(|e| self.write_error(e))?;
        temp.as_file().sync_all().map_err(|e| self.write_error(e))?;
        temp.persist(&self.path)
            .map_err(|e| self.write_error(e.error))?;

        debug!("Wrote {} lines to {}", lines.len(), self.path.display());
        Ok(())
    }

    fn append(&self, text: &str) -> Result<()> {
        self.ensure_parent_dir()?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.write_error(e))?;
        file.write_all(text.as_bytes())
            .map_err(|e| self.write_error(e))?;

        debug!("Appended {} bytes to {}", text.len(), self.path.display());
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// An in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    lines: RefCell<Vec<String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store preloaded with the lines of `text`.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: RefCell::new(text.lines().map(str::to_string).collect()),
        }
    }

    /// Snapshot of the current lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// Current contents as file text.
    #[must_use]
    pub fn text(&self) -> String {
        codec::render(&self.lines.borrow())
    }
}

impl RecordStore for MemoryStore {
    fn read_all(&self) -> Result<Vec<String>> {
        Ok(self.lines())
    }

    fn write_all(&self, lines: &[String]) -> Result<()> {
        *self.lines.borrow_mut() = lines.to_vec();
        Ok(())
    }

    fn append(&self, text: &str) -> Result<()> {
        self.lines
            .borrow_mut()
            .extend(text.lines().map(str::to_string));
        Ok(())
    }

    fn describe(&self) -> String {
        ":memory:".to_string()
    }
}

impl<S: RecordStore + ?Sized> RecordStore for &S {
    fn read_all(&self) -> Result<Vec<String>> {
        (**self).read_all()
    }

    fn write_all(&self, lines: &[String]) -> Result<()> {
        (**self).write_all(lines)
    }

    fn append(&self, text: &str) -> Result<()> {
        (**self).append(text)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let store = FileStore::new(dir.path().join("person.txt"));
        (dir, store)
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let (_dir, store) = temp_store();
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_append_then_read() {
        let (_dir, store) = temp_store();
        store.append("Name: A B\nID: x\n").unwrap();
        store.append("Name: C D\n").unwrap();

        assert_eq!(
            store.read_all().unwrap(),
            vec!["Name: A B", "ID: x", "Name: C D"]
        );
    }

    #[test]
    fn test_write_all_replaces_contents() {
        let (_dir, store) = temp_store();
        store.append("old\nold\nold\n").unwrap();
        store
            .write_all(&["new".to_string(), String::new()])
            .unwrap();

        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "new\n\n");
        assert_eq!(store.read_all().unwrap(), vec!["new", ""]);
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested/deeper/person.txt"));
        store.write_all(&["x".to_string()]).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_unreadable_store() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be read as a file.
        let store = FileStore::new(dir.path());
        assert!(matches!(store.read_all(), Err(Error::StoreRead { .. })));
    }

    #[test]
    fn test_bare_file_name_parent() {
        let store = FileStore::new(DEFAULT_STORE_FILE);
        assert_eq!(store.parent_dir(), Path::new("."));
        assert_eq!(store.describe(), "person.txt");
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.read_all().unwrap().is_empty());

        store.append("a\nb\n\n").unwrap();
        assert_eq!(store.lines(), vec!["a", "b", ""]);
        assert_eq!(store.text(), "a\nb\n\n");

        store.write_all(&["c".to_string()]).unwrap();
        assert_eq!(store.lines(), vec!["c"]);
        assert_eq!(store.describe(), ":memory:");
    }

    #[test]
    fn test_memory_store_from_text() {
        let store = MemoryStore::from_text("x\ny\n");
        assert_eq!(store.read_all().unwrap(), vec!["x", "y"]);
    }

    #[test]
    fn test_store_by_reference() {
        let store = MemoryStore::new();
        let by_ref: &MemoryStore = &store;
        by_ref.append("z\n").unwrap();
        assert_eq!(RecordStore::read_all(&by_ref).unwrap(), vec!["z"]);
    }
}
