//! Storage sinks.
//!
//! A `Storer` writes byte payloads to named targets and reads them back. The
//! target name is passed on every call, so one handle can serve the final
//! output and any number of staged segments at once. Handles are cheap to
//! clone; each worker gets its own.

mod file;
mod memory;

pub use file::FileStorer;
pub use memory::MemoryStorer;

use std::io::{self, Write};

/// Suffix of the temporary target the engine writes before renaming it into place.
pub const TEMP_SUFFIX: &str = ".part";

/// Temporary name for `name`: `file.iso` → `file.iso.part`.
pub fn temp_name(name: &str) -> String {
    format!("{}{}", name, TEMP_SUFFIX)
}

/// `io::Write` adapter that appends every write to one storer target.
pub struct AppendWriter<'a, S: ?Sized> {
    storer: &'a S,
    name: String,
}

impl<'a, S: Storer + ?Sized> AppendWriter<'a, S> {
    pub fn new(storer: &'a S, name: &str) -> Self {
        Self {
            storer,
            name: name.to_string(),
        }
    }
}

impl<S: Storer + ?Sized> Write for AppendWriter<'_, S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.storer.append(&self.name, buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Sink for downloaded bytes.
pub trait Storer: Send + Sync {
    /// Appends `data` to `name`, creating the target if it does not exist.
    fn append(&self, name: &str, data: &[u8]) -> io::Result<()>;

    /// Reads the full contents of `name`.
    fn get(&self, name: &str) -> io::Result<Vec<u8>>;

    /// Removes `name`. Removing a missing target is not an error.
    fn remove(&self, name: &str) -> io::Result<()>;

    /// Replaces `to` with `from`.
    fn rename(&self, from: &str, to: &str) -> io::Result<()>;

    fn exists(&self, name: &str) -> bool;

    /// Human-readable location of `name` (a path for files).
    fn location(&self, name: &str) -> String;
}
