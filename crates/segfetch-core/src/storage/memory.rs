//! In-memory storer.

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use super::Storer;

/// Keeps every target as a byte buffer. Clones share the same buffers, so a
/// caller can keep one handle and inspect what the engine wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorer {
    buffers: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names currently held, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        // A panic while holding the lock cannot leave a buffer half-updated.
        self.buffers.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn not_found(name: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("no buffer named {}", name))
}

impl Storer for MemoryStorer {
    fn append(&self, name: &str, data: &[u8]) -> io::Result<()> {
        self.lock()
            .entry(name.to_string())
            .or_default()
            .extend_from_slice(data);
        Ok(())
    }

    fn get(&self, name: &str) -> io::Result<Vec<u8>> {
        self.lock().get(name).cloned().ok_or_else(|| not_found(name))
    }

    fn remove(&self, name: &str) -> io::Result<()> {
        self.lock().remove(name);
        Ok(())
    }

    fn rename(&self, from: &str, to: &str) -> io::Result<()> {
        let mut buffers = self.lock();
        let data = buffers.remove(from).ok_or_else(|| not_found(from))?;
        buffers.insert(to.to_string(), data);
        Ok(())
    }

    fn exists(&self, name: &str) -> bool {
        self.lock().contains_key(name)
    }

    fn location(&self, name: &str) -> String {
        format!("memory:{}", name)
    }
}
