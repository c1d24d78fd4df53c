use crate::data::{Backend, BackendError, Entry};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// In-process strings table.
///
/// Keeps rows in insertion order and counts calls, which makes it usable
/// both as a throwaway store and as a spy in tests. Loads and writes can be
/// switched to fail to simulate an unreachable store.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<Vec<Entry>>,
    loads: AtomicUsize,
    upserts: AtomicUsize,
    fail_loads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-filled with `entries`, kept as given
    pub fn with_entries(entries: impl IntoIterator<Item = Entry>) -> Self {
        Self {
            entries: Mutex::new(entries.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Copy of the stored rows
    pub fn entries(&self) -> Vec<Entry> {
        self.lock().clone()
    }

    /// Number of `load_all` calls, failed ones included
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Number of `upsert` calls, failed ones included
    pub fn upsert_count(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Backend for MemoryBackend {
    fn load_all(&self) -> Result<Vec<Entry>, BackendError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("memory store is offline".to_string()));
        }
        Ok(self.entries())
    }

    fn upsert(&self, key: &str, value: &str) -> Result<(), BackendError> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("memory store is offline".to_string()));
        }

        let mut entries = self.lock();
        match entries.iter_mut().find(|entry| entry.key == key) {
            Some(entry) => entry.value = value.to_string(),
            None => entries.push(Entry::new(key, value)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_inserts_then_updates() {
        let backend = MemoryBackend::new();
        backend.upsert("a", "1").unwrap();
        backend.upsert("b", "2").unwrap();
        backend.upsert("a", "3").unwrap();

        assert_eq!(backend.entries(), vec![Entry::new("a", "3"), Entry::new("b", "2")]);
        assert_eq!(backend.upsert_count(), 3);
    }

    #[test]
    fn test_failure_switches() {
        let backend = MemoryBackend::with_entries(vec![Entry::new("a", "1")]);
        backend.set_fail_loads(true);
        backend.set_fail_writes(true);

        assert!(backend.load_all().is_err());
        assert!(backend.upsert("a", "2").is_err());
        assert_eq!(backend.entries(), vec![Entry::new("a", "1")]);
        assert_eq!(backend.load_count(), 1);
    }
}
