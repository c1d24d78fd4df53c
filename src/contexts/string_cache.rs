use crate::contexts::{template, CacheError};
use crate::data::Backend;
use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

type Strings = HashMap<String, String>;

/// In-memory mirror of a strings table with a one-time lazy load.
///
/// The first operation that needs the strings loads the whole table from
/// the backend. After that, reads are served from memory only, and writes go
/// to the backend first and reach memory only once the backend accepted
/// them.
pub struct StringCache<B: Backend> {
    backend: B,
    /// `None` until the backend has been loaded
    strings: RwLock<Option<Strings>>,
}

impl<B: Backend> StringCache<B> {
    /// Creates an unloaded cache over `backend`
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            strings: RwLock::new(None),
        }
    }

    /// The backend this cache writes through to
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Loads the backend table if that has not happened yet.
    ///
    /// Concurrent callers race for the write lock; only the first one loads.
    /// A failed load leaves the cache unloaded so a later call can retry.
    pub fn init(&self) -> Result<(), CacheError> {
        if self.read().is_some() {
            return Ok(());
        }
        let mut guard = self.write();
        self.load_into(&mut guard)?;
        Ok(())
    }

    /// Whether the backend table has been loaded
    pub fn is_loaded(&self) -> bool {
        self.read().is_some()
    }

    /// Drops the in-memory strings; the next operation reloads them.
    pub fn reset(&self) {
        *self.write() = None;
    }

    /// Looks up `key`, inserting `default` when the key has no value.
    ///
    /// A stored empty string counts as missing, so a non-empty `default`
    /// replaces it.
    ///
    /// # Returns
    /// * `Ok(Some(value))` - The stored value, or the default that was just stored
    /// * `Ok(None)` - The key is missing and no non-empty default was given
    /// * `Err(CacheError)` - Loading or storing the default failed
    pub fn get(&self, key: &str, default: Option<&str>) -> Result<Option<String>, CacheError> {
        let found = self.with_strings(|strings| {
            strings
                .get(key)
                .filter(|value| !value.is_empty())
                .cloned()
        })?;

        if found.is_some() {
            return Ok(found);
        }

        let Some(default) = default.filter(|d| !d.is_empty()) else {
            debug!(key, "string not found");
            return Ok(None);
        };

        // A writer may have stored the key since the read lock was dropped
        let mut guard = self.write();
        let strings = self.load_into(&mut guard)?;
        if let Some(value) = strings.get(key).filter(|value| !value.is_empty()) {
            return Ok(Some(value.clone()));
        }

        self.store_locked(strings, key, default)?;
        info!(key, "inserted default string");
        Ok(Some(default.to_string()))
    }

    /// Stores `value` under `key` in the backend, then in memory.
    ///
    /// The write lock is held across the backend call, so concurrent writers
    /// reach the backend and the map in the same order.
    pub fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut guard = self.write();
        let strings = self.load_into(&mut guard)?;
        self.store_locked(strings, key, value)
    }

    /// Upserts into the backend and then `strings`; the caller holds the
    /// write lock that `strings` came from.
    fn store_locked(&self, strings: &mut Strings, key: &str, value: &str) -> Result<(), CacheError> {
        if let Err(e) = self.backend.upsert(key, value) {
            warn!(key, error = %e, "failed to persist string");
            return Err(e.into());
        }

        strings.insert(key.to_string(), value.to_string());
        debug!(key, "stored string");
        Ok(())
    }

    /// Snapshot of every cached string, ordered by key
    pub fn get_all(&self) -> Result<BTreeMap<String, String>, CacheError> {
        self.with_strings(|strings| {
            strings
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        })
    }

    /// Looks up `key` like [`get`](Self::get) and renders its `{name}`
    /// placeholders from `vars`.
    ///
    /// Variable names are validated before the lookup, so an invalid name
    /// never triggers a default insert. A miss returns `Ok(None)` without
    /// rendering anything.
    pub fn assign(
        &self,
        key: &str,
        vars: &[(&str, &str)],
        default: Option<&str>,
    ) -> Result<Option<String>, CacheError> {
        for (name, _) in vars {
            template::validate_name(name)?;
        }

        match self.get(key, default)? {
            Some(value) => template::substitute(&value, vars).map(Some),
            None => Ok(None),
        }
    }

    /// Number of cached strings, including empty ones
    pub fn len(&self) -> Result<usize, CacheError> {
        self.with_strings(HashMap::len)
    }

    pub fn is_empty(&self) -> Result<bool, CacheError> {
        self.with_strings(HashMap::is_empty)
    }

    fn with_strings<R>(&self, f: impl FnOnce(&Strings) -> R) -> Result<R, CacheError> {
        {
            let guard = self.read();
            if let Some(strings) = guard.as_ref() {
                return Ok(f(strings));
            }
        }

        let mut guard = self.write();
        let strings = self.load_into(&mut guard)?;
        Ok(f(strings))
    }

    fn load_into<'a>(&self, slot: &'a mut Option<Strings>) -> Result<&'a mut Strings, CacheError> {
        if slot.is_none() {
            let entries = self.backend.load_all().map_err(|e| {
                warn!(error = %e, "failed to load strings");
                e
            })?;

            let mut strings = HashMap::with_capacity(entries.len());
            for entry in entries {
                strings.insert(entry.key, entry.value);
            }
            debug!(count = strings.len(), "loaded strings from backend");
            *slot = Some(strings);
        }

        Ok(slot.get_or_insert_with(HashMap::new))
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<Strings>> {
        self.strings.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Strings>> {
        self.strings.write().unwrap_or_else(PoisonError::into_inner)
    }
}
