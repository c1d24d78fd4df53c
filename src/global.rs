//! Process-wide string cache.
//!
//! The cache is installed once with the backend of the caller's choice and
//! lives until the process exits. The free functions below forward to it so
//! call sites do not have to carry a handle around.

use crate::contexts::{CacheError, StringCache};
use crate::data::Backend;
use std::collections::BTreeMap;
use std::sync::OnceLock;

pub type SharedCache = StringCache<Box<dyn Backend>>;

static CACHE: OnceLock<SharedCache> = OnceLock::new();

/// Installs the process-wide cache over `backend`.
///
/// Nothing is loaded until the first lookup or an explicit [`init`].
///
/// # Errors
/// * `CacheError::AlreadyInstalled` - If a cache was installed before; the
///   existing cache is kept and `backend` is dropped
pub fn install(backend: impl Backend + 'static) -> Result<&'static SharedCache, CacheError> {
    let backend: Box<dyn Backend> = Box::new(backend);
    let mut installed = false;
    let cache = CACHE.get_or_init(|| {
        installed = true;
        StringCache::new(backend)
    });

    if installed {
        Ok(cache)
    } else {
        Err(CacheError::AlreadyInstalled)
    }
}

/// The installed cache
pub fn instance() -> Result<&'static SharedCache, CacheError> {
    CACHE.get().ok_or(CacheError::NotInstalled)
}

pub fn init() -> Result<&'static SharedCache, CacheError> {
    let cache = instance()?;
    cache.init()?;
    Ok(cache)
}

pub fn get(key: &str, default: Option<&str>) -> Result<Option<String>, CacheError> {
    instance()?.get(key, default)
}

pub fn set(key: &str, value: &str) -> Result<(), CacheError> {
    instance()?.set(key, value)
}

pub fn get_all() -> Result<BTreeMap<String, String>, CacheError> {
    instance()?.get_all()
}

pub fn assign(
    key: &str,
    vars: &[(&str, &str)],
    default: Option<&str>,
) -> Result<Option<String>, CacheError> {
    instance()?.assign(key, vars, default)
}
