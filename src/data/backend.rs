use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A single stored string: the key and its (possibly templated) value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub key: String,
    pub value: String,
}

impl Entry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Errors raised by a persistence backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The store could not be reached, read or written
    Unavailable(String),
    /// The store was reachable but its contents could not be decoded
    Corrupt(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BackendError::Unavailable(details) => {
                write!(f, "String store unavailable: {}", details)
            }
            BackendError::Corrupt(details) => {
                write!(f, "String store is corrupt: {}", details)
            }
        }
    }
}

impl std::error::Error for BackendError {}

/// Persistence collaborator for the string cache.
///
/// Implementations own the durable copy of the strings table. The cache
/// calls `load_all` once when it initializes and `upsert` on every write.
pub trait Backend: Send + Sync {
    /// Returns every stored entry, in storage order.
    ///
    /// # Returns
    /// * `Ok(entries)` - The full table; may be empty
    /// * `Err(BackendError)` - If the store cannot be read
    fn load_all(&self) -> Result<Vec<Entry>, BackendError>;

    /// Inserts the entry if `key` is new, otherwise replaces its value.
    ///
    /// # Arguments
    /// * `key` - Unique key of the string
    /// * `value` - The new value
    fn upsert(&self, key: &str, value: &str) -> Result<(), BackendError>;
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn load_all(&self) -> Result<Vec<Entry>, BackendError> {
        (**self).load_all()
    }

    fn upsert(&self, key: &str, value: &str) -> Result<(), BackendError> {
        (**self).upsert(key, value)
    }
}

impl<B: Backend + ?Sized> Backend for Arc<B> {
    fn load_all(&self) -> Result<Vec<Entry>, BackendError> {
        (**self).load_all()
    }

    fn upsert(&self, key: &str, value: &str) -> Result<(), BackendError> {
        (**self).upsert(key, value)
    }
}
