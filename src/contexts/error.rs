use crate::data::BackendError;
use std::fmt;

/// Errors returned by the string cache.
///
/// A lookup miss without a default is not an error; it is reported as
/// `Ok(None)` by `get` and `assign`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The backend failed while loading or writing
    Backend(BackendError),
    /// A substitution variable name is not `[A-Za-z0-9_]+`
    InvalidSubstitutionPattern(String),
    /// The process-wide cache was used before `global::install`
    NotInstalled,
    /// `global::install` was called more than once
    AlreadyInstalled,
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CacheError::Backend(e) => write!(f, "{}", e),
            CacheError::InvalidSubstitutionPattern(name) => {
                write!(
                    f,
                    "Invalid variable name '{}': only letters, digits and '_' are allowed",
                    name
                )
            }
            CacheError::NotInstalled => write!(f, "String cache has not been installed"),
            CacheError::AlreadyInstalled => write!(f, "String cache is already installed"),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::Backend(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BackendError> for CacheError {
    fn from(e: BackendError) -> Self {
        CacheError::Backend(e)
    }
}
