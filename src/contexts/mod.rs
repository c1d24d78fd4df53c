mod error;
mod string_cache;
pub mod template;

pub use error::CacheError;
pub use string_cache::StringCache;
