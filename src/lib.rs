//! Localization string cache backed by a persistent strings table.
//!
//! [`contexts::StringCache`] loads the table once, serves lookups from
//! memory, inserts defaults on a miss and renders `{name}` placeholders.
//! [`global`] wraps one cache as process-wide state.

pub mod backends;
pub mod contexts;
pub mod data;
pub mod global;
