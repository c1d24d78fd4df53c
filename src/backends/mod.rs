mod file;
mod memory;

pub use file::{FileBackend, StoreFormat};
pub use memory::MemoryBackend;
