//! Gateway implementations

mod file;
mod memory;

pub use file::{FileStore, StoreLock, DOCUMENT_VERSION};
pub use memory::MemoryStore;
