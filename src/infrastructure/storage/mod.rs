//! Persistent store: raw backends, typed JSON tables and the
//! cross-process change watcher.

mod file;
mod memory;
mod table;
mod traits;
mod watcher;

pub use file::FileBackend;
pub use memory::InMemoryBackend;
pub use table::{Commit, PersistentStore};
pub use traits::StorageBackend;
pub use watcher::StoreWatcher;
