// ABOUTME: Persistence layer for per-channel deploy logs.
// ABOUTME: Exports the Store/Repository traits plus memory and file backends.

mod error;
mod file;
mod lock_file;
mod log;
mod memory;
mod traits;

pub use error::{StoreError, StoreErrorKind};
pub use file::FileStore;
pub use lock_file::{LockFile, LockInfo};
pub use log::ChannelLog;
pub use memory::MemoryStore;
pub use traits::{Backend, Repository, Store, StoreLock};
