// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! burrow-fs: File-backed lock primitive for burrow-core
//!
//! Advisory whole-file locks keyed by the cache's target path, plus a
//! one-byte dirty marker in the lock file recording whether the last
//! scoped write completed.

pub mod lock;

pub use lock::{is_dirty, lock_file_path, FileLockHandle, FileLockPrimitive};
