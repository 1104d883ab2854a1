// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! burrow-core: Coordination layer for a file-backed cache shared across processes
//!
//! This crate provides:
//! - A coordinator that lazily acquires an expensive cross-process lock,
//!   shares it across nested in-process uses via reference counting, and
//!   releases it eagerly when the last use ends
//! - The external contracts it is wired with: a lock primitive, an
//!   initialization policy, and open/close hooks
//! - The lock identity/options value types

pub mod coordinator;
pub mod error;
pub mod identity;
pub mod policy;
pub mod primitive;

// Re-exports
pub use coordinator::{CacheAccess, LockLease};
pub use error::AccessError;
pub use identity::{LockIdentity, LockMode, LockOptions};
pub use policy::{InitPolicy, NoInit};
pub use primitive::{DynError, LockError, LockHandle, LockPrimitive};
