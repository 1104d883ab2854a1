// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock primitive contract
//!
//! The coordinator never takes OS locks itself; it is wired with an
//! implementation of [`LockPrimitive`] at construction. `burrow-fs`
//! provides the file-backed implementation.

use crate::identity::LockIdentity;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure type for injected callbacks (policies, hooks, scoped actions).
pub type DynError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors from the lock primitive
#[derive(Debug, Error)]
pub enum LockError {
    #[error("lock on {} is held by another process", path.display())]
    Contention { path: PathBuf },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Acquires cross-process locks for a given identity.
pub trait LockPrimitive: Send + Sync {
    /// Acquire a lock for the identity, blocking or failing fast per its
    /// options. Every successful call returns a fresh handle.
    fn acquire(&self, identity: &LockIdentity) -> Result<Box<dyn LockHandle>, LockError>;
}

/// A held cross-process lock.
///
/// Handles are owned by the coordinator and closed exactly once, either
/// on the last release or while rolling back a failed open.
pub trait LockHandle: Send {
    /// Path the lock protects.
    fn target(&self) -> &Path;

    /// Run `action` under the lock and guarantee its effects are durable
    /// and visible to other processes before returning. Used for
    /// first-open initialization only.
    fn write_scoped(
        &self,
        action: &mut dyn FnMut() -> Result<(), DynError>,
    ) -> Result<(), DynError>;

    /// Release the lock. Consumes the handle; a handle is never reused
    /// after close.
    fn close(self: Box<Self>) -> Result<(), LockError>;
}
