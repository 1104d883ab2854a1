// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Initialization policy for freshly acquired caches

use crate::primitive::{DynError, LockHandle};

/// Decides whether a freshly acquired cache needs its on-disk layout
/// written or repaired before first use.
///
/// Consulted once per actual lock acquisition, not per nested use. When
/// `requires_initialization` returns true, `initialize` runs inside the
/// lock primitive's scoped durable write, so its effects are flushed
/// while this process still holds the cross-process lock.
pub trait InitPolicy: Send + Sync {
    fn requires_initialization(&self, handle: &dyn LockHandle) -> bool;

    fn initialize(&self, handle: &dyn LockHandle) -> Result<(), DynError>;
}

/// Policy for caches that need no first-open work
#[derive(Clone, Copy, Debug, Default)]
pub struct NoInit;

impl InitPolicy for NoInit {
    fn requires_initialization(&self, _handle: &dyn LockHandle) -> bool {
        false
    }

    fn initialize(&self, _handle: &dyn LockHandle) -> Result<(), DynError> {
        Ok(())
    }
}
