// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-demand, eager-release cache access coordination
//!
//! The coordinator acquires the cross-process lock the first time anyone
//! needs it, shares that one acquisition across nested in-process uses
//! via a reference count, and releases it the moment the count returns
//! to zero. Initialization and the open/close hooks run exactly once per
//! actual lock transition, never per nested use.

use crate::error::AccessError;
use crate::identity::LockIdentity;
use crate::policy::InitPolicy;
use crate::primitive::{DynError, LockHandle, LockPrimitive};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

type Hook = Box<dyn Fn(&dyn LockHandle) -> Result<(), DynError> + Send + Sync>;

/// Coordinator state. `Open` is only ever constructed with a count of at
/// least one, so "lock held ⇔ uses remain" holds by construction.
enum AccessState {
    Closed,
    Open {
        count: u32,
        handle: Box<dyn LockHandle>,
    },
}

/// Coordinates shared access to a lock-protected, file-backed cache.
///
/// One mutex serializes every state transition and is held across the
/// (potentially blocking) call into the lock primitive as well as the
/// hook invocations: no thread ever observes a half-open or half-closed
/// cache, and other in-process callers queue behind the transition in
/// flight. Hooks and policies must not re-enter the same coordinator;
/// doing so deadlocks against this mutex.
pub struct CacheAccess {
    identity: LockIdentity,
    primitive: Box<dyn LockPrimitive>,
    policy: Box<dyn InitPolicy>,
    on_open: Hook,
    on_close: Hook,
    state: Mutex<AccessState>,
}

impl CacheAccess {
    pub fn new(
        identity: LockIdentity,
        primitive: impl LockPrimitive + 'static,
        policy: impl InitPolicy + 'static,
    ) -> Self {
        Self {
            identity,
            primitive: Box::new(primitive),
            policy: Box::new(policy),
            on_open: Box::new(|_| Ok(())),
            on_close: Box::new(|_| Ok(())),
            state: Mutex::new(AccessState::Closed),
        }
    }

    /// Notified once per actual lock acquisition, while the coordinator
    /// mutex is held. Used by the cache layer to refresh its in-memory view.
    pub fn with_on_open(
        mut self,
        hook: impl Fn(&dyn LockHandle) -> Result<(), DynError> + Send + Sync + 'static,
    ) -> Self {
        self.on_open = Box::new(hook);
        self
    }

    /// Notified once per actual lock release, while the coordinator
    /// mutex is held. Used by the cache layer to flush its in-memory view.
    pub fn with_on_close(
        mut self,
        hook: impl Fn(&dyn LockHandle) -> Result<(), DynError> + Send + Sync + 'static,
    ) -> Self {
        self.on_close = Box::new(hook);
        self
    }

    fn lock_state(&self) -> MutexGuard<'_, AccessState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// No-op: acquisition is lazy, nothing happens until the first use.
    pub fn open(&self) {}

    /// Fails with [`AccessError::Busy`] while any use is in flight. Must
    /// not be called concurrently with acquire/release on this
    /// coordinator.
    pub fn close(&self) -> Result<(), AccessError> {
        let state = self.lock_state();
        match &*state {
            AccessState::Closed => Ok(()),
            AccessState::Open { count, .. } => Err(AccessError::Busy {
                cache: self.identity.display_name().to_string(),
                count: *count,
            }),
        }
    }

    /// Run `action` under the lock. The release runs on every exit path:
    /// on action failure the lock is still released (a release failure is
    /// then only logged) and the action's own error is what propagates.
    pub fn with_lock<T>(
        &self,
        action: impl FnOnce() -> Result<T, DynError>,
    ) -> Result<T, AccessError> {
        self.retain()?;
        let result = action();
        let released = self.release();
        match result {
            Ok(value) => {
                released?;
                Ok(value)
            }
            Err(err) => {
                if let Err(release_err) = released {
                    warn!(cache = %self.identity, error = %release_err, "release failed after action error");
                }
                Err(AccessError::Action(err))
            }
        }
    }

    /// Manual acquisition for holds that span a single call boundary.
    /// The returned lease must be released exactly once.
    pub fn acquire(&self) -> Result<LockLease<'_>, AccessError> {
        self.retain()?;
        Ok(LockLease {
            access: self,
            released: false,
        })
    }

    /// Whether the underlying lock is currently held.
    pub fn is_held(&self) -> bool {
        matches!(&*self.lock_state(), AccessState::Open { .. })
    }

    /// Number of in-flight uses sharing the current acquisition.
    pub fn use_count(&self) -> u32 {
        match &*self.lock_state() {
            AccessState::Closed => 0,
            AccessState::Open { count, .. } => *count,
        }
    }

    fn retain(&self) -> Result<(), AccessError> {
        let mut state = self.lock_state();
        match &mut *state {
            AccessState::Open { count, .. } => {
                *count += 1;
                Ok(())
            }
            AccessState::Closed => {
                debug!(cache = %self.identity, "acquiring file lock");
                let handle =
                    self.primitive
                        .acquire(&self.identity)
                        .map_err(|source| AccessError::Acquire {
                            cache: self.identity.display_name().to_string(),
                            source,
                        })?;
                if let Err(err) = self.open_handle(handle.as_ref()) {
                    // Roll back completely: no "held but not announced"
                    // state survives a failed open sequence.
                    if let Err(close_err) = handle.close() {
                        warn!(cache = %self.identity, error = %close_err, "lock close failed while rolling back a failed open");
                    }
                    return Err(err);
                }
                *state = AccessState::Open { count: 1, handle };
                Ok(())
            }
        }
    }

    /// Initialization and open notification for a freshly acquired
    /// handle. The caller closes the handle if this fails.
    fn open_handle(&self, handle: &dyn LockHandle) -> Result<(), AccessError> {
        if self.policy.requires_initialization(handle) {
            handle
                .write_scoped(&mut || self.policy.initialize(handle))
                .map_err(|source| AccessError::Initialize {
                    cache: self.identity.display_name().to_string(),
                    source,
                })?;
        }
        (self.on_open)(handle).map_err(|source| AccessError::OpenHook {
            cache: self.identity.display_name().to_string(),
            source,
        })
    }

    fn release(&self) -> Result<(), AccessError> {
        let mut state = self.lock_state();
        match std::mem::replace(&mut *state, AccessState::Closed) {
            AccessState::Closed => Err(AccessError::MismatchedLockCount {
                cache: self.identity.display_name().to_string(),
            }),
            AccessState::Open { count, handle } if count > 1 => {
                *state = AccessState::Open {
                    count: count - 1,
                    handle,
                };
                Ok(())
            }
            AccessState::Open { handle, .. } => {
                debug!(cache = %self.identity, "releasing file lock");
                let notified = (self.on_close)(handle.as_ref());
                // The lock is released whether or not the close hook
                // failed; a misbehaving hook must never leak it.
                let closed = handle.close();
                if let Err(source) = notified {
                    if let Err(close_err) = closed {
                        warn!(cache = %self.identity, error = %close_err, "lock close failed after close notification error");
                    }
                    return Err(AccessError::CloseHook {
                        cache: self.identity.display_name().to_string(),
                        source,
                    });
                }
                closed.map_err(|source| AccessError::Release {
                    cache: self.identity.display_name().to_string(),
                    source,
                })
            }
        }
    }
}

/// One-shot release token for a manual acquisition.
///
/// Consuming [`release`](LockLease::release) makes a double release
/// impossible. Dropping the lease without releasing keeps the lock held
/// for the life of the coordinator; a warning names the leaking cache.
#[must_use = "dropping a lease without releasing it leaks the held lock"]
pub struct LockLease<'a> {
    access: &'a CacheAccess,
    released: bool,
}

impl LockLease<'_> {
    pub fn release(mut self) -> Result<(), AccessError> {
        self.released = true;
        self.access.release()
    }
}

impl Drop for LockLease<'_> {
    fn drop(&mut self) {
        if !self.released {
            warn!(cache = %self.access.identity, "lock lease dropped without release; lock stays held");
        }
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
