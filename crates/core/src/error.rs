// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for cache access coordination

use crate::primitive::{DynError, LockError};
use thiserror::Error;

/// Errors surfaced by the cache access coordinator
///
/// `Busy` and `MismatchedLockCount` are caller bugs: never retried,
/// never recovered from. Everything else leaves the coordinator in a
/// consistent state (lock held if and only if uses remain), so a retry
/// is always safe.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("cannot close cache access for {cache}: currently in use for {count} operations")]
    Busy { cache: String, count: u32 },
    #[error("mismatched lock count for {cache}")]
    MismatchedLockCount { cache: String },
    #[error("failed to acquire lock for {cache}")]
    Acquire {
        cache: String,
        #[source]
        source: LockError,
    },
    #[error("failed to initialize {cache}")]
    Initialize {
        cache: String,
        #[source]
        source: DynError,
    },
    #[error("open notification failed for {cache}")]
    OpenHook {
        cache: String,
        #[source]
        source: DynError,
    },
    #[error("close notification failed for {cache}")]
    CloseHook {
        cache: String,
        #[source]
        source: DynError,
    },
    #[error("failed to release lock for {cache}")]
    Release {
        cache: String,
        #[source]
        source: LockError,
    },
    #[error("cache action failed")]
    Action(#[source] DynError),
}
