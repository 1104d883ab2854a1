// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identity of the lock protecting a cache
//!
//! Immutable after construction; handed to the lock primitive on every
//! acquisition attempt.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How the cross-process lock is held
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockMode {
    /// Single holder across all processes
    Exclusive,
    /// Multiple concurrent readers
    Shared,
}

/// Lock acquisition options
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockOptions {
    pub mode: LockMode,
    /// Wait for a contended lock instead of failing fast
    pub blocking: bool,
}

impl Default for LockOptions {
    fn default() -> Self {
        Self {
            mode: LockMode::Exclusive,
            blocking: true,
        }
    }
}

/// Identity of a lock target: display name, filesystem target, and options
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockIdentity {
    display_name: String,
    target: PathBuf,
    options: LockOptions,
}

impl LockIdentity {
    pub fn new(display_name: impl Into<String>, target: impl Into<PathBuf>) -> Self {
        Self {
            display_name: display_name.into(),
            target: target.into(),
            options: LockOptions::default(),
        }
    }

    pub fn with_options(mut self, options: LockOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_mode(mut self, mode: LockMode) -> Self {
        self.options.mode = mode;
        self
    }

    pub fn non_blocking(mut self) -> Self {
        self.options.blocking = false;
        self
    }

    /// Human-readable cache name, used in errors and log output
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Filesystem path the lock protects
    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn options(&self) -> &LockOptions {
        &self.options
    }
}

impl std::fmt::Display for LockIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name)
    }
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
