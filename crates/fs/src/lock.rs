// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Advisory file locks with a dirty-marker protocol
//!
//! The lock file sits next to the target (or inside it, for a directory
//! target) and doubles as the marker store: byte 0 records whether the
//! last scoped write completed, so a process that died mid-write is
//! visible to the next acquirer.

use burrow_core::{DynError, LockError, LockHandle, LockIdentity, LockMode, LockPrimitive};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

const CLEAN: u8 = 0;
const DIRTY: u8 = 1;

/// Path of the lock file guarding `target`: `<name>.lock` inside a
/// directory target, alongside a file target.
pub fn lock_file_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "cache".to_string());
    let lock_name = format!("{name}.lock");
    if target.is_dir() {
        target.join(lock_name)
    } else {
        target.with_file_name(lock_name)
    }
}

/// Whether the last scoped write against `target` was interrupted.
///
/// An absent or empty lock file also reads as dirty: the cache was never
/// initialized. Intended for initialization policies, which reach the
/// target through [`LockHandle::target`].
pub fn is_dirty(target: &Path) -> io::Result<bool> {
    let mut file = match File::open(lock_file_path(target)) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(true),
        Err(e) => return Err(e),
    };
    let mut marker = [CLEAN; 1];
    match file.read_exact(&mut marker) {
        Ok(()) => Ok(marker[0] != CLEAN),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(true),
        Err(e) => Err(e),
    }
}

/// Lock primitive backed by advisory whole-file locks
#[derive(Clone, Copy, Debug, Default)]
pub struct FileLockPrimitive;

impl FileLockPrimitive {
    pub fn new() -> Self {
        Self
    }
}

impl LockPrimitive for FileLockPrimitive {
    fn acquire(&self, identity: &LockIdentity) -> Result<Box<dyn LockHandle>, LockError> {
        let path = lock_file_path(identity.target());
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)?;

        // UFCS: std::fs::File has grown inherent lock methods with a
        // different error type, which would otherwise shadow fs2's.
        let options = identity.options();
        let locked = match (options.mode, options.blocking) {
            (LockMode::Exclusive, true) => FileExt::lock_exclusive(&file),
            (LockMode::Exclusive, false) => FileExt::try_lock_exclusive(&file),
            (LockMode::Shared, true) => FileExt::lock_shared(&file),
            (LockMode::Shared, false) => FileExt::try_lock_shared(&file),
        };
        if let Err(e) = locked {
            if !options.blocking && e.kind() == fs2::lock_contended_error().kind() {
                return Err(LockError::Contention { path });
            }
            return Err(LockError::Io(e));
        }

        debug!(cache = %identity, path = %path.display(), "acquired file lock");
        Ok(Box::new(FileLockHandle {
            file,
            target: identity.target().to_path_buf(),
            path,
        }))
    }
}

/// A held advisory file lock
pub struct FileLockHandle {
    file: File,
    target: PathBuf,
    path: PathBuf,
}

impl FileLockHandle {
    fn mark(&self, marker: u8) -> io::Result<()> {
        let mut file = &self.file;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&[marker])?;
        self.file.sync_all()
    }
}

impl LockHandle for FileLockHandle {
    fn target(&self) -> &Path {
        &self.target
    }

    fn write_scoped(
        &self,
        action: &mut dyn FnMut() -> Result<(), DynError>,
    ) -> Result<(), DynError> {
        // Dirty before the action, clean only after it: an interruption
        // anywhere in between is observable to the next acquirer.
        self.mark(DIRTY)?;
        action()?;
        self.mark(CLEAN)?;
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<(), LockError> {
        debug!(path = %self.path.display(), "releasing file lock");
        FileExt::unlock(&self.file)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
