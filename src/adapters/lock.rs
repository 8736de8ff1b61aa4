//! Pid lock files shared by the node registry and the sysfs backend.
//!
//! A lock is a file created exclusively and holding the owner's process id.
//! When creation finds an existing file whose owner is no longer running
//! (no `/proc/<pid>`), the file is stale: it is removed and creation is
//! retried once.  A killed process therefore never blocks its successor.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

const PROC_ROOT: &str = "/proc";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LockError {
    /// A live process owns the lock.
    Held,
    /// The lock directory is missing or unwritable.
    Io,
}

/// An acquired lock; [`PidLock::release`] removes the file.
#[derive(Debug)]
pub(crate) struct PidLock {
    path: PathBuf,
}

impl PidLock {
    pub(crate) fn acquire(path: PathBuf) -> Result<Self, LockError> {
        match Self::create(&path) {
            Err(LockError::Held) if Self::is_stale(&path) => {
                info!("Reclaiming stale lock {}", path.display());
                if let Err(e) = fs::remove_file(&path) {
                    if e.kind() != ErrorKind::NotFound {
                        warn!("Cannot remove stale {}: {}", path.display(), e);
                        return Err(LockError::Io);
                    }
                }
                Self::create(&path)?;
            }
            result => result?,
        }
        Ok(Self { path })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn release(self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed {}", self.path.display()),
            Err(e) => warn!("Cannot remove {}: {}", self.path.display(), e),
        }
    }

    fn create(path: &Path) -> Result<(), LockError> {
        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Err(LockError::Held),
            Err(e) => {
                warn!("Cannot create {}: {}", path.display(), e);
                return Err(LockError::Io);
            }
        };

        if let Err(e) = writeln!(file, "{}", std::process::id()) {
            warn!("Cannot write {}: {}", path.display(), e);
            let _ = fs::remove_file(path);
            return Err(LockError::Io);
        }
        Ok(())
    }

    /// The recorded owner has exited.  Unreadable contents, or a host
    /// without `/proc`, count as live.
    fn is_stale(path: &Path) -> bool {
        let Some(pid) = fs::read_to_string(path)
            .ok()
            .and_then(|s| s.trim().parse::<u32>().ok())
        else {
            return false;
        };
        let proc_root = Path::new(PROC_ROOT);
        proc_root.is_dir() && !proc_root.join(pid.to_string()).exists()
    }
}
