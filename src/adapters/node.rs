//! Lock-file node registry.
//!
//! Implements [`NodeRegistry`] with a pid lock at `<dir>/<name>.lock`.
//! While its owner runs no second controller can register the same name.
//! A lock left behind by a killed process is reclaimed on the next register.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::adapters::lock::{LockError, PidLock};
use crate::adapters::utils::is_valid_node_name;
use crate::app::ports::NodeRegistry;
use crate::error::RegistrationError;

/// Default directory for lock files.
pub const DEFAULT_LOCK_DIR: &str = "/run/lock";

pub struct LockFileRegistry {
    dir: PathBuf,
}

/// A registered node; unregistering removes its lock file.
#[derive(Debug)]
pub struct LockNode {
    lock: PidLock,
}

impl LockNode {
    pub fn path(&self) -> &Path {
        self.lock.path()
    }
}

impl LockFileRegistry {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn lock_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.lock"))
    }
}

impl NodeRegistry for LockFileRegistry {
    type Node = LockNode;

    fn register(&mut self, name: &str) -> Result<LockNode, RegistrationError> {
        if !is_valid_node_name(name) {
            return Err(RegistrationError::InvalidName);
        }
        let path = self.lock_path(name);

        let lock = PidLock::acquire(path).map_err(|e| match e {
            LockError::Held => {
                warn!("Node '{}' already held", name);
                RegistrationError::NameInUse
            }
            LockError::Io => RegistrationError::Io,
        })?;

        info!("Registered node '{}' at {}", name, lock.path().display());
        Ok(LockNode { lock })
    }

    fn unregister(&mut self, node: LockNode) {
        info!("Unregistering node at {}", node.path().display());
        node.lock.release();
    }
}
