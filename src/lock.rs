use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use nix::errno::Errno;
use nix::fcntl::{Flock, FlockArg};

use crate::error::LockError;

/// Default lock path shared by every invocation on the machine.
pub fn default_lock_path() -> PathBuf {
    std::env::temp_dir().join(format!("{}.pid", crate::PROGRAM_NAME))
}

/// Exclusive advisory lock guaranteeing a single running instance.
///
/// Acquisition is non-blocking: a contended lock surfaces as
/// [`LockError::Busy`] immediately. The flock is released when the guard is
/// dropped, so the release runs exactly once on every exit path, including
/// unwinds out of the mirroring loop.
pub struct InstanceLock {
    guard: Flock<std::fs::File>,
    path: PathBuf,
}

impl InstanceLock {
    pub fn acquire(path: &Path) -> Result<Self, LockError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| LockError::Io(path.to_path_buf(), e.to_string()))?;
        match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
            Ok(guard) => {
                let lock = InstanceLock { guard, path: path.to_path_buf() };
                lock.write_pid();
                Ok(lock)
            }
            Err((_, e)) if e == Errno::EWOULDBLOCK => Err(LockError::Busy(path.to_path_buf())),
            Err((_, e)) => Err(LockError::Io(path.to_path_buf(), e.to_string())),
        }
    }

    // Record the owning pid for operators inspecting a stale lock file.
    fn write_pid(&self) {
        let mut file: &std::fs::File = &self.guard;
        let _ = file.set_len(0);
        let _ = writeln!(file, "{}", std::process::id());
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
