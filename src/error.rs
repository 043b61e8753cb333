/// Errors from the single-instance lock. Represented programmatically so the
/// controller can map contention to its own exit status instead of matching
/// on formatted strings.
#[derive(Debug)]
pub enum LockError {
    /// Another instance already holds the lock at this path.
    Busy(std::path::PathBuf),
    /// The lock file could not be opened or locked for an unrelated reason.
    Io(std::path::PathBuf, String),
}

impl std::fmt::Display for LockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockError::Busy(p) => {
                write!(f, "another instance holds the lock at {}", p.display())
            }
            LockError::Io(p, msg) => {
                write!(f, "cannot acquire lock at {}: {}", p.display(), msg)
            }
        }
    }
}

impl std::error::Error for LockError {}
