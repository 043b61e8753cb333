pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod lock;
pub mod logging;
pub mod mirror;

pub use error::LockError;

/// Program name used for the lock file under the system temp directory.
pub const PROGRAM_NAME: &str = "mirrorsync";
pub const PROGRAM_VERSION: &str = env!("CARGO_PKG_VERSION");
