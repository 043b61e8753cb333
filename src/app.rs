use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::cli::Cli;
use crate::config::GlobalConfig;
use crate::error::LockError;
use crate::lock::{self, InstanceLock};
use crate::{logging, mirror};

const DEFAULT_CONFIG_FILE: &str = "config.yml";
const LOG_DIR: &str = "logs";

pub const EXIT_OK: i32 = 0;
pub const EXIT_LOCK_BUSY: i32 = 1;
pub const EXIT_STARTUP_FAILURE: i32 = 2;

/// Top-level controller: lock, load, mirror, report. Per-host failures never
/// affect the exit status; only lock contention and startup failures do.
pub fn run(cli: Cli) -> i32 {
    // Configured defensively at INFO before the config is read, so lock and
    // config failures still reach the log file.
    let logging = match logging::init(Path::new(LOG_DIR), false) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("{}: {:#}", crate::PROGRAM_NAME, e);
            return EXIT_STARTUP_FAILURE;
        }
    };

    let lock_path = lock::default_lock_path();
    let _lock: InstanceLock = match InstanceLock::acquire(&lock_path) {
        Ok(lock) => lock,
        Err(e @ LockError::Busy(_)) => {
            warn!("{}; is another run still in progress?", e);
            return EXIT_LOCK_BUSY;
        }
        Err(e) => {
            error!("{}", e);
            return EXIT_LOCK_BUSY;
        }
    };

    // The lock is held from here on and released by drop on every path out of
    // this function, panics included.
    let config_path = cli
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = match GlobalConfig::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            error!("cannot load configuration: {:#}", e);
            return EXIT_STARTUP_FAILURE;
        }
    };

    logging.upgrade(config.wants_debug());

    info!("starting FTP mirror pass");
    if config.verbose {
        debug!("global verbose mode enabled");
    }
    if config.debug {
        info!("[DEBUG] global debug mode enabled - full tool output will be logged");
    }
    if which::which(&config.tool).is_err() {
        warn!(
            "mirror tool '{}' not found in PATH; host runs will fail",
            config.tool
        );
    }

    let results = mirror::mirror_all(&config, mirror::WALL_CLOCK_TIMEOUT);
    let failed = results
        .iter()
        .filter(|r| r.timed_out || r.exit_code != Some(0))
        .count();
    if failed > 0 {
        info!(
            "mirror pass complete: {} of {} hosts failed",
            failed,
            results.len()
        );
    } else {
        info!("mirror pass complete");
    }
    EXIT_OK
}
