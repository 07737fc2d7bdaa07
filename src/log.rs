// src/log.rs
//! Short logging macros over `tracing`, plus subscriber setup.
//!
//! Level comes from `SCRATCH_LOG` (an `EnvFilter` directive, default `info`).
//! Lines carry elapsed time since start-up.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use tracing_subscriber::{EnvFilter, fmt};

use crate::config::consts::{DEFAULT_LOG_LEVEL, LOG_ENV};

#[doc(hidden)]
pub use tracing as __tracing;

static INIT: OnceLock<()> = OnceLock::new();

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Install the global subscriber. Stderr by default; with `log_file`, lines
/// are appended there instead (no ANSI colors). Later calls are no-ops.
pub fn init(log_file: Option<&Path>) -> io::Result<()> {
    if INIT.get().is_some() {
        return Ok(());
    }
    let builder = fmt()
        .with_env_filter(filter())
        .with_timer(fmt::time::uptime())
        .with_target(false);

    // try_init fails only if someone else already set a global subscriber
    match log_file {
        Some(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let _ = builder.with_ansi(false).with_writer(Mutex::new(file)).try_init();
        }
        None => {
            let _ = builder.with_writer(io::stderr).try_init();
        }
    }
    let _ = INIT.set(());
    Ok(())
}

/// Info-level logging
#[macro_export]
macro_rules! logf {
    ($($arg:tt)*) => { $crate::log::__tracing::info!($($arg)*) };
}

/// Debug-level logging
#[macro_export]
macro_rules! logd {
    ($($arg:tt)*) => { $crate::log::__tracing::debug!($($arg)*) };
}

/// Warn-level logging
#[macro_export]
macro_rules! logw {
    ($($arg:tt)*) => { $crate::log::__tracing::warn!($($arg)*) };
}

/// Error-level logging
#[macro_export]
macro_rules! loge {
    ($($arg:tt)*) => { $crate::log::__tracing::error!($($arg)*) };
}
