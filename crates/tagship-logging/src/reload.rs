//! Console level changes after the subscriber is installed
//!
//! Logging starts before `tagship.toml` is read, so a level from its
//! `[logging]` section is swapped in through here once the file is loaded.

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tagship_core::LogLevel;
use tracing_subscriber::Registry;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::reload;

type LevelHandle = reload::Handle<LevelFilter, Registry>;

/// Swaps the console level filter in place
pub struct ReloadHandle {
    handle: Mutex<Option<LevelHandle>>,
}

impl ReloadHandle {
    pub fn new() -> Self {
        Self {
            handle: Mutex::new(None),
        }
    }

    /// Handle for the subscriber installed by [`crate::init_logging`]
    pub fn global() -> &'static ReloadHandle {
        static INSTANCE: OnceCell<ReloadHandle> = OnceCell::new();
        INSTANCE.get_or_init(ReloadHandle::new)
    }

    pub(crate) fn set_handle(&self, handle: LevelHandle) {
        *self.handle.lock() = Some(handle);
    }

    /// False until a level filter is registered, and for good when
    /// `RUST_LOG` decides filtering
    pub fn is_initialized(&self) -> bool {
        self.handle.lock().is_some()
    }

    pub fn reload_level(&self, level: LogLevel) -> Result<(), String> {
        let guard = self.handle.lock();
        let handle = guard
            .as_ref()
            .ok_or_else(|| "Reload handle not initialized".to_string())?;
        handle
            .reload(level_filter(level))
            .map_err(|e| format!("Failed to reload filter: {}", e))
    }
}

impl Default for ReloadHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Switch the console to `level`.
///
/// Returns `Ok(false)` without touching anything when no level filter is
/// registered, which is the case under `RUST_LOG`.
pub fn apply_level(level: LogLevel) -> Result<bool, String> {
    apply_level_to(ReloadHandle::global(), level)
}

fn apply_level_to(handle: &ReloadHandle, level: LogLevel) -> Result<bool, String> {
    if !handle.is_initialized() {
        return Ok(false);
    }
    handle.reload_level(level)?;
    Ok(true)
}

pub(crate) fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Trace => LevelFilter::TRACE,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Off => LevelFilter::OFF,
    }
}

#[cfg(test)]
#[path = "reload/reload_tests.rs"]
mod reload_tests;
