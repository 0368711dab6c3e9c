//! Process-global settings: written once at startup, read everywhere afterwards.

use crate::error::{Result, SettingsError};
use std::sync::OnceLock;
use strata_domain::Settings;
use tracing::debug;

static SETTINGS: OnceLock<Settings> = OnceLock::new();

/// Publishes `settings` for the rest of the process.
///
/// # Errors
/// Returns [`SettingsError::AlreadyInitialized`] if settings were published before; the
/// stored value is left unchanged.
pub fn init(settings: Settings) -> Result<&'static Settings> {
    let mut fresh = false;
    let stored = SETTINGS.get_or_init(|| {
        fresh = true;
        settings
    });
    if fresh {
        debug!("Global settings initialized");
        Ok(stored)
    } else {
        Err(SettingsError::AlreadyInitialized { context: None })
    }
}

/// Returns the published settings, if any.
#[must_use]
pub fn get() -> Option<&'static Settings> {
    SETTINGS.get()
}

/// Returns the published settings, resolving them with `load` on first use.
///
/// # Errors
/// Propagates the error from `load`; nothing is stored in that case.
pub fn get_or_init<F>(load: F) -> Result<&'static Settings>
where
    F: FnOnce() -> Result<Settings>,
{
    if let Some(settings) = get() {
        return Ok(settings);
    }
    match init(load()?) {
        Ok(settings) => Ok(settings),
        // Another thread published first; its value wins.
        Err(SettingsError::AlreadyInitialized { .. }) => {
            get().ok_or_else(|| "global settings vanished after initialization".into())
        },
        Err(e) => Err(e),
    }
}
