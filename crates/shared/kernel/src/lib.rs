//! Settings resolution shared by every binary.
//!
//! Settings come from four independently swappable sources, layered by precedence
//! (highest first, by default):
//!
//! 1. **Remote**: a single HTTP GET returning a flat JSON object. Failures are logged and
//!    replaced by an empty map unless the source is marked required.
//! 2. **Env**: process environment variables plus an optional `.env` file.
//! 3. **Init**: explicit values passed by the caller.
//! 4. **Secrets**: one file per setting in a mounted secrets directory.
//!
//! Resolution happens once at startup; publish the result with [`global::init`].
//!
//! ```rust,no_run
//! use strata_kernel::{RemoteSource, SettingsLoader, global};
//!
//! let resolved = SettingsLoader::new()
//!     .remote(RemoteSource::new("https://settings.internal/app"))
//!     .load()?;
//! let settings = global::init(resolved.into_settings())?;
//! tracing::info!(features = ?settings.features(), "Settings ready");
//! # Ok::<(), strata_kernel::SettingsError>(())
//! ```

mod error;
pub mod global;
pub mod legacy;
mod resolver;
pub mod source;

pub use crate::error::{Result, SettingsError, SettingsErrorExt};
pub use crate::resolver::{Provenance, Resolved, SettingsLoader, SourceOrder, load_settings};
pub use crate::source::{
    EnvSource, InitSource, Layer, RemoteFormat, RemoteSource, SecretsSource, SettingsSource,
    SourceKind,
};
pub use strata_domain as domain;
