//! # Logger
//!
//! Installs the global `tracing` subscriber for Strata binaries.
//!
//! * Console output goes to **stderr** so command output on stdout stays machine readable.
//!   It can be compact text or one JSON object per line.
//! * File output uses a non-blocking rolling appender; files are named
//!   `<name>.<date>.log` and can be written as JSON.
//! * The level can be changed after start-up with [`Logger::set_level`]. Binaries usually
//!   start at a fixed level, resolve their settings (logging what happens), then switch to the
//!   level those settings ask for via [`parse_level`].
//!
//! ## Example
//!
//! ```rust
//! use strata_logger::{LevelFilter, Logger, parse_level};
//!
//! let logger = Logger::builder().name("strata").level(LevelFilter::INFO).init()?;
//! tracing::info!("resolving settings");
//! logger.set_level(parse_level("warning")?)?;
//! # Ok::<(), strata_logger::LoggerError>(())
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use private::Sealed;
use std::fs;
use std::marker::PhantomData;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, reload};

const DEFAULT_MAX_FILES: usize = 7;
const LOG_FILE_SUFFIX: &str = "log";

/// How console lines are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConsoleFormat {
    #[default]
    Compact,
    Json,
}

/// Parses a level name as found in settings files and CLI flags.
///
/// Accepts the `tracing` names (`trace` .. `error`, `off`) in any case, plus the
/// `warning` and `critical` spellings common in Python-style configuration.
///
/// # Errors
/// Returns [`LoggerError::InvalidConfiguration`] for anything else.
pub fn parse_level(level: &str) -> Result<LevelFilter, LoggerError> {
    let normalized = level.trim().to_ascii_lowercase();
    let name = match normalized.as_str() {
        "warning" => "warn",
        "critical" | "fatal" => "error",
        other => other,
    };
    name.parse::<LevelFilter>().map_err(|_| LoggerError::InvalidConfiguration {
        message: format!("unknown log level '{level}'").into(),
        context: None,
    })
}

#[derive(Debug)]
struct LoggerConfig {
    console: Option<ConsoleFormat>,
    ansi: bool,
    dir: Option<PathBuf>,
    level: LevelFilter,
    directives: Option<String>,
    rotation: Rotation,
    max_files: usize,
    file_json: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            console: Some(ConsoleFormat::Compact),
            ansi: true,
            dir: None,
            level: LevelFilter::INFO,
            directives: None,
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            file_json: false,
        }
    }
}

#[derive(Debug)]
pub struct Unnamed;
#[derive(Debug)]
pub struct Named(String);
#[derive(Debug)]
pub struct ConsoleOnly;
#[derive(Debug)]
pub struct WithFiles;

mod private {
    pub trait Sealed {}
}
impl Sealed for Unnamed {}
impl Sealed for Named {}
impl Sealed for ConsoleOnly {}
impl Sealed for WithFiles {}

/// Configures the global subscriber.
///
/// A name is required before [`LoggerBuilder::init`] is available; file-specific options
/// only exist once a log directory has been set with [`LoggerBuilder::path`].
#[derive(Debug)]
pub struct LoggerBuilder<N: Sealed = Unnamed, F: Sealed = ConsoleOnly> {
    config: LoggerConfig,
    name: N,
    files: PhantomData<F>,
}

impl<F: Sealed> LoggerBuilder<Unnamed, F> {
    /// Names the logger; the name prefixes log file names.
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<Named, F> {
        LoggerBuilder { config: self.config, name: Named(name.into()), files: PhantomData }
    }
}

impl LoggerBuilder<Named, WithFiles> {
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn rotation(mut self, rotation: Rotation) -> Self {
        self.config.rotation = rotation;
        self
    }

    /// How many rotated files to keep.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn max_files(mut self, max: usize) -> Self {
        self.config.max_files = max;
        self
    }

    /// Writes log files as JSON lines.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn json(mut self) -> Self {
        self.config.file_json = true;
        self
    }
}

impl<F: Sealed> LoggerBuilder<Named, F> {
    /// Default level for every target not named in [`LoggerBuilder::directives`].
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.config.level = level;
        self
    }

    /// Per-target filter directives such as `strata_kernel=debug,reqwest=warn`.
    ///
    /// Without directives the `RUST_LOG` environment variable is honored.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn directives(mut self, directives: impl Into<String>) -> Self {
        let directives = directives.into();
        self.config.directives = (!directives.trim().is_empty()).then_some(directives);
        self
    }

    /// Sets the console format; `None` disables console output.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn console(mut self, format: Option<ConsoleFormat>) -> Self {
        self.config.console = format;
        self
    }

    /// Enables or disables ANSI colors on the compact console format.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn ansi(mut self, enabled: bool) -> Self {
        self.config.ansi = enabled;
        self
    }

    /// Also writes rolling log files into `dir`, creating it if needed.
    pub fn path(self, dir: impl Into<PathBuf>) -> LoggerBuilder<Named, WithFiles> {
        let mut config = self.config;
        config.dir = Some(dir.into());
        LoggerBuilder { config, name: self.name, files: PhantomData }
    }

    /// Installs the subscriber for the whole process.
    ///
    /// Keep the returned [`Logger`] alive until shutdown: it owns the background writer of
    /// the file appender and the handle used by [`Logger::set_level`].
    ///
    /// # Errors
    /// * [`LoggerError::InvalidConfiguration`] for an empty name, zero `max_files`, bad
    ///   directives, or when neither console nor file output is enabled.
    /// * [`LoggerError::Internal`] if the log directory cannot be created.
    /// * [`LoggerError::Appender`] if the rolling appender cannot be built.
    /// * [`LoggerError::Subscriber`] if a global subscriber is already installed.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let LoggerBuilder { config, name: Named(name), .. } = self;
        validate_config(&config, &name)?;

        let filter = build_env_filter(config.level, config.directives.as_deref())?;
        let (filter, filter_handle) = reload::Layer::new(filter);

        let mut layers = Vec::new();

        match config.console {
            Some(ConsoleFormat::Compact) => layers.push(
                layer().compact().with_ansi(config.ansi).with_writer(std::io::stderr).boxed(),
            ),
            Some(ConsoleFormat::Json) => {
                layers.push(layer().json().with_writer(std::io::stderr).boxed());
            },
            None => {},
        }

        let guard = match &config.dir {
            Some(dir) => {
                fs::create_dir_all(dir)
                    .context(format!("Failed to create log directory {}", dir.display()))?;

                let appender = RollingFileAppender::builder()
                    .rotation(config.rotation)
                    .filename_prefix(&name)
                    .filename_suffix(LOG_FILE_SUFFIX)
                    .max_log_files(config.max_files)
                    .build(dir)?;
                let (writer, guard) = tracing_appender::non_blocking(appender);

                let file_layer = layer().with_writer(writer).with_ansi(false);
                layers.push(if config.file_json {
                    file_layer.json().boxed()
                } else {
                    file_layer.boxed()
                });
                Some(guard)
            },
            None => None,
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "no output enabled, enable the console or set a log directory".into(),
                context: None,
            });
        }

        tracing_subscriber::registry().with(filter).with(layers).try_init()?;

        Ok(Logger { filter: filter_handle, directives: config.directives, guard })
    }
}

/// Handle to the installed subscriber.
#[must_use = "Dropping this handle stops the background log file writer."]
#[derive(Debug)]
pub struct Logger {
    filter: reload::Handle<EnvFilter, Registry>,
    directives: Option<String>,
    guard: Option<WorkerGuard>,
}

impl Logger {
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder { config: LoggerConfig::default(), name: Unnamed, files: PhantomData }
    }

    /// Swaps the default level, keeping any per-target directives.
    ///
    /// # Errors
    /// Returns [`LoggerError::Internal`] if the subscriber has been dropped.
    pub fn set_level(&self, level: LevelFilter) -> Result<(), LoggerError> {
        let filter = build_env_filter(level, self.directives.as_deref())?;
        self.filter.reload(filter).map_err(|e| LoggerError::Internal {
            message: e.to_string().into(),
            context: Some("Failed to change log level".into()),
        })?;
        tracing::debug!(%level, "Log level changed");
        Ok(())
    }

    /// The most verbose level currently enabled, if the subscriber is still alive.
    #[must_use]
    pub fn max_level(&self) -> Option<LevelFilter> {
        self.filter.with_current(<EnvFilter as Layer<Registry>>::max_level_hint).ok().flatten()
    }

    /// `true` when log files are being written.
    #[must_use]
    pub const fn writes_files(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::debug!("Flushing log files");
        }
    }
}

fn validate_config(config: &LoggerConfig, name: &str) -> Result<(), LoggerError> {
    if name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "logger name cannot be empty".into(),
            context: None,
        });
    }
    if config.dir.is_some() && config.max_files == 0 {
        return Err(LoggerError::InvalidConfiguration {
            message: "max_files must be greater than zero".into(),
            context: None,
        });
    }
    Ok(())
}

fn build_env_filter(level: LevelFilter, directives: Option<&str>) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(level.into());
    directives.map_or_else(
        || Ok(builder.from_env_lossy()),
        |directives| {
            builder.parse(directives).map_err(|e| LoggerError::InvalidConfiguration {
                message: format!("invalid filter directives '{directives}': {e}").into(),
                context: None,
            })
        },
    )
}
