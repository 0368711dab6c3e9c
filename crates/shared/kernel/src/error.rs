use std::borrow::Cow;
use strata_domain::SettingsIssue;

pub type Result<T> = std::result::Result<T, SettingsError>;

/// Errors raised while collecting, layering or storing settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Layering or typed deserialization failed (e.g. `db_port=abc`).
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },

    /// Transport or status failure talking to the remote settings endpoint.
    #[error("Remote settings error{}: {source}", format_context(.context))]
    Remote { source: reqwest::Error, context: Option<Cow<'static, str>> },

    /// The remote endpoint answered with a body of the wrong shape.
    #[error("Malformed remote payload{}: {message}", format_context(.context))]
    Payload { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("IO error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("JSON error{}: {source}", format_context(.context))]
    Json { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Dotenv error{}: {source}", format_context(.context))]
    DotEnv { source: dotenvy::Error, context: Option<Cow<'static, str>> },

    /// The resolved settings violate one or more constraints.
    #[error("Invalid settings{}: {}", format_context(.context), format_issues(.issues))]
    Validation { issues: Vec<SettingsIssue>, context: Option<Cow<'static, str>> },

    /// The process-global settings were already set.
    #[error("Settings already initialized{}", format_context(.context))]
    AlreadyInitialized { context: Option<Cow<'static, str>> },

    #[error("Invalid source order{}: {message}", format_context(.context))]
    InvalidOrder { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal settings error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Adds `.context(...)` to settings results and to the upstream errors they wrap.
pub trait SettingsErrorExt<T> {
    /// Attaches a human-readable context to the error, if any.
    ///
    /// # Errors
    /// Returns the original error converted into [`SettingsError`] with the context set.
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T>;
}

impl<T> SettingsErrorExt<T> for Result<T> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                SettingsError::Config { context: c, .. }
                | SettingsError::Remote { context: c, .. }
                | SettingsError::Payload { context: c, .. }
                | SettingsError::Io { context: c, .. }
                | SettingsError::Json { context: c, .. }
                | SettingsError::DotEnv { context: c, .. }
                | SettingsError::Validation { context: c, .. }
                | SettingsError::AlreadyInitialized { context: c }
                | SettingsError::InvalidOrder { context: c, .. }
                | SettingsError::Internal { context: c, .. } => *c = Some(context.into()),
            }
            e
        })
    }
}

macro_rules! upstream_error {
    ($($source:ty => $variant:ident),* $(,)?) => {$(
        impl From<$source> for SettingsError {
            #[inline]
            fn from(source: $source) -> Self {
                Self::$variant { source, context: None }
            }
        }

        impl<T> SettingsErrorExt<T> for std::result::Result<T, $source> {
            #[inline]
            fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T> {
                self.map_err(|source| SettingsError::$variant {
                    source,
                    context: Some(context.into()),
                })
            }
        }
    )*};
}

upstream_error! {
    config::ConfigError => Config,
    reqwest::Error => Remote,
    std::io::Error => Io,
    serde_json::Error => Json,
    dotenvy::Error => DotEnv,
}

impl From<&'static str> for SettingsError {
    #[inline]
    fn from(s: &'static str) -> Self {
        Self::Internal { message: Cow::Borrowed(s), context: None }
    }
}

impl From<String> for SettingsError {
    #[inline]
    fn from(s: String) -> Self {
        Self::Internal { message: Cow::Owned(s), context: None }
    }
}

#[allow(clippy::ref_option)]
fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}

fn format_issues(issues: &[SettingsIssue]) -> String {
    issues.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}
