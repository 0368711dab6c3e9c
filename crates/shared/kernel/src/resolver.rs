use crate::error::{Result, SettingsError, SettingsErrorExt};
use crate::source::{
    EnvSource, InitSource, Layer, RemoteSource, SecretsSource, SettingsSource, SourceKind,
};
use config::{Config, ValueKind};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use strata_domain::Settings;
use strata_domain::settings::FIELD_NAMES;
use tracing::{info, warn};

/// Source precedence, highest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOrder(Vec<SourceKind>);

impl Default for SourceOrder {
    /// `remote, env, init, secrets`
    fn default() -> Self {
        Self(SourceKind::ALL.to_vec())
    }
}

impl SourceOrder {
    /// Builds an order from the highest-precedence source down.
    ///
    /// Sources may be left out; listing one twice is an error.
    ///
    /// # Errors
    /// Returns [`SettingsError::InvalidOrder`] on duplicates.
    pub fn new(kinds: impl IntoIterator<Item = SourceKind>) -> Result<Self> {
        let mut order = Vec::with_capacity(SourceKind::ALL.len());
        for kind in kinds {
            if order.contains(&kind) {
                return Err(SettingsError::InvalidOrder {
                    message: format!("source '{kind}' listed more than once").into(),
                    context: None,
                });
            }
            order.push(kind);
        }
        Ok(Self(order))
    }

    #[must_use]
    pub fn kinds(&self) -> &[SourceKind] {
        &self.0
    }
}

impl FromStr for SourceOrder {
    type Err = SettingsError;

    /// Parses a comma-separated list such as `env,remote,secrets`.
    fn from_str(s: &str) -> Result<Self> {
        let kinds = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(SourceKind::from_str)
            .collect::<Result<Vec<_>>>()?;
        Self::new(kinds)
    }
}

impl fmt::Display for SourceOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|kind| kind.as_str()).collect();
        f.write_str(&names.join(","))
    }
}

/// Where the effective value of a key came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub key: &'static str,
    /// `None` when no source supplied the key and the model default applies.
    pub source: Option<SourceKind>,
    pub origin: String,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source {
            Some(source) => write!(f, "{} <- {source} ({})", self.key, self.origin),
            None => write!(f, "{} <- default", self.key),
        }
    }
}

/// Typed settings together with the layers they were resolved from.
#[derive(Debug, Clone)]
pub struct Resolved {
    settings: Settings,
    layers: Vec<Layer>,
}

impl Resolved {
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn into_settings(self) -> Settings {
        self.settings
    }

    /// Collected layers, highest precedence first.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Reports which source supplied `key`; `None` if `key` is not a settings field.
    #[must_use]
    pub fn origin(&self, key: &str) -> Option<Provenance> {
        let key = FIELD_NAMES.iter().copied().find(|name| name.eq_ignore_ascii_case(key))?;
        let provenance = self
            .layers
            .iter()
            .find_map(|layer| {
                layer.get(key).map(|value| Provenance {
                    key,
                    source: Some(layer.kind),
                    origin: value.origin().map_or_else(|| layer.origin.clone(), str::to_owned),
                })
            })
            .unwrap_or_else(|| Provenance { key, source: None, origin: "default".to_owned() });
        Some(provenance)
    }

    /// Provenance of every field, in declaration order.
    #[must_use]
    pub fn provenance(&self) -> Vec<Provenance> {
        FIELD_NAMES.iter().filter_map(|key| self.origin(key)).collect()
    }
}

impl Deref for Resolved {
    type Target = Settings;

    fn deref(&self) -> &Self::Target {
        &self.settings
    }
}

/// Builder that resolves [`Settings`] from the configured sources.
///
/// By default only the environment source (process variables plus `.env`) is active and
/// the precedence is `remote, env, init, secrets`.
///
/// # Example
/// ```rust,no_run
/// use strata_kernel::{RemoteSource, SecretsSource, SettingsLoader};
///
/// let resolved = SettingsLoader::new()
///     .remote(RemoteSource::new("https://settings.internal/app"))
///     .secrets(SecretsSource::new("/run/secrets"))
///     .init("mongo_url", "mongodb://127.0.0.1/abc")
///     .load()?;
///
/// println!("{}", resolved.mongo_url);
/// # Ok::<(), strata_kernel::SettingsError>(())
/// ```
#[must_use = "call .load() to resolve the settings"]
#[derive(Debug)]
pub struct SettingsLoader {
    remote: Option<RemoteSource>,
    env: Option<EnvSource>,
    init: InitSource,
    secrets: Option<SecretsSource>,
    order: SourceOrder,
    validate: bool,
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self {
            remote: None,
            env: Some(EnvSource::new()),
            init: InitSource::new(),
            secrets: None,
            order: SourceOrder::default(),
            validate: true,
        }
    }
}

impl SettingsLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remote(mut self, source: RemoteSource) -> Self {
        self.remote = Some(source);
        self
    }

    pub fn env(mut self, source: EnvSource) -> Self {
        self.env = Some(source);
        self
    }

    pub fn without_env(mut self) -> Self {
        self.env = None;
        self
    }

    /// Adds one init argument; later calls for the same key win.
    pub fn init(mut self, key: impl AsRef<str>, value: impl Into<ValueKind>) -> Self {
        self.init.set(key, value);
        self
    }

    pub fn init_source(mut self, source: InitSource) -> Self {
        self.init = source;
        self
    }

    pub fn secrets(mut self, source: SecretsSource) -> Self {
        self.secrets = Some(source);
        self
    }

    pub fn order(mut self, order: SourceOrder) -> Self {
        self.order = order;
        self
    }

    /// Skips [`Settings::validate`] after resolution.
    pub const fn skip_validation(mut self) -> Self {
        self.validate = false;
        self
    }

    fn source(&self, kind: SourceKind) -> Option<&dyn SettingsSource> {
        match kind {
            SourceKind::Remote => self.remote.as_ref().map(|s| s as &dyn SettingsSource),
            SourceKind::Env => self.env.as_ref().map(|s| s as &dyn SettingsSource),
            SourceKind::Init => Some(&self.init),
            SourceKind::Secrets => self.secrets.as_ref().map(|s| s as &dyn SettingsSource),
        }
    }

    /// Collects every configured source once and layers them by precedence.
    ///
    /// # Errors
    /// Returns an error if a source fails (an optional remote source never does), if a value
    /// cannot be coerced into its field's type, or if validation is enabled and fails.
    pub fn load(&self) -> Result<Resolved> {
        let layers = self
            .order
            .kinds()
            .iter()
            .filter_map(|kind| self.source(*kind))
            .map(Layer::collect)
            .collect::<Result<Vec<_>>>()?;

        let settings = deserialize_layers(&layers)?;

        if self.validate {
            let issues = settings.validate();
            if !issues.is_empty() {
                return Err(SettingsError::Validation {
                    issues,
                    context: Some("Resolved settings failed validation".into()),
                });
            }
        }
        if settings.secret_key.is_empty() && !settings.debug {
            warn!("secret_key is empty while debug is off");
        }

        info!(
            order = %self.order,
            layers = layers.len(),
            keys = layers.iter().map(|layer| layer.values.len()).sum::<usize>(),
            "Settings resolved"
        );
        Ok(Resolved { settings, layers })
    }
}

/// Stacks `layers` (highest precedence first) over the model defaults and deserializes them.
pub(crate) fn deserialize_layers(layers: &[Layer]) -> Result<Settings> {
    layers
        .iter()
        .rev()
        .fold(Config::builder(), |builder, layer| builder.add_source(layer.clone()))
        .build()
        .context("Failed to layer settings sources")?
        .try_deserialize::<Settings>()
        .context("Failed to deserialize settings")
}

/// Resolves settings from the environment and `.env` only.
///
/// # Errors
/// See [`SettingsLoader::load`].
pub fn load_settings() -> Result<Resolved> {
    SettingsLoader::default().load()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_order_puts_remote_first() {
        assert_eq!(SourceOrder::default().to_string(), "remote,env,init,secrets");
    }

    #[test]
    fn order_parses_and_rejects_duplicates() {
        let order: SourceOrder = " env , secrets ".parse().unwrap();
        assert_eq!(order.kinds(), &[SourceKind::Env, SourceKind::Secrets]);

        assert!(matches!(
            "env,remote,env".parse::<SourceOrder>(),
            Err(SettingsError::InvalidOrder { .. })
        ));
        assert!("env,vault".parse::<SourceOrder>().is_err());
    }

    #[test]
    fn no_layers_yield_defaults() {
        assert_eq!(deserialize_layers(&[]).unwrap(), Settings::default());
    }
}
