//! Settings sources.
//!
//! Every source yields a flat map of lowercase field names to [`config::Value`]s.
//! The resolver snapshots each source once into a [`Layer`] and stacks the layers
//! with the `config` crate according to the configured [`SourceOrder`](crate::SourceOrder).

mod env;
mod init;
mod remote;
mod secrets;

pub use env::EnvSource;
pub use init::InitSource;
pub use remote::{RemoteFormat, RemoteSource};
pub use secrets::SecretsSource;

use crate::error::{Result, SettingsError};
use config::{Map, Value, ValueKind};
use std::fmt;
use std::str::FromStr;

/// The four places a setting can come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Remote,
    Env,
    Init,
    Secrets,
}

impl SourceKind {
    pub const ALL: [Self; 4] = [Self::Remote, Self::Env, Self::Init, Self::Secrets];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Env => "env",
            Self::Init => "init",
            Self::Secrets => "secrets",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(Self::Remote),
            "env" | "environment" => Ok(Self::Env),
            "init" => Ok(Self::Init),
            "secrets" | "secret" => Ok(Self::Secrets),
            other => Err(SettingsError::InvalidOrder {
                message: format!("unknown source '{other}'").into(),
                context: None,
            }),
        }
    }
}

/// A provider of raw setting values.
pub trait SettingsSource: fmt::Debug + Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Where the values come from (URL, directory, file), for logs and provenance.
    fn origin(&self) -> String;

    /// Collects the values this source currently provides.
    ///
    /// # Errors
    /// Returns an error when the source is unusable and is not allowed to degrade to an empty map.
    fn load(&self) -> Result<Map<String, Value>>;
}

/// A one-shot snapshot of a source, stackable by the `config` builder.
#[derive(Debug, Clone)]
pub struct Layer {
    pub kind: SourceKind,
    pub origin: String,
    pub values: Map<String, Value>,
}

impl Layer {
    /// Loads `source` once and freezes the result.
    ///
    /// # Errors
    /// Propagates the source's load error.
    pub fn collect(source: &dyn SettingsSource) -> Result<Self> {
        let values = source.load()?;
        tracing::debug!(
            source = %source.kind(),
            origin = %source.origin(),
            keys = values.len(),
            "Collected settings layer"
        );
        Ok(Self { kind: source.kind(), origin: source.origin(), values })
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(&key.to_ascii_lowercase())
    }
}

impl config::Source for Layer {
    fn clone_into_box(&self) -> Box<dyn config::Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> std::result::Result<Map<String, Value>, config::ConfigError> {
        Ok(self.values.clone())
    }
}

/// Converts a JSON document into a `config` value, lowercasing object keys.
#[must_use]
#[allow(clippy::ptr_arg)]
pub fn json_to_value(origin: &String, json: serde_json::Value) -> Value {
    let kind = match json {
        serde_json::Value::Null => ValueKind::Nil,
        serde_json::Value::Bool(b) => ValueKind::Boolean(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                ValueKind::I64(i)
            } else if let Some(u) = n.as_u64() {
                ValueKind::U64(u)
            } else {
                ValueKind::Float(n.as_f64().unwrap_or_default())
            }
        },
        serde_json::Value::String(s) => ValueKind::String(s),
        serde_json::Value::Array(items) => {
            ValueKind::Array(items.into_iter().map(|item| json_to_value(origin, item)).collect())
        },
        serde_json::Value::Object(fields) => ValueKind::Table(
            fields
                .into_iter()
                .map(|(key, value)| (key.to_ascii_lowercase(), json_to_value(origin, value)))
                .collect(),
        ),
    };
    Value::new(Some(origin), kind)
}

/// Wraps a plain string as a `config` value; coercion happens at deserialization time.
#[allow(clippy::ptr_arg)]
pub(crate) fn string_value(origin: &String, raw: impl Into<String>) -> Value {
    Value::new(Some(origin), ValueKind::String(raw.into()))
}

pub(crate) const fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
