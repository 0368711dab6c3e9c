use super::{SettingsSource, SourceKind, string_value};
use crate::error::{Result, SettingsErrorExt};
use config::{Map, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use strata_domain::Settings;
use tracing::debug;

const DEFAULT_ENV_FILE: &str = ".env";

/// Environment variables plus an optional dotenv file.
///
/// Variable names are matched case-insensitively against the settings fields after the
/// optional prefix is stripped; everything else in the environment is ignored. Process
/// variables win over dotenv entries. The dotenv file is read without touching the
/// process environment.
#[derive(Debug, Clone)]
pub struct EnvSource {
    prefix: Option<String>,
    env_file: Option<PathBuf>,
    vars: Option<Vec<(String, String)>>,
}

impl Default for EnvSource {
    fn default() -> Self {
        Self { prefix: None, env_file: Some(PathBuf::from(DEFAULT_ENV_FILE)), vars: None }
    }
}

impl EnvSource {
    /// Reads the process environment and `.env` in the working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a fixed set of variables instead of the process environment.
    ///
    /// No dotenv file is read unless one is set with [`EnvSource::env_file`].
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            prefix: None,
            env_file: None,
            vars: Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
        }
    }

    /// Only variables starting with `prefix` (case-insensitive) are considered.
    #[must_use = "The source must be configured before it is handed to the loader."]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.prefix = (!prefix.is_empty()).then_some(prefix);
        self
    }

    /// Sets the dotenv file; a missing file is not an error.
    #[must_use = "The source must be configured before it is handed to the loader."]
    pub fn env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = Some(path.into());
        self
    }

    #[must_use = "The source must be configured before it is handed to the loader."]
    pub fn without_env_file(mut self) -> Self {
        self.env_file = None;
        self
    }

    /// Maps a variable name onto a settings field, if it addresses one.
    fn field_for(&self, name: &str) -> Option<String> {
        let stripped = match &self.prefix {
            Some(prefix) => {
                let head = name.get(..prefix.len())?;
                if !head.eq_ignore_ascii_case(prefix) {
                    return None;
                }
                &name[prefix.len()..]
            },
            None => name,
        };
        let key = stripped.to_ascii_lowercase();
        Settings::is_field(&key).then_some(key)
    }

    fn read_env_file(&self, path: &Path, values: &mut Map<String, Value>) -> Result<()> {
        let iter = match dotenvy::from_path_iter(path) {
            Ok(iter) => iter,
            Err(dotenvy::Error::Io(e)) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No dotenv file, skipping");
                return Ok(());
            },
            Err(e) => {
                return Err(e).context(format!("Failed to open dotenv file {}", path.display()));
            },
        };

        let origin = path.display().to_string();
        for item in iter {
            let (name, raw) =
                item.context(format!("Failed to parse dotenv file {}", path.display()))?;
            if let Some(key) = self.field_for(&name) {
                values.insert(key, string_value(&origin, raw));
            }
        }
        Ok(())
    }

    fn process_vars(&self) -> Vec<(String, String)> {
        self.vars.clone().unwrap_or_else(|| {
            std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect()
        })
    }
}

impl SettingsSource for EnvSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Env
    }

    fn origin(&self) -> String {
        match (&self.prefix, &self.env_file) {
            (Some(prefix), Some(file)) => {
                format!("environment ({prefix}*) + {}", file.display())
            },
            (Some(prefix), None) => format!("environment ({prefix}*)"),
            (None, Some(file)) => format!("environment + {}", file.display()),
            (None, None) => "environment".to_owned(),
        }
    }

    fn load(&self) -> Result<Map<String, Value>> {
        let mut values = Map::new();

        if let Some(path) = &self.env_file {
            self.read_env_file(path, &mut values)?;
        }

        for (name, raw) in self.process_vars() {
            if let Some(key) = self.field_for(&name) {
                let origin = format!("environment variable {name}");
                values.insert(key, string_value(&origin, raw));
            }
        }

        Ok(values)
    }
}
