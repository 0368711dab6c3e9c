use super::{SettingsSource, SourceKind, string_value};
use crate::error::{Result, SettingsErrorExt};
use config::{Map, Value};
use std::fs;
use std::path::PathBuf;
use strata_domain::Settings;
use tracing::{debug, warn};

/// One file per setting inside a secrets directory (Docker/Kubernetes style mounts).
///
/// The file name selects the field (case-insensitive) and the content, minus trailing
/// whitespace, is the value. Files that do not name a field are ignored.
#[derive(Debug, Clone)]
pub struct SecretsSource {
    dir: PathBuf,
}

impl SecretsSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl SettingsSource for SecretsSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Secrets
    }

    fn origin(&self) -> String {
        self.dir.display().to_string()
    }

    fn load(&self) -> Result<Map<String, Value>> {
        let mut values = Map::new();

        if !self.dir.exists() {
            warn!(dir = %self.dir.display(), "Secrets directory does not exist, skipping");
            return Ok(values);
        }
        if !self.dir.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotADirectory,
                format!("{} is not a directory", self.dir.display()),
            ))
            .context("Secrets path must be a directory");
        }

        let entries = fs::read_dir(&self.dir)
            .context(format!("Failed to list secrets directory {}", self.dir.display()))?;

        for entry in entries {
            let path = entry.context("Failed to read secrets directory entry")?.path();
            // `is_file` follows symlinks, which is how Kubernetes projects secrets.
            if !path.is_file() {
                continue;
            }
            let Some(key) = path
                .file_name()
                .and_then(|name| name.to_str())
                .map(str::to_ascii_lowercase)
                .filter(|key| Settings::is_field(key))
            else {
                continue;
            };

            let content = fs::read_to_string(&path)
                .context(format!("Failed to read secret file {}", path.display()))?;
            let origin = path.display().to_string();
            values.insert(key, string_value(&origin, content.trim_end()));
        }

        debug!(dir = %self.dir.display(), keys = values.len(), "Read secret files");
        Ok(values)
    }
}
