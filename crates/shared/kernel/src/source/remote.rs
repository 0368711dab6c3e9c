use super::{SettingsSource, SourceKind, json_to_value, json_type};
use crate::error::{Result, SettingsError, SettingsErrorExt};
use crate::legacy;
use config::{Map, Value};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use std::time::{Duration, Instant};
use strata_domain::Settings;
use tracing::{debug, warn};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Shape of the document served by the settings endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RemoteFormat {
    /// `{"KEY": value, ...}`
    #[default]
    FlatObject,
    /// `[{"name": "KEY", "value": value}, ...]`
    NamedList,
}

/// Fetches settings with a single HTTP GET.
///
/// The client is blocking: call [`SettingsSource::load`] from a plain thread, never from
/// inside an async runtime. By default any failure degrades to an empty map so the other
/// sources can fill in; [`RemoteSource::required`] turns failures into errors instead.
#[derive(Debug, Clone)]
pub struct RemoteSource {
    url: String,
    timeout: Duration,
    format: RemoteFormat,
    required: bool,
}

impl RemoteSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: DEFAULT_TIMEOUT,
            format: RemoteFormat::default(),
            required: false,
        }
    }

    #[must_use = "The source must be configured before it is handed to the loader."]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use = "The source must be configured before it is handed to the loader."]
    pub const fn format(mut self, format: RemoteFormat) -> Self {
        self.format = format;
        self
    }

    /// Fail the whole load instead of falling back to an empty map.
    #[must_use = "The source must be configured before it is handed to the loader."]
    pub const fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    fn fetch(&self) -> Result<Map<String, Value>> {
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let started = Instant::now();
        let body: serde_json::Value = client
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .send()
            .context("Request failed")?
            .error_for_status()
            .context("Endpoint returned an error status")?
            .json()
            .context("Body is not valid JSON")?;

        let entries = match self.format {
            RemoteFormat::FlatObject => flat_entries(body)?,
            RemoteFormat::NamedList => legacy::parse_named_list(body)?
                .into_iter()
                .map(|entry| (entry.name, entry.value))
                .collect(),
        };

        let received = entries.len();
        let values: Map<String, Value> = entries
            .into_iter()
            .map(|(key, value)| (key.to_ascii_lowercase(), value))
            .filter(|(key, _)| Settings::is_field(key))
            .map(|(key, value)| (key, json_to_value(&self.url, value)))
            .collect();

        debug!(
            url = %self.url,
            keys = values.len(),
            ignored = received - values.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "Fetched remote settings"
        );
        Ok(values)
    }
}

impl SettingsSource for RemoteSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Remote
    }

    fn origin(&self) -> String {
        self.url.clone()
    }

    fn load(&self) -> Result<Map<String, Value>> {
        match self.fetch() {
            Err(e) if !self.required => {
                warn!(url = %self.url, error = %e, "Failed to load remote settings, falling back to other sources");
                Ok(Map::new())
            },
            result => result,
        }
    }
}

fn flat_entries(body: serde_json::Value) -> Result<Vec<(String, serde_json::Value)>> {
    match body {
        serde_json::Value::Object(fields) => Ok(fields.into_iter().collect()),
        other => Err(SettingsError::Payload {
            message: format!("expected a JSON object of settings, got {}", json_type(&other)).into(),
            context: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flat_entries_rejects_non_objects() {
        let err = flat_entries(json!([1, 2])).unwrap_err();
        assert!(matches!(err, SettingsError::Payload { .. }));
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn unreachable_endpoint_falls_back_to_empty() {
        // Port 9 (discard) on localhost is closed in test environments.
        let source =
            RemoteSource::new("http://127.0.0.1:9/settings").timeout(Duration::from_millis(200));
        let values = source.load().expect("optional remote source must not fail");
        assert!(values.is_empty());
    }

    #[test]
    fn unreachable_required_endpoint_fails() {
        let source = RemoteSource::new("http://127.0.0.1:9/settings")
            .timeout(Duration::from_millis(200))
            .required(true);
        let err = source.load().unwrap_err();
        assert!(matches!(err, SettingsError::Remote { context: Some(_), .. }));
    }
}
