//! Runtime attribute overrides from a fetched settings list.
//!
//! This is the older pattern: the process fetches `[{"name": ..., "value": ...}]` and patches
//! the live settings field by field. It is kept for endpoints that still serve the list
//! shape; new deployments should let [`RemoteSource`](crate::RemoteSource) feed the layered
//! loader instead. Every value is still type-checked against the model and a bad batch leaves
//! the settings untouched.

use crate::error::{Result, SettingsError, SettingsErrorExt};
use crate::resolver::deserialize_layers;
use crate::source::{Layer, SourceKind, json_to_value, json_type};
use config::{Map, Value};
use serde::{Deserialize, Serialize};
use strata_domain::Settings;
use tracing::{info, warn};

/// One entry of a fetched settings list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedSetting {
    pub name: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl NamedSetting {
    pub fn new(name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

/// What [`apply_overrides`] did with each entry.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AppliedOverrides {
    /// Lowercased field names that were overwritten, in input order.
    pub applied: Vec<String>,
    /// Names that do not address any field, as received.
    pub skipped: Vec<String>,
}

/// Parses the list shape served by legacy endpoints.
///
/// # Errors
/// Returns [`SettingsError::Payload`] when the body is not an array and
/// [`SettingsError::Json`] when an element is not a `{name, value}` record.
pub fn parse_named_list(body: serde_json::Value) -> Result<Vec<NamedSetting>> {
    match body {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<NamedSetting>, _>>()
            .context("Expected {name, value} records"),
        other => Err(SettingsError::Payload {
            message: format!("expected a JSON array of settings records, got {}", json_type(&other))
                .into(),
            context: None,
        }),
    }
}

/// Overwrites fields of `settings` by name (case-insensitive).
///
/// Values go through the same coercion as the layered loader, so `"true"` is accepted for a
/// boolean and `"6380"` for a port.
///
/// # Errors
/// Returns an error if any value cannot be coerced into its field's type or if the patched
/// settings fail validation. In both cases `settings` is not modified.
pub fn apply_overrides(
    settings: &mut Settings,
    entries: &[NamedSetting],
) -> Result<AppliedOverrides> {
    let serde_json::Value::Object(current) =
        serde_json::to_value(&*settings).context("Failed to snapshot current settings")?
    else {
        return Err("settings did not serialize to an object".into());
    };

    let current_origin = "current settings".to_owned();
    let mut values: Map<String, Value> = current
        .into_iter()
        .map(|(key, value)| (key, json_to_value(&current_origin, value)))
        .collect();

    let override_origin = "runtime override".to_owned();
    let mut report = AppliedOverrides::default();
    for entry in entries {
        let key = entry.name.to_ascii_lowercase();
        if Settings::is_field(&key) {
            values.insert(key.clone(), json_to_value(&override_origin, entry.value.clone()));
            report.applied.push(key);
        } else {
            warn!(name = %entry.name, "Ignoring override for unknown setting");
            report.skipped.push(entry.name.clone());
        }
    }

    let layer = Layer { kind: SourceKind::Remote, origin: override_origin, values };
    let patched = deserialize_layers(std::slice::from_ref(&layer))
        .context("Failed to apply runtime overrides")?;

    let issues = patched.validate();
    if !issues.is_empty() {
        return Err(SettingsError::Validation {
            issues,
            context: Some("Runtime overrides rejected".into()),
        });
    }

    *settings = patched;
    info!(applied = report.applied.len(), skipped = report.skipped.len(), "Applied runtime overrides");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_records_and_defaults_missing_values() {
        let list = parse_named_list(json!([
            { "name": "DEBUG", "value": true },
            { "name": "MEDIA_URL" }
        ]))
        .unwrap();

        assert_eq!(list[0], NamedSetting::new("DEBUG", true));
        assert_eq!(list[1].value, serde_json::Value::Null);
    }

    #[test]
    fn rejects_objects_and_bad_records() {
        assert!(matches!(
            parse_named_list(json!({ "DEBUG": true })),
            Err(SettingsError::Payload { .. })
        ));
        assert!(matches!(parse_named_list(json!([42])), Err(SettingsError::Json { .. })));
    }
}
