//! Text renderings of resolved settings.

use crate::models::args::OutputFormat;
use anyhow::{Context, Result, bail};
use strata_kernel::domain::Settings;

pub fn document(settings: &Settings, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(settings).context("Failed to render settings as JSON")
        },
        OutputFormat::Toml => {
            toml::to_string_pretty(settings).context("Failed to render settings as TOML")
        },
    }
}

/// Renders one field: strings verbatim, everything else as JSON, unset optionals as "".
pub fn field(settings: &Settings, key: &str) -> Result<String> {
    let key = key.trim().to_ascii_lowercase();
    if !Settings::is_field(&key) {
        bail!("unknown setting '{key}'");
    }
    let document = serde_json::to_value(settings).context("Failed to serialize settings")?;
    Ok(match document.get(&key) {
        Some(serde_json::Value::String(text)) => text.clone(),
        Some(serde_json::Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_render_without_json_quoting() {
        let settings = Settings { debug: true, ..Settings::default() };
        assert_eq!(field(&settings, "DEBUG").unwrap(), "true");
        assert_eq!(field(&settings, "db_port").unwrap(), settings.db_port.to_string());
        assert_eq!(field(&settings, "mongo_url").unwrap(), settings.mongo_url);
        assert_eq!(field(&settings, "media_url").unwrap(), "");
        assert!(field(&settings, "nope").is_err());
    }

    #[test]
    fn toml_output_skips_unset_optionals() {
        let rendered = document(&Settings::default(), OutputFormat::Toml).unwrap();
        assert!(rendered.contains("db_name = "));
        assert!(!rendered.contains("media_url"));
    }
}
