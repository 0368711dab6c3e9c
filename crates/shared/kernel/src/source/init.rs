use super::{SettingsSource, SourceKind};
use crate::error::Result;
use config::{Map, Value, ValueKind};

const ORIGIN: &str = "init arguments";

/// Values passed explicitly by the caller (code or `--set KEY=VALUE`).
#[derive(Debug, Clone, Default)]
pub struct InitSource {
    values: Map<String, Value>,
}

impl InitSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` (case-insensitive) to `value`, replacing any earlier value.
    pub fn set(&mut self, key: impl AsRef<str>, value: impl Into<ValueKind>) -> &mut Self {
        let origin = ORIGIN.to_owned();
        self.values.insert(key.as_ref().to_ascii_lowercase(), Value::new(Some(&origin), value));
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for InitSource
where
    K: AsRef<str>,
    V: Into<ValueKind>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut source = Self::new();
        for (key, value) in iter {
            source.set(key, value);
        }
        source
    }
}

impl SettingsSource for InitSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Init
    }

    fn origin(&self) -> String {
        ORIGIN.to_owned()
    }

    fn load(&self) -> Result<Map<String, Value>> {
        Ok(self.values.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_values_replace_earlier_ones() {
        let mut source = InitSource::new();
        source.set("MONGO_URL", "mongodb://first").set("mongo_url", "mongodb://second");

        let values = source.load().unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values["mongo_url"].clone().into_string().unwrap(), "mongodb://second");
    }

    #[test]
    fn collects_from_pairs() {
        let source: InitSource = [("nccm", true), ("debug", false)].into_iter().collect();
        assert_eq!(source.keys().count(), 2);
        assert!(!source.is_empty());
    }
}
