use crate::core::TriggerSink;
use crate::data::storage::{CsvTriggerSink, JsonTriggerSink, LogTriggerSink};
use crate::error::{MonitorError, MonitorResult};
use std::collections::HashMap;
use std::path::Path;

type SinkFactory = Box<dyn Fn(&Path) -> MonitorResult<Box<dyn TriggerSink>> + Send + Sync>;

/// Builds trigger sinks by name for a given output directory.
pub struct SinkRegistry {
    factories: HashMap<String, SinkFactory>,
}

impl Default for SinkRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SinkRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };

        registry.register("csv", |dir| Ok(Box::new(CsvTriggerSink::create(dir)?)));
        registry.register("json", |dir| Ok(Box::new(JsonTriggerSink::create(dir)?)));
        registry.register("log", |_dir| Ok(Box::new(LogTriggerSink)));

        registry
    }

    /// Adds or replaces the factory for `name`.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&Path) -> MonitorResult<Box<dyn TriggerSink>> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_string(), Box::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn create(&self, name: &str, output_dir: &Path) -> MonitorResult<Box<dyn TriggerSink>> {
        self.factories
            .get(name)
            .ok_or_else(|| MonitorError::UnknownSink(name.to_string()))
            .and_then(|factory| factory(output_dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::storage::CollectingSink;

    #[test]
    fn test_builtin_sinks_registered() {
        let registry = SinkRegistry::new();
        assert_eq!(registry.names(), vec!["csv", "json", "log"]);
    }

    #[test]
    fn test_unknown_sink() {
        let dir = tempfile::tempdir().unwrap();
        let err = SinkRegistry::new().create("hdf5", dir.path()).err().unwrap();
        assert!(matches!(err, MonitorError::UnknownSink(name) if name == "hdf5"));
    }

    #[test]
    fn test_custom_sink_registration() {
        let collected = CollectingSink::new();
        let handle = collected.clone();
        let mut registry = SinkRegistry::new();
        registry.register("memory", move |_| Ok(Box::new(handle.clone())));
        assert!(registry.contains("memory"));
        assert!(registry.create("memory", Path::new(".")).is_ok());
    }

    #[test]
    fn test_csv_sink_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("stream-a");
        assert!(SinkRegistry::new().create("csv", &nested).is_ok());
        assert!(nested.join("triggers.csv").exists());
    }
}
