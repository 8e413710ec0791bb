//! Adapter configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors loading descriptors or configuration from files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Behavioural switches for an [`InputAdapter`](crate::InputAdapter).
///
/// Both default to off, which matches the established conversion behaviour.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Reject streams arriving at slots that are not declared as streams.
    pub strict_synchronicity: bool,
    /// Convert every element of a composite input against its own slot,
    /// not only the first and the last.
    pub convert_all_composite_elements: bool,
}

impl AdapterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strict_synchronicity(mut self, strict: bool) -> Self {
        self.strict_synchronicity = strict;
        self
    }

    pub fn with_convert_all_composite_elements(mut self, all: bool) -> Self {
        self.convert_all_composite_elements = all;
        self
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_off() {
        let config = AdapterConfig::default();
        assert!(!config.strict_synchronicity);
        assert!(!config.convert_all_composite_elements);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = AdapterConfig::from_yaml_str("strict_synchronicity: true\n").unwrap();
        assert!(config.strict_synchronicity);
        assert!(!config.convert_all_composite_elements);
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("adapter.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "convert_all_composite_elements: true").unwrap();

        let config = AdapterConfig::from_path(&path).unwrap();
        assert_eq!(
            config,
            AdapterConfig::new().with_convert_all_composite_elements(true)
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = AdapterConfig::from_path(dir.path().join("absent.yaml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
