// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Typed access to the free-form `options` map of a retriever or flow entry.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::errors::ConfigError;

pub struct Options<'a> {
    kind: &'a str,
    values: &'a HashMap<String, serde_yaml::Value>,
}

impl<'a> Options<'a> {
    pub fn new(kind: &'a str, values: &'a HashMap<String, serde_yaml::Value>) -> Self {
        Self { kind, values }
    }

    fn invalid(&self, option: &str, reason: impl Into<String>) -> ConfigError {
        ConfigError::InvalidOption {
            kind: self.kind.to_string(),
            option: option.to_string(),
            reason: reason.into(),
        }
    }

    pub fn string(&self, key: &str) -> Result<Option<String>, ConfigError> {
        match self.values.get(key) {
            None | Some(serde_yaml::Value::Null) => Ok(None),
            Some(serde_yaml::Value::String(s)) => Ok(Some(s.clone())),
            // tool versions like 0.38 are parsed as numbers by YAML
            Some(serde_yaml::Value::Number(n)) => Ok(Some(n.to_string())),
            Some(_) => Err(self.invalid(key, "expected a string")),
        }
    }

    pub fn string_or(&self, key: &str, default: &str) -> Result<String, ConfigError> {
        Ok(self.string(key)?.unwrap_or_else(|| default.to_string()))
    }

    pub fn required_path(&self, key: &str) -> Result<PathBuf, ConfigError> {
        self.string(key)?
            .map(PathBuf::from)
            .ok_or_else(|| self.invalid(key, "required option is missing"))
    }

    pub fn usize(&self, key: &str) -> Result<Option<usize>, ConfigError> {
        match self.values.get(key) {
            None | Some(serde_yaml::Value::Null) => Ok(None),
            Some(serde_yaml::Value::Number(n)) => n
                .as_u64()
                .map(|v| Some(v as usize))
                .ok_or_else(|| self.invalid(key, "expected a non-negative integer")),
            Some(_) => Err(self.invalid(key, "expected a non-negative integer")),
        }
    }

    /// Deserialize one option into any serde type.
    pub fn parse<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.values.get(key) {
            None | Some(serde_yaml::Value::Null) => Ok(None),
            Some(value) => serde_yaml::from_value(value.clone())
                .map(Some)
                .map_err(|e| self.invalid(key, e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(yaml: &str) -> HashMap<String, serde_yaml::Value> {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_typed_accessors() {
        let map = values("yosys_bin: /opt/yosys/bin/yosys\ntool_version: 0.38\nmax_files: 64\n");
        let options = Options::new("yosys_aig", &map);

        assert_eq!(options.string("yosys_bin").unwrap().as_deref(), Some("/opt/yosys/bin/yosys"));
        assert_eq!(options.string("tool_version").unwrap().as_deref(), Some("0.38"));
        assert_eq!(options.usize("max_files").unwrap(), Some(64));
        assert_eq!(options.string_or("missing", "yosys").unwrap(), "yosys");
        assert!(options.required_path("path").is_err());
    }

    #[test]
    fn test_wrong_type_is_reported_with_kind_and_option() {
        let map = values("max_files: many\n");
        let err = Options::new("yosys_aig", &map).usize("max_files").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("max_files"));
        assert!(msg.contains("yosys_aig"));
    }
}
