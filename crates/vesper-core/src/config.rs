// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Tunables of the recording layer and the identifier map.
//!
//! Every field has a default, so an empty RON document `()` is a valid
//! configuration and callers only spell out what they change.

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading a [`VesperConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The RON text could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// The free-list thresholds would make the hash index flap.
    #[error("Invalid id map thresholds: low ({low}) must be below high ({high})")]
    InvalidThresholds {
        /// Demotion threshold.
        low: usize,
        /// Promotion threshold.
        high: usize,
    },
}

/// Options of the pass recording layer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PassConfig {
    /// Wrap each submitted pass in an executor debug group named after it.
    pub debug_groups: bool,
}

impl Default for PassConfig {
    fn default() -> Self {
        Self { debug_groups: true }
    }
}

/// Options of the identifier map.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IdMapConfig {
    /// Free-list size above which an `id -> position` index is built.
    pub hashmap_threshold_high: usize,
    /// Free-list size below which the index is dropped again.
    pub hashmap_threshold_low: usize,
    /// Number of id slots reserved up front.
    pub initial_capacity: usize,
}

impl Default for IdMapConfig {
    fn default() -> Self {
        Self {
            hashmap_threshold_high: 1024,
            hashmap_threshold_low: 512,
            initial_capacity: 0,
        }
    }
}

impl IdMapConfig {
    /// Checks that the promotion and demotion thresholds are ordered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hashmap_threshold_low >= self.hashmap_threshold_high {
            return Err(ConfigError::InvalidThresholds {
                low: self.hashmap_threshold_low,
                high: self.hashmap_threshold_high,
            });
        }
        Ok(())
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VesperConfig {
    /// Pass recording options.
    pub pass: PassConfig,
    /// Identifier map options.
    pub id_map: IdMapConfig,
}

impl VesperConfig {
    /// Parses and validates a configuration from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: VesperConfig = ron::from_str(text)?;
        config.id_map.validate()?;
        log::debug!("Loaded configuration: {config:?}");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = VesperConfig::from_ron_str("()").unwrap();
        assert_eq!(config, VesperConfig::default());
        assert!(config.pass.debug_groups);
        assert_eq!(config.id_map.hashmap_threshold_high, 1024);
        assert_eq!(config.id_map.hashmap_threshold_low, 512);
    }

    #[test]
    fn partial_document_overrides_fields() {
        let config = VesperConfig::from_ron_str(
            "(pass: (debug_groups: false), id_map: (hashmap_threshold_high: 64, hashmap_threshold_low: 16))",
        )
        .unwrap();
        assert!(!config.pass.debug_groups);
        assert_eq!(config.id_map.hashmap_threshold_high, 64);
        assert_eq!(config.id_map.hashmap_threshold_low, 16);
        assert_eq!(config.id_map.initial_capacity, 0);
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let err = VesperConfig::from_ron_str(
            "(id_map: (hashmap_threshold_high: 8, hashmap_threshold_low: 8))",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidThresholds { low: 8, high: 8 }
        ));
    }

    #[test]
    fn malformed_text_is_a_parse_error() {
        let err = VesperConfig::from_ron_str("(pass: (debug_groups: maybe))").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
