// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::env;

use crate::error::ConfigError;

const ENRICH_SEPARATOR: char = ';';
const ENRICH_KEY_VALUE_SEPARATOR: char = '=';

/// Expected encoding of the `message` field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MessageFormat {
    #[default]
    Text,
    /// Messages carry JSON objects that are expanded into the record
    Json,
}

impl MessageFormat {
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            MessageFormat::Json
        } else {
            MessageFormat::Text
        }
    }
}

/// Configuration for the forwarder, read once at cold start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Expected message encoding (`FORMAT`)
    pub format: MessageFormat,
    /// Static fields added to every record (`ENRICH`), in declaration order
    pub enrich: Vec<(String, String)>,
    /// Record type tag override (`TYPE`)
    pub record_type: Option<String>,
    /// Log level of the forwarder itself (`LOG_LEVEL`)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: MessageFormat::Text,
            enrich: Vec::new(),
            record_type: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let format = lookup("FORMAT")
            .map(|val| MessageFormat::parse(&val))
            .unwrap_or_default();
        let enrich = match lookup("ENRICH") {
            Some(val) => parse_enrich(&val)?,
            None => Vec::new(),
        };
        let record_type = lookup("TYPE").filter(|val| !val.is_empty());
        let log_level = lookup("LOG_LEVEL")
            .map(|val| val.to_lowercase())
            .unwrap_or_else(|| "info".to_string());

        let config = Self {
            format,
            enrich,
            record_type,
            log_level,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.log_level.clone()));
        }

        Ok(())
    }
}

/// Parses `key=value;key=value` enrichment pairs.
///
/// Values are split on the first `=`, so they may contain further `=`.
/// Empty segments such as a trailing `;` are skipped.
pub fn parse_enrich(value: &str) -> Result<Vec<(String, String)>, ConfigError> {
    value
        .split(ENRICH_SEPARATOR)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let Some((key, val)) = entry.split_once(ENRICH_KEY_VALUE_SEPARATOR) else {
                return Err(ConfigError::MalformedEnrichEntry {
                    entry: entry.to_string(),
                });
            };
            if key.is_empty() {
                return Err(ConfigError::EmptyEnrichKey {
                    entry: entry.to_string(),
                });
            }
            Ok((key.to_string(), val.to_string()))
        })
        .collect()
}
