// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::time::Duration;

use crate::error::ShipperError;

pub const DEFAULT_MAX_BULK_SIZE_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_MAX_RETRIES: u32 = 4;
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 2_000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Configuration for the HTTP bulk shipper
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipperConfig {
    /// Listener endpoint receiving bulks
    pub url: String,
    /// Account token, sent as the `token` query parameter
    pub token: Option<String>,
    /// Gzip request bodies
    pub compress: bool,
    /// Upper bound of one uncompressed bulk
    pub max_bulk_size_bytes: usize,
    /// Attempts per bulk before giving up
    pub max_retries: u32,
    /// Delay before the first retry, doubled on every further attempt
    pub initial_backoff: Duration,
    pub request_timeout: Duration,
}

impl Default for ShipperConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            token: None,
            compress: true,
            max_bulk_size_bytes: DEFAULT_MAX_BULK_SIZE_BYTES,
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff: Duration::from_millis(DEFAULT_INITIAL_BACKOFF_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ShipperConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, ShipperError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ShipperError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let url = lookup("URL")
            .map(|val| val.trim().to_string())
            .unwrap_or_default();
        let token = lookup("TOKEN").filter(|val| !val.is_empty());
        let compress = lookup("COMPRESS")
            .map(|val| val.to_lowercase() != "false")
            .unwrap_or(defaults.compress);
        let max_bulk_size_bytes = lookup("MAX_BULK_SIZE_BYTES")
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(defaults.max_bulk_size_bytes);
        let max_retries = lookup("MAX_RETRIES")
            .and_then(|val| val.parse::<u32>().ok())
            .unwrap_or(defaults.max_retries);
        let initial_backoff = lookup("INITIAL_BACKOFF_MS")
            .and_then(|val| val.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.initial_backoff);
        let request_timeout = lookup("REQUEST_TIMEOUT_SECS")
            .and_then(|val| val.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let config = Self {
            url,
            token,
            compress,
            max_bulk_size_bytes,
            max_retries,
            initial_backoff,
            request_timeout,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ShipperError> {
        if self.url.is_empty() {
            return Err(ShipperError::InvalidConfig("URL is not set".to_string()));
        }

        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(ShipperError::InvalidConfig(format!(
                "URL '{}' must start with http:// or https://",
                self.url
            )));
        }

        if self.max_bulk_size_bytes == 0 {
            return Err(ShipperError::InvalidConfig(
                "MAX_BULK_SIZE_BYTES must be greater than 0".to_string(),
            ));
        }

        if self.max_retries == 0 {
            return Err(ShipperError::InvalidConfig(
                "MAX_RETRIES must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
