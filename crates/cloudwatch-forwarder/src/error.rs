// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use log_shipper::ShipperError;

/// Failures turning the subscription payload into a batch. Always fatal.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Payload is not valid gzip: {0}")]
    Decompress(#[source] std::io::Error),

    #[error("Payload is not a valid log batch: {0}")]
    Json(#[from] serde_json::Error),
}

/// Rejected configuration, reported at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid ENRICH entry '{entry}': expected key=value")]
    MalformedEnrichEntry { entry: String },

    #[error("Invalid ENRICH entry '{entry}': key cannot be empty")]
    EmptyEnrichKey { entry: String },

    #[error("Invalid log level '{0}'. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

/// Errors that abort a whole invocation.
#[derive(Debug, thiserror::Error)]
pub enum ForwarderError {
    #[error("Failed to decode log batch: {0}")]
    Decode(#[from] DecodeError),

    #[error("Expected log inside logEvents to be a mapping but found {found} at index {index}")]
    NotAMapping { index: usize, found: &'static str },

    #[error("Log at index {index} has no '{field}' field")]
    MissingField { index: usize, field: &'static str },

    #[error("Failed to ship logs: {0}")]
    Ship(#[from] ShipperError),
}
