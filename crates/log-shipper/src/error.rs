// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Errors surfaced by a [`crate::Shipper`].
#[derive(Debug, thiserror::Error)]
pub enum ShipperError {
    #[error("Invalid shipper configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to compress bulk: {0}")]
    Compress(#[from] std::io::Error),

    #[error("Record of {size} bytes could not be added to an empty bulk")]
    RecordRejected { size: usize },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Listener rejected the token with status {status}")]
    Unauthorized { status: u16 },

    #[error("Failed to ship bulk after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },
}
