// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Decoding of CloudWatch Logs subscription payloads.
//!
//! The subscription delivers `{"awslogs": {"data": "..."}}` where `data` is
//! base64 of a gzip stream of the JSON batch. Decoding is all-or-nothing.

use std::io::Read;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::MultiGzDecoder;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DecodeError, ForwarderError};
use log_shipper::Record;

/// Inbound event delivered by a CloudWatch Logs subscription filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudWatchLogsEvent {
    pub awslogs: AwsLogs,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsLogs {
    /// base64 encoded, gzip compressed JSON batch
    pub data: String,
}

impl CloudWatchLogsEvent {
    pub fn decode(&self) -> Result<RawBatch, DecodeError> {
        decode(&self.awslogs.data)
    }
}

/// Decoded batch with its batch-level metadata.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBatch {
    /// Kept untyped: entries are checked one by one when the batch is driven.
    pub log_events: Vec<Value>,
    pub log_group: String,
    pub log_stream: String,
    pub message_type: String,
    pub owner: String,
}

/// Decodes base64, then gunzips, then parses the JSON batch.
///
/// Every gzip member of the stream is decompressed, not just the first.
pub fn decode(data: &str) -> Result<RawBatch, DecodeError> {
    let compressed = STANDARD.decode(data.trim())?;

    let mut decoder = MultiGzDecoder::new(&compressed[..]);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(DecodeError::Decompress)?;

    Ok(serde_json::from_slice(&decompressed)?)
}

/// One entry of `logEvents`, known to be a JSON object with a timestamp.
/// The message may be absent; normalization steps that need it skip the
/// record instead.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    fields: Record,
}

impl RawRecord {
    /// Validates the entry found at `index` of `logEvents`.
    pub fn from_value(index: usize, value: Value) -> Result<Self, ForwarderError> {
        let fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Err(ForwarderError::NotAMapping {
                    index,
                    found: json_kind(&other),
                })
            }
        };

        if !fields.contains_key("timestamp") && !fields.contains_key("@timestamp") {
            return Err(ForwarderError::MissingField {
                index,
                field: "timestamp",
            });
        }

        Ok(RawRecord { fields })
    }

    #[must_use]
    pub fn into_fields(self) -> Record {
        self.fields
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
