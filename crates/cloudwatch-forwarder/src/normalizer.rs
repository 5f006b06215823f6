// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Per-record normalization.
//!
//! Steps run in a fixed order:
//!
//! ```text
//!   raw record
//!       │
//!       v
//!   @timestamp from epoch millis (unless already present)
//!       │
//!       v
//!   Lambda line split: [LEVEL] ts \t request id \t (level \t) message
//!       │                 (Lambda log groups only)
//!       v
//!   batch metadata merge (metadata wins)
//!       │
//!       v
//!   embedded JSON expansion (FORMAT=json only, embedded keys win)
//! ```

use serde_json::Value;
use tracing::{debug, info};

use crate::config::MessageFormat;
use crate::decoder::RawRecord;
use crate::metadata::BatchMetadata;
use log_shipper::Record;

/// Severity names recognized inside a leading `[LEVEL]` token.
pub const LOG_LEVELS: &[&str] = &[
    "ALERT",
    "TRACE",
    "DEBUG",
    "NOTICE",
    "INFO",
    "WARN",
    "WARNING",
    "ERROR",
    "ERR",
    "CRITICAL",
    "CRIT",
    "FATAL",
    "SEVERE",
    "EMERG",
    "EMERGENCY",
];

/// `timestamp \t request id \t message`
const LAMBDA_FIELDS: usize = 3;
/// `timestamp \t request id \t level \t message`
const LAMBDA_FIELDS_WITH_LEVEL: usize = 4;

/// Turns one raw record into the record handed to the shipper.
#[must_use]
pub fn normalize(record: RawRecord, metadata: &BatchMetadata, format: MessageFormat) -> Record {
    let mut record = record.into_fields();

    add_timestamp(&mut record);
    if metadata.is_lambda_source() {
        extract_lambda_fields(&mut record);
    }
    metadata.merge_into(&mut record);
    if format == MessageFormat::Json {
        expand_embedded_json(&mut record);
    }

    record
}

/// Derives `@timestamp` from the raw epoch milliseconds.
pub fn add_timestamp(record: &mut Record) {
    if record.contains_key("@timestamp") {
        return;
    }
    if let Some(timestamp) = record.remove("timestamp") {
        record.insert(
            "@timestamp".to_string(),
            Value::String(value_to_string(&timestamp)),
        );
    }
}

/// Splits a Lambda runtime line into level, timestamp, request id and
/// message. Lines in any other shape are left untouched.
pub fn extract_lambda_fields(record: &mut Record) {
    let message = match record.get("message") {
        Some(message) => value_to_string(message),
        None => return,
    };

    let remainder = match split_level(&message) {
        Some((level, remainder)) => {
            record.insert("log_level".to_string(), Value::String(level));
            remainder
        }
        None => message.as_str(),
    };

    let parts: Vec<&str> = remainder.split('\t').collect();
    let size = parts.len();
    if size != LAMBDA_FIELDS && size != LAMBDA_FIELDS_WITH_LEVEL {
        debug!(
            "CLOUDWATCH | Message has {} tab separated parts, keeping it as is",
            size
        );
        return;
    }

    record.insert("@timestamp".to_string(), parts[0].into());
    record.insert("requestID".to_string(), parts[1].into());
    record.insert("message".to_string(), parts[size - 1].into());
    if size == LAMBDA_FIELDS_WITH_LEVEL {
        record.insert("log_level".to_string(), parts[2].into());
    }
}

/// Finds a recognized `[LEVEL]` token delimited by the first `[` and the
/// first `]`, returning the upper-cased level and the text that follows the
/// single separator after `]`.
fn split_level(message: &str) -> Option<(String, &str)> {
    let start = message.find('[')?;
    let end = message.find(']')?;
    let level = message.get(start + 1..end)?.to_uppercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        return None;
    }

    let mut remainder = message[end + 1..].chars();
    remainder.next();
    Some((level, remainder.as_str()))
}

/// Merges the keys of a JSON object message into the record.
pub fn expand_embedded_json(record: &mut Record) {
    let parsed = match record.get("message") {
        Some(Value::String(message)) => serde_json::from_str::<Value>(message),
        _ => return,
    };

    match parsed {
        Ok(Value::Object(fields)) => {
            for (key, value) in fields {
                record.insert(key, value);
            }
        }
        Ok(Value::Array(_)) => {
            info!("CLOUDWATCH | Field message is a list and cannot be parsed to JSON");
        }
        Ok(_) => {
            info!("CLOUDWATCH | Field message is not a JSON object, passing it as string");
        }
        Err(e) => {
            info!(
                "CLOUDWATCH | Error occurred while trying to parse log to JSON: {}. Field will be passed as string.",
                e
            );
        }
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
