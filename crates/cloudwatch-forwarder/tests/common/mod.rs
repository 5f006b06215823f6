// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use cloudwatch_forwarder::decoder::AwsLogs;
use cloudwatch_forwarder::CloudWatchLogsEvent;
use flate2::write::GzEncoder;
use flate2::Compression;
use log_shipper::{Record, Shipper, ShipperError};
use serde_json::{json, Value};
use std::io::Write;

/// Keeps everything it is given, counting flushes.
#[derive(Debug, Default)]
pub struct RecordingShipper {
    pub records: Vec<Record>,
    pub flushes: usize,
}

impl Shipper for RecordingShipper {
    fn add(&mut self, record: Record) -> Result<(), ShipperError> {
        self.records.push(record);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ShipperError> {
        self.flushes += 1;
        Ok(())
    }
}

/// Fails every flush, as a shipper whose listener is down would.
#[derive(Debug, Default)]
pub struct FailingShipper;

impl Shipper for FailingShipper {
    fn add(&mut self, _record: Record) -> Result<(), ShipperError> {
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ShipperError> {
        Err(ShipperError::RetriesExhausted {
            attempts: 4,
            last_error: "listener answered 503 Service Unavailable".to_string(),
        })
    }
}

pub fn batch(log_group: &str, log_events: Value) -> Value {
    json!({
        "messageType": "DATA_MESSAGE",
        "owner": "123456789012",
        "logGroup": log_group,
        "logStream": "2024/01/01/[$LATEST]0123456789abcdef",
        "subscriptionFilters": ["forwarder"],
        "logEvents": log_events
    })
}

pub fn event(batch: &Value) -> CloudWatchLogsEvent {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(batch.to_string().as_bytes())
        .expect("gzip write");
    let compressed = encoder.finish().expect("gzip finish");
    CloudWatchLogsEvent {
        awslogs: AwsLogs {
            data: STANDARD.encode(compressed),
        },
    }
}

pub fn log_event(message: &str) -> Value {
    json!({
        "id": "37000000000000000000000000000000000000000000000000000000",
        "timestamp": 1_704_067_200_000_i64,
        "message": message
    })
}
