// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Normalization of CloudWatch Logs subscription batches.
//!
//! ```text
//!   {"awslogs":{"data":..}}
//!          │  decoder: base64 -> gzip -> JSON
//!          v
//!      RawBatch ──────────────> BatchMetadata (namespace, context, ENRICH, TYPE)
//!          │                          │
//!          v                          v
//!      RawRecord ──> normalizer ──> Record ──> Shipper::add
//!                                                 │
//!                                     (end of batch) Shipper::flush
//! ```
//!
//! - **[`decoder`]**: payload decoding and record validation
//! - **[`namespace`]**: log group prefix to namespace table
//! - **[`metadata`]**: per-batch metadata shared by every record
//! - **[`normalizer`]**: per-record extraction, merge and JSON expansion
//! - **[`pipeline`]**: drives a batch through the above into a shipper

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod config;
pub mod decoder;
pub mod error;
pub mod metadata;
pub mod namespace;
pub mod normalizer;
pub mod pipeline;

pub use config::{Config, MessageFormat};
pub use decoder::CloudWatchLogsEvent;
pub use error::{ConfigError, DecodeError, ForwarderError};
pub use metadata::InvocationContext;
pub use pipeline::Forwarder;
