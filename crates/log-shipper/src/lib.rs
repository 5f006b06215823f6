// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Delivery of normalized log records to a bulk HTTP listener.
//!
//! The forwarding pipeline only knows about the [`Shipper`] trait: it hands
//! over one record at a time with [`Shipper::add`] and calls
//! [`Shipper::flush`] once the batch is exhausted. Everything else
//! (batching by size, compression, retries) is owned by the implementation.
//!
//! ```text
//!   record ──> Aggregator (ndjson, bounded) ──> gzip ──> POST listener
//!                     ^                                     │
//!                     └──────── retry with backoff <────────┘
//! ```

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod aggregator;
pub mod config;
pub mod error;
pub mod http;

pub use error::ShipperError;

/// A normalized log record: an insertion-ordered JSON object.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Accumulate-then-deliver interface used by the forwarding pipeline.
///
/// Calls are synchronous and may block on network I/O.
pub trait Shipper {
    /// Accumulates one record for later delivery.
    ///
    /// Implementations may deliver already-pending records early when the
    /// new one would overflow their buffer.
    fn add(&mut self, record: Record) -> Result<(), ShipperError>;

    /// Delivers every pending record. A flush with nothing pending is a no-op.
    fn flush(&mut self) -> Result<(), ShipperError>;
}
