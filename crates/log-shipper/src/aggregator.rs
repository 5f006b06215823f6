// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Size-bounded accumulation of serialized records into one bulk.
//!
//! A bulk is newline-delimited JSON:
//! ```text
//! {"message":"first","@timestamp":"1700000000000"}
//! {"message":"second","@timestamp":"1700000000001"}
//! ```

use tracing::warn;

use crate::config::DEFAULT_MAX_BULK_SIZE_BYTES;

#[derive(Debug, Clone)]
pub struct Aggregator {
    pub(crate) buffer: Vec<u8>,

    pub(crate) entries: usize,

    pub(crate) max_bulk_size_bytes: usize,
}

impl Default for Aggregator {
    fn default() -> Self {
        Aggregator::new(DEFAULT_MAX_BULK_SIZE_BYTES)
    }
}

impl Aggregator {
    #[must_use]
    pub fn new(max_bulk_size_bytes: usize) -> Self {
        Aggregator {
            buffer: Vec::new(),
            entries: 0,
            max_bulk_size_bytes,
        }
    }

    /// Appends one serialized record.
    ///
    /// Returns the record back when appending it would push a non-empty bulk
    /// over the size bound; the caller ships the pending bulk and retries.
    /// An oversized record is accepted into an empty bulk and travels alone.
    pub fn try_add(&mut self, log: String) -> Result<(), String> {
        let added = log.len() + 1;

        if self.entries > 0 && self.buffer.len() + added > self.max_bulk_size_bytes {
            return Err(log);
        }

        if added > self.max_bulk_size_bytes {
            warn!(
                "SHIPPER | Record of {} bytes exceeds the {} bytes bulk limit, shipping it alone",
                log.len(),
                self.max_bulk_size_bytes
            );
        }

        self.buffer.extend(log.as_bytes());
        self.buffer.push(b'\n');
        self.entries += 1;
        Ok(())
    }

    /// Takes the pending bulk, leaving the aggregator empty.
    pub fn take_bulk(&mut self) -> Vec<u8> {
        self.entries = 0;
        std::mem::take(&mut self.buffer)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.buffer.len()
    }
}
