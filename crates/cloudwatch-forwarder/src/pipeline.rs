// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use tracing::{debug, info};

use crate::config::Config;
use crate::decoder::{CloudWatchLogsEvent, RawBatch, RawRecord};
use crate::error::ForwarderError;
use crate::metadata::{BatchMetadata, InvocationContext};
use crate::namespace::NamespaceTable;
use crate::normalizer::normalize;
use log_shipper::Shipper;

/// Drives one subscription batch from payload to shipper.
#[derive(Debug, Clone)]
pub struct Forwarder<'a> {
    config: Config,
    namespaces: NamespaceTable<'a>,
}

impl Forwarder<'static> {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Forwarder {
            config,
            namespaces: NamespaceTable::default(),
        }
    }
}

impl<'a> Forwarder<'a> {
    #[must_use]
    pub fn with_namespaces(config: Config, namespaces: NamespaceTable<'a>) -> Self {
        Forwarder { config, namespaces }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Decodes the event and forwards every record of the batch, then flushes
    /// the shipper once. Returns the number of records forwarded.
    pub fn run<S: Shipper>(
        &self,
        event: &CloudWatchLogsEvent,
        context: &InvocationContext,
        shipper: &mut S,
    ) -> Result<usize, ForwarderError> {
        let batch = event.decode()?;
        self.forward(batch, context, shipper)
    }

    /// Forwards an already decoded batch.
    pub fn forward<S: Shipper>(
        &self,
        batch: RawBatch,
        context: &InvocationContext,
        shipper: &mut S,
    ) -> Result<usize, ForwarderError> {
        let metadata = BatchMetadata::build(&batch, context, &self.config, &self.namespaces);

        info!("CLOUDWATCH | About to send {} logs", batch.log_events.len());
        let mut forwarded = 0;
        for (index, value) in batch.log_events.into_iter().enumerate() {
            let raw = RawRecord::from_value(index, value)?;
            let record = normalize(raw, &metadata, self.config.format);
            shipper.add(record)?;
            forwarded += 1;
        }

        shipper.flush()?;
        debug!(
            "CLOUDWATCH | Forwarded {} logs from {}",
            forwarded, metadata.log_group
        );
        Ok(forwarded)
    }
}
