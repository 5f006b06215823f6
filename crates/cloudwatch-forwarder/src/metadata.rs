// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Batch-level metadata merged into every record of a batch.

use serde_json::Value;
use tracing::{debug, info};

use crate::config::Config;
use crate::decoder::RawBatch;
use crate::namespace::NamespaceTable;
use log_shipper::Record;

/// Record type tag used when `TYPE` is not configured.
pub const DEFAULT_RECORD_TYPE: &str = "logzio_cloudwatch_lambda";

/// Marker of log groups written by Lambda functions.
pub const LAMBDA_LOG_GROUP: &str = "/aws/lambda/";

/// What the invocation host knows about the running function.
///
/// Both fields are absent outside of a serverless runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationContext {
    pub function_version: Option<String>,
    pub invoked_function_arn: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchMetadata {
    pub log_group: String,
    pub log_stream: String,
    pub message_type: String,
    pub owner: String,
    pub namespace: Option<String>,
    pub function_version: Option<String>,
    pub invoked_function_arn: Option<String>,
    /// Operator fields from `ENRICH`, applied in order
    pub enrichment: Vec<(String, String)>,
    pub record_type: String,
}

impl BatchMetadata {
    /// Derives the metadata shared by every record of `batch`.
    #[must_use]
    pub fn build(
        batch: &RawBatch,
        context: &InvocationContext,
        config: &Config,
        namespaces: &NamespaceTable<'_>,
    ) -> Self {
        let namespace = namespaces.resolve(&batch.log_group);
        if namespace.is_none() {
            info!(
                "CLOUDWATCH | Mapping from log group to namespace does not exist for log group {}",
                batch.log_group
            );
        }

        if context.function_version.is_none() || context.invoked_function_arn.is_none() {
            debug!("CLOUDWATCH | Invocation context is incomplete, skipping missing fields");
        }

        let record_type = match &config.record_type {
            Some(record_type) => record_type.clone(),
            None => {
                debug!("CLOUDWATCH | Using default TYPE '{}'", DEFAULT_RECORD_TYPE);
                DEFAULT_RECORD_TYPE.to_string()
            }
        };

        BatchMetadata {
            log_group: batch.log_group.clone(),
            log_stream: batch.log_stream.clone(),
            message_type: batch.message_type.clone(),
            owner: batch.owner.clone(),
            namespace: namespace.map(str::to_string),
            function_version: context.function_version.clone(),
            invoked_function_arn: context.invoked_function_arn.clone(),
            enrichment: config.enrich.clone(),
            record_type,
        }
    }

    /// Whether records of this batch come from a Lambda function.
    #[must_use]
    pub fn is_lambda_source(&self) -> bool {
        self.log_group.contains(LAMBDA_LOG_GROUP)
    }

    /// Metadata as record fields, in merge order. Later fields win over
    /// earlier ones with the same key.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        let fixed = [
            ("logGroup", Some(self.log_group.as_str())),
            ("logStream", Some(self.log_stream.as_str())),
            ("messageType", Some(self.message_type.as_str())),
            ("owner", Some(self.owner.as_str())),
            ("namespace", self.namespace.as_deref()),
            ("function_version", self.function_version.as_deref()),
            ("invoked_function_arn", self.invoked_function_arn.as_deref()),
        ];

        fixed
            .into_iter()
            .filter_map(|(key, value)| value.map(|value| (key, value)))
            .chain(
                self.enrichment
                    .iter()
                    .map(|(key, value)| (key.as_str(), value.as_str())),
            )
            .chain(std::iter::once(("type", self.record_type.as_str())))
    }

    /// Copies every metadata field onto `record`, overwriting on conflict.
    pub fn merge_into(&self, record: &mut Record) {
        for (key, value) in self.fields() {
            record.insert(key.to_string(), Value::String(value.to_string()));
        }
    }
}
