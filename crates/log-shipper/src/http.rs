// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Blocking HTTP delivery of bulks to the listener.

use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};

use flate2::write::GzEncoder;
use flate2::Compression;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_ENCODING, CONTENT_TYPE};
use reqwest::StatusCode;
use tracing::{debug, error, info, warn};

use crate::aggregator::Aggregator;
use crate::config::ShipperConfig;
use crate::error::ShipperError;
use crate::{Record, Shipper};

/// Outcome of a single POST attempt.
enum Attempt {
    Delivered,
    Dropped,
    Retry(String),
}

#[derive(Debug)]
pub struct HttpShipper {
    client: Client,
    config: ShipperConfig,
    aggregator: Aggregator,
    shipped: usize,
}

impl HttpShipper {
    pub fn new(config: ShipperConfig) -> Result<Self, ShipperError> {
        let client = Self::build_client(&config)?;
        Self::with_client(client, config)
    }

    /// Builds the client used to reach the listener.
    ///
    /// The client pools connections and is cheap to clone, so one client can
    /// back every shipper created by a long-lived process.
    pub fn build_client(config: &ShipperConfig) -> Result<Client, ShipperError> {
        config.validate()?;
        Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(ShipperError::Client)
    }

    pub fn with_client(client: Client, config: ShipperConfig) -> Result<Self, ShipperError> {
        config.validate()?;
        Ok(HttpShipper {
            client,
            aggregator: Aggregator::new(config.max_bulk_size_bytes),
            config,
            shipped: 0,
        })
    }

    /// Number of records delivered (or deliberately dropped) so far.
    #[must_use]
    pub fn shipped(&self) -> usize {
        self.shipped
    }

    fn ship_pending(&mut self) -> Result<(), ShipperError> {
        if self.aggregator.is_empty() {
            return Ok(());
        }
        let entries = self.aggregator.len();
        let bulk = self.aggregator.take_bulk();
        debug!(
            "SHIPPER | Shipping bulk of {} records ({} bytes)",
            entries,
            bulk.len()
        );

        let body = if self.config.compress {
            compress(&bulk)?
        } else {
            bulk
        };

        self.send(body)?;
        self.shipped += entries;
        Ok(())
    }

    fn create_request(&self, body: Vec<u8>) -> RequestBuilder {
        let mut request = self
            .client
            .post(&self.config.url)
            .headers(self.headers())
            .body(body);
        if let Some(token) = &self.config.token {
            request = request.query(&[("token", token.as_str())]);
        }
        request
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if self.config.compress {
            headers.insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        }
        headers
    }

    fn send(&self, body: Vec<u8>) -> Result<(), ShipperError> {
        let mut attempts = 0;
        let time = Instant::now();

        loop {
            attempts += 1;

            let last_error = match self.attempt(body.clone())? {
                Attempt::Delivered | Attempt::Dropped => return Ok(()),
                Attempt::Retry(reason) => reason,
            };

            if attempts >= self.config.max_retries {
                error!(
                    "SHIPPER | Failed to ship bulk after {} ms and {} attempts: {}",
                    time.elapsed().as_millis(),
                    attempts,
                    last_error
                );
                return Err(ShipperError::RetriesExhausted {
                    attempts,
                    last_error,
                });
            }

            let backoff = backoff_for_attempt(self.config.initial_backoff, attempts - 1);
            warn!(
                "SHIPPER | Attempt {} failed: {}. Retrying in {} ms",
                attempts,
                last_error,
                backoff.as_millis()
            );
            thread::sleep(backoff);
        }
    }

    fn attempt(&self, body: Vec<u8>) -> Result<Attempt, ShipperError> {
        let resp = match self.create_request(body).send() {
            Ok(resp) => resp,
            Err(e) => return Ok(Attempt::Retry(e.to_string())),
        };

        let status = resp.status();
        if status.is_success() {
            return Ok(Attempt::Delivered);
        }

        match status {
            StatusCode::BAD_REQUEST => {
                // oversized or malformed records, resending the same bulk cannot succeed
                error!(
                    "SHIPPER | Listener answered 400, some records are too big or badly formatted. Dropping bulk: {}",
                    resp.text().unwrap_or_default()
                );
                Ok(Attempt::Dropped)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                error!("SHIPPER | Listener rejected the token, please verify TOKEN");
                Err(ShipperError::Unauthorized {
                    status: status.as_u16(),
                })
            }
            _ => Ok(Attempt::Retry(format!("listener answered {status}"))),
        }
    }
}

impl Shipper for HttpShipper {
    fn add(&mut self, record: Record) -> Result<(), ShipperError> {
        let log = serde_json::to_string(&record)?;
        if let Err(log) = self.aggregator.try_add(log) {
            self.ship_pending()?;
            if let Err(log) = self.aggregator.try_add(log) {
                error!(
                    "SHIPPER | Empty bulk refused a record of {} bytes",
                    log.len()
                );
                return Err(ShipperError::RecordRejected { size: log.len() });
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ShipperError> {
        self.ship_pending()?;
        info!("SHIPPER | Flushed, {} records shipped", self.shipped);
        Ok(())
    }
}

fn compress(data: &[u8]) -> Result<Vec<u8>, ShipperError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn backoff_for_attempt(initial: Duration, attempt: u32) -> Duration {
    initial.saturating_mul(2_u32.saturating_pow(attempt))
}
