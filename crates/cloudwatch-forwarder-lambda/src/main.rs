// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::sync::Arc;

use lambda_runtime::{service_fn, Error, LambdaEvent};
use reqwest::blocking::Client;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use cloudwatch_forwarder::{CloudWatchLogsEvent, Config, Forwarder, InvocationContext};
use log_shipper::{config::ShipperConfig, http::HttpShipper};

/// Read once at cold start and shared by every invocation.
struct State {
    forwarder: Forwarder<'static>,
    shipper_config: ShipperConfig,
    // pools listener connections across warm invocations
    client: Client,
}

#[tokio::main]
pub async fn main() -> Result<(), Error> {
    let config = Config::from_env();
    // a rejected config is still reported, at the default level
    let log_level = config.as_ref().map_or("info", |c| c.log_level.as_str());

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_new(env_filter(log_level))?)
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    debug!("Logging subsystem enabled");

    let config = match config {
        Ok(c) => c,
        Err(e) => {
            error!("Error creating config on forwarder startup: {e}");
            return Err(e.into());
        }
    };

    let shipper_config = match ShipperConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Error creating shipper config on forwarder startup: {e}");
            return Err(e.into());
        }
    };

    // the blocking client owns its own runtime and cannot be built on ours
    let client_config = shipper_config.clone();
    let client =
        match tokio::task::spawn_blocking(move || HttpShipper::build_client(&client_config))
            .await?
        {
            Ok(client) => client,
            Err(e) => {
                error!("Error creating HTTP client on forwarder startup: {e}");
                return Err(e.into());
            }
        };

    let state = Arc::new(State {
        forwarder: Forwarder::new(config),
        shipper_config,
        client,
    });

    lambda_runtime::run(service_fn(move |event| {
        handler(Arc::clone(&state), event)
    }))
    .await
}

async fn handler(state: Arc<State>, event: LambdaEvent<CloudWatchLogsEvent>) -> Result<(), Error> {
    let LambdaEvent { payload, context } = event;
    let invocation = invocation_context(&context.env_config.version, &context.invoked_function_arn);

    // the shipper blocks on HTTP, keep it off the runtime's worker threads
    let forwarded = tokio::task::spawn_blocking(move || -> Result<usize, Error> {
        let mut shipper =
            HttpShipper::with_client(state.client.clone(), state.shipper_config.clone())?;
        Ok(state.forwarder.run(&payload, &invocation, &mut shipper)?)
    })
    .await??;

    info!("CLOUDWATCH | Forwarded {} logs", forwarded);
    Ok(())
}

/// HTTP crates stay silent whatever the forwarder's own level is.
fn env_filter(log_level: &str) -> String {
    format!("h2=off,hyper=off,rustls=off,reqwest=off,{log_level}")
}

fn invocation_context(function_version: &str, invoked_function_arn: &str) -> InvocationContext {
    let non_empty = |val: &str| (!val.is_empty()).then(|| val.to_string());
    InvocationContext {
        function_version: non_empty(function_version),
        invoked_function_arn: non_empty(invoked_function_arn),
    }
}
