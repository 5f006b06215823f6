// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use log_shipper::config::ShipperConfig;
use log_shipper::http::HttpShipper;
use log_shipper::{Record, Shipper, ShipperError};
use mockito::{Matcher, Server};
use serde_json::json;
use std::time::Duration;

fn record(message: &str) -> Record {
    let mut record = Record::new();
    record.insert("message".to_string(), json!(message));
    record.insert("@timestamp".to_string(), json!("1700000000000"));
    record
}

fn config_for(server: &Server) -> ShipperConfig {
    ShipperConfig {
        url: server.url(),
        token: None,
        compress: false,
        max_retries: 3,
        initial_backoff: Duration::ZERO,
        request_timeout: Duration::from_secs(5),
        ..Default::default()
    }
}

#[test]
fn ships_pending_records_as_ndjson_on_flush() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Exact(
            "{\"message\":\"first\",\"@timestamp\":\"1700000000000\"}\n\
             {\"message\":\"second\",\"@timestamp\":\"1700000000000\"}\n"
                .to_string(),
        ))
        .with_status(200)
        .expect(1)
        .create();

    let mut shipper = HttpShipper::new(config_for(&server)).expect("valid config");
    shipper.add(record("first")).expect("add");
    shipper.add(record("second")).expect("add");
    shipper.flush().expect("flush");

    mock.assert();
    assert_eq!(shipper.shipped(), 2);
}

#[test]
fn sends_token_and_gzip_encoding() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/")
        .match_query(Matcher::UrlEncoded("token".into(), "secret-token".into()))
        .match_header("content-encoding", "gzip")
        .with_status(200)
        .expect(1)
        .create();

    let config = ShipperConfig {
        token: Some("secret-token".to_string()),
        compress: true,
        ..config_for(&server)
    };
    let mut shipper = HttpShipper::new(config).expect("valid config");
    shipper.add(record("compressed")).expect("add");
    shipper.flush().expect("flush");

    mock.assert();
}

#[test]
fn flush_without_records_sends_nothing() {
    let mut server = Server::new();
    let mock = server.mock("POST", "/").with_status(200).expect(0).create();

    let mut shipper = HttpShipper::new(config_for(&server)).expect("valid config");
    shipper.flush().expect("flush");

    mock.assert();
    assert_eq!(shipper.shipped(), 0);
}

#[test]
fn retries_server_errors_until_exhausted() {
    let mut server = Server::new();
    let mock = server.mock("POST", "/").with_status(503).expect(3).create();

    let mut shipper = HttpShipper::new(config_for(&server)).expect("valid config");
    shipper.add(record("unlucky")).expect("add");
    let result = shipper.flush();

    mock.assert();
    assert!(matches!(
        result,
        Err(ShipperError::RetriesExhausted { attempts: 3, .. })
    ));
}

#[test]
fn bad_request_drops_bulk_without_retrying() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/")
        .with_status(400)
        .with_body("bad format")
        .expect(1)
        .create();

    let mut shipper = HttpShipper::new(config_for(&server)).expect("valid config");
    shipper.add(record("malformed")).expect("add");
    shipper.flush().expect("a rejected bulk is not an error");

    mock.assert();
}

#[test]
fn unauthorized_is_fatal() {
    let mut server = Server::new();
    let mock = server.mock("POST", "/").with_status(401).expect(1).create();

    let mut shipper = HttpShipper::new(config_for(&server)).expect("valid config");
    shipper.add(record("denied")).expect("add");
    let result = shipper.flush();

    mock.assert();
    assert!(matches!(
        result,
        Err(ShipperError::Unauthorized { status: 401 })
    ));
}

#[test]
fn full_bulk_is_shipped_before_accepting_more() {
    let mut server = Server::new();
    let mock = server.mock("POST", "/").with_status(200).expect(2).create();

    let config = ShipperConfig {
        // fits exactly one of the records below
        max_bulk_size_bytes: 64,
        ..config_for(&server)
    };
    let mut shipper = HttpShipper::new(config).expect("valid config");
    shipper.add(record("first")).expect("add");
    shipper.add(record("second")).expect("add");
    assert_eq!(shipper.shipped(), 1);
    shipper.flush().expect("flush");

    mock.assert();
    assert_eq!(shipper.shipped(), 2);
}

#[test]
fn oversized_record_after_pending_ones_travels_alone() {
    let mut server = Server::new();
    let pending = server
        .mock("POST", "/")
        .match_body(Matcher::Exact(
            "{\"message\":\"first\",\"@timestamp\":\"1700000000000\"}\n".to_string(),
        ))
        .with_status(200)
        .expect(1)
        .create();
    let oversized = server
        .mock("POST", "/")
        .match_body(Matcher::Regex("x{100}".to_string()))
        .with_status(200)
        .expect(1)
        .create();

    let config = ShipperConfig {
        max_bulk_size_bytes: 64,
        ..config_for(&server)
    };
    let mut shipper = HttpShipper::new(config).expect("valid config");
    shipper.add(record("first")).expect("add");
    shipper.add(record(&"x".repeat(100))).expect("oversized record kept");
    assert_eq!(shipper.shipped(), 1);
    shipper.flush().expect("flush");

    pending.assert();
    oversized.assert();
    assert_eq!(shipper.shipped(), 2);
}

#[test]
fn shippers_can_share_one_client() {
    let mut server = Server::new();
    let mock = server.mock("POST", "/").with_status(200).expect(2).create();

    let config = config_for(&server);
    let client = HttpShipper::build_client(&config).expect("valid config");
    for message in ["first invocation", "second invocation"] {
        let mut shipper =
            HttpShipper::with_client(client.clone(), config.clone()).expect("valid config");
        shipper.add(record(message)).expect("add");
        shipper.flush().expect("flush");
        assert_eq!(shipper.shipped(), 1);
    }

    mock.assert();
}
