//! Request paths and execution against servers mounted at different prefixes.

use std::sync::Arc;

use serde_json::{json, Value};
use zion_common::{testing::MockTransport, ClientConfig, TransportError};
use zion_equator::builders::Resource;
use zion_equator::{CallBuilder, EquatorError, EquatorServer};

const SERVER_URLS: [&str; 3] = [
    "https://acme.com:1337",
    "https://acme.com:1337/folder",
    "https://acme.com:1337/folder/subfolder",
];

fn server(mock: &Arc<MockTransport>, url: &str) -> EquatorServer {
    EquatorServer::with_transport(mock.clone(), url, ClientConfig::DEFAULT).unwrap()
}

/// Build with `build`, check the URL, then execute it against a mock that only
/// answers on `expected`.
async fn check<R: Resource>(base: &str, expected: String, build: impl Fn(&EquatorServer) -> CallBuilder<R>) {
    let body = json!({ "url": base, "endpoint": expected });
    let mock = Arc::new(MockTransport::new().ok(&expected, body.to_string()));
    let builder = build(&server(&mock, base));

    assert_eq!(builder.url().unwrap().as_str(), expected);
    let resp: Value = builder.call().await.unwrap();
    assert_eq!(resp, body);
    assert_eq!(mock.request_count(), 1);
}

#[tokio::test]
async fn calls_hit_the_expected_endpoint_under_every_prefix() {
    for base in SERVER_URLS {
        check(base, format!("{base}/accounts"), |s| s.accounts()).await;
        check(base, format!("{base}/accounts/fooAccountId"), |s| s.accounts().account_id("fooAccountId")).await;
        check(base, format!("{base}/transactions"), |s| s.transactions()).await;
        check(base, format!("{base}/transactions?include_failed=true"), |s| {
            s.transactions().include_failed(true)
        })
        .await;
        check(base, format!("{base}/operations?include_failed=true"), |s| {
            s.operations().include_failed(true)
        })
        .await;
        check(base, format!("{base}/transactions/fooTransactionId"), |s| {
            s.transactions().transaction("fooTransactionId")
        })
        .await;
        check(base, format!("{base}/accounts/fooAccountId/transactions"), |s| {
            s.transactions().for_account("fooAccountId")
        })
        .await;
    }
}

#[tokio::test]
async fn payments_last_filter_wins_end_to_end() {
    let mock = Arc::new(
        MockTransport::new()
            .ok("https://acme.com/accounts/X/payments?limit=2", r#"{"_embedded":{"records":[]}}"#),
    );
    let srv = server(&mock, "https://acme.com");

    let page: Value = srv.payments().for_ledger(7u32).for_account("X").limit(2).call().await.unwrap();
    assert_eq!(page, json!({ "_embedded": { "records": [] } }));
    assert_eq!(mock.request_count(), 1);
}

#[tokio::test]
async fn non_2xx_is_a_bad_response() {
    let mock = Arc::new(MockTransport::new().respond(
        "https://acme.com/ledgers/999999999",
        404,
        "Not Found",
        r#"{"status":404}"#,
    ));
    let srv = server(&mock, "https://acme.com");

    let err = srv.ledgers().ledger(999_999_999u64).call::<Value>().await.unwrap_err();
    assert!(matches!(err, EquatorError::BadResponse { status: 404, ref body, .. } if body == r#"{"status":404}"#));
}

#[tokio::test]
async fn transport_errors_and_timeouts_propagate() {
    let mock = Arc::new(MockTransport::new().time_out("https://acme.com/effects"));
    let config = ClientConfig { allow_http: false, timeout_ms: 300 };
    let srv = EquatorServer::with_transport(mock.clone(), "https://acme.com", config).unwrap();

    let err = srv.effects().call::<Value>().await.unwrap_err();
    assert!(matches!(err, EquatorError::Transport(TransportError::Timeout)));
    assert_eq!(mock.requests()[0].timeout, Some(std::time::Duration::from_millis(300)));
}

#[tokio::test]
async fn undecodable_body_is_a_decode_error() {
    let mock = Arc::new(MockTransport::new().ok("https://acme.com/ledgers", "<html>"));
    let srv = server(&mock, "https://acme.com");

    let err = srv.ledgers().call::<Value>().await.unwrap_err();
    assert!(matches!(err, EquatorError::Decode(_)));
}
