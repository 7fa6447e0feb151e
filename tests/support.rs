use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support_clock::{
    compose, BreakerState, CircuitBreaker, ClockApiClient, ClockState, DependencyError,
    FixedTimeSource, RetryPolicy, SupportGateway, SupportInfo, SUPPORT_NUMBER,
    SUPPORT_UNAVAILABLE,
};

fn ts(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, min, s))
        .expect("valid test timestamp")
}

#[test]
fn compose_publishes_the_number_while_open() {
    let info = compose(Ok(ClockState::open()));

    assert_eq!(info.support_number, SUPPORT_NUMBER);
    assert!(info.is_open_now);
    assert_eq!(info.opens_at, None);
}

#[test]
fn compose_passes_the_next_opening_through_while_closed() {
    let next = ts(2023, 6, 12, 9, 0, 0);
    let info = compose(Ok(ClockState::closed_until(next)));

    assert_eq!(info.support_number, SUPPORT_NUMBER);
    assert!(!info.is_open_now);
    assert_eq!(info.opens_at, Some(next));
}

#[test]
fn compose_drops_a_next_opening_sent_alongside_open() {
    // A remote payload claiming both "open" and a next opening is
    // normalized: an open desk never advertises an opening time.
    let info = compose(Ok(ClockState {
        is_open: true,
        next_open_time: Some(ts(2023, 6, 12, 9, 0, 0)),
    }));

    assert!(info.is_open_now);
    assert_eq!(info.opens_at, None);
}

#[test]
fn compose_maps_an_open_circuit_to_the_sentinel() {
    let info = compose(Err(DependencyError::CircuitOpen));

    assert_eq!(info.support_number, SUPPORT_UNAVAILABLE);
    assert!(!info.is_open_now);
    assert_eq!(info.opens_at, None);
}

#[test]
fn compose_maps_other_failures_to_the_empty_record() {
    let info = compose(Err(DependencyError::Server {
        status: StatusCode::INTERNAL_SERVER_ERROR,
    }));

    assert_eq!(info, SupportInfo::default());
    assert!(info.support_number.is_empty());
    assert_ne!(info.support_number, SUPPORT_UNAVAILABLE);
}

#[test]
fn clock_state_uses_the_wire_field_names() {
    let open: ClockState =
        serde_json::from_value(json!({"isOpen": true, "nextOpenTime": null}))
            .expect("open payload should deserialize");
    assert_eq!(open, ClockState::open());

    let closed: ClockState = serde_json::from_value(
        json!({"isOpen": false, "nextOpenTime": "2023-06-12T09:00:00"}),
    )
    .expect("closed payload should deserialize");
    assert_eq!(closed, ClockState::closed_until(ts(2023, 6, 12, 9, 0, 0)));
}

#[test]
fn support_info_serializes_in_camel_case() {
    let value = serde_json::to_value(compose(Ok(ClockState::open())))
        .expect("support info should serialize");

    assert_eq!(
        value,
        json!({
            "supportNumber": SUPPORT_NUMBER,
            "isOpenNow": true,
            "opensAt": null,
        })
    );
}

#[tokio::test]
async fn gateway_publishes_the_number_when_the_dependency_is_healthy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/clock"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"isOpen": true, "nextOpenTime": null})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = ClockApiClient::new(server.uri()).expect("client should build");
    let gateway = SupportGateway::new(client, CircuitBreaker::new());

    let info = gateway.support_info().await;

    assert_eq!(info.support_number, SUPPORT_NUMBER);
    assert!(info.is_open_now);
    assert_eq!(info.opens_at, None);
    assert_eq!(gateway.breaker().state(), BreakerState::Closed);
}

#[tokio::test]
async fn gateway_passes_the_next_opening_through_when_closed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/clock"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"isOpen": false, "nextOpenTime": "2023-06-12T09:00:00"}),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = ClockApiClient::new(server.uri()).expect("client should build");
    let gateway = SupportGateway::new(client, CircuitBreaker::new());

    let info = gateway.support_info().await;

    assert_eq!(info.support_number, SUPPORT_NUMBER);
    assert!(!info.is_open_now);
    assert_eq!(info.opens_at, Some(ts(2023, 6, 12, 9, 0, 0)));
}

#[tokio::test]
async fn server_errors_trip_the_breaker_after_a_single_wire_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/clock"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = ClockApiClient::new(server.uri()).expect("client should build");
    let gateway = SupportGateway::new(client, CircuitBreaker::new());

    // The first attempt trips the breaker; the retry is then rejected at
    // the breaker without another wire call and the sentinel is reported.
    let info = gateway.support_info().await;

    assert_eq!(info.support_number, SUPPORT_UNAVAILABLE);
    assert!(!info.is_open_now);
    assert_eq!(gateway.breaker().state(), BreakerState::Open);
    let requests = server
        .received_requests()
        .await
        .expect("request recording enabled");
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn missing_endpoint_exhausts_retries_without_tripping() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/clock"))
        .respond_with(ResponseTemplate::new(404))
        .expect(3)
        .mount(&server)
        .await;

    let client = ClockApiClient::new(server.uri()).expect("client should build");
    let gateway = SupportGateway::new(client, CircuitBreaker::new());

    let info = gateway.support_info().await;

    // Not-found never qualifies as a breaker failure, so all three
    // attempts reach the wire and the caller gets the empty record.
    assert_eq!(info, SupportInfo::default());
    assert_eq!(gateway.breaker().state(), BreakerState::Closed);
    let requests = server
        .received_requests()
        .await
        .expect("request recording enabled");
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn request_timeout_retries_and_counts_against_the_breaker() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/clock"))
        .respond_with(ResponseTemplate::new(408))
        .expect(3)
        .mount(&server)
        .await;

    let client = ClockApiClient::new(server.uri()).expect("client should build");
    // Threshold 3 so the retries are not short-circuited away: each 408
    // reaches the wire, and the last one trips the circuit.
    let breaker = CircuitBreaker::builder().failure_threshold(3).build();
    let retry = RetryPolicy::default();

    let result = retry
        .execute(|| breaker.call(|| client.fetch_clock()))
        .await;

    let error = result.expect_err("a 408 storm should exhaust retries");
    assert!(matches!(
        error,
        DependencyError::Server { status } if status == StatusCode::REQUEST_TIMEOUT
    ));
    assert!(error.is_transient());
    assert!(error.trips_breaker());
    assert_eq!(breaker.state(), BreakerState::Open);
    assert_eq!(breaker.failure_count(), 3);
    let requests = server
        .received_requests()
        .await
        .expect("request recording enabled");
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn replaced_retry_policy_caps_wire_calls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/clock"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = ClockApiClient::new(server.uri()).expect("client should build");
    let gateway =
        SupportGateway::new(client, CircuitBreaker::new()).with_retry(RetryPolicy::new(0));

    let info = gateway.support_info().await;

    // With retries disabled the transient 404 gets exactly one attempt.
    assert_eq!(info, SupportInfo::default());
    assert_eq!(gateway.breaker().state(), BreakerState::Closed);
    let requests = server
        .received_requests()
        .await
        .expect("request recording enabled");
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn gateway_recovers_once_the_open_window_elapses() {
    let server = MockServer::start().await;
    // The first request fails, everything after it succeeds.
    Mock::given(method("GET"))
        .and(path("/clock"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/clock"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"isOpen": true, "nextOpenTime": null})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let time = FixedTimeSource::at(ts(2023, 6, 12, 10, 0, 0));
    let breaker = CircuitBreaker::builder()
        .time_source(Arc::new(time.clone()))
        .build();
    let client = ClockApiClient::new(server.uri()).expect("client should build");

    // Trip the breaker with a direct call.
    let tripped = breaker.call(|| client.fetch_clock()).await;
    assert!(matches!(tripped, Err(DependencyError::Server { .. })));
    assert_eq!(breaker.state(), BreakerState::Open);

    // Once the open window elapses the next gateway call runs as the
    // recovery probe and closes the circuit again.
    time.advance(Duration::seconds(20));
    let gateway = SupportGateway::new(client, breaker);
    let info = gateway.support_info().await;

    assert_eq!(info.support_number, SUPPORT_NUMBER);
    assert!(info.is_open_now);
    assert_eq!(gateway.breaker().state(), BreakerState::Closed);
}

#[tokio::test]
async fn unreachable_endpoint_reports_the_sentinel() {
    // Bind and immediately drop a listener so the port refuses connections.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind probe port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);

    let client =
        ClockApiClient::new(format!("http://127.0.0.1:{port}")).expect("client should build");
    let gateway = SupportGateway::new(client, CircuitBreaker::new());

    let info = gateway.support_info().await;

    assert_eq!(info.support_number, SUPPORT_UNAVAILABLE);
    assert!(!info.is_open_now);
    assert_eq!(info.opens_at, None);
    assert_eq!(gateway.breaker().state(), BreakerState::Open);
}

#[tokio::test]
async fn annotate_attaches_support_to_the_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/clock"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"isOpen": true, "nextOpenTime": null})),
        )
        .mount(&server)
        .await;

    let client = ClockApiClient::new(server.uri()).expect("client should build");
    let gateway = SupportGateway::new(client, CircuitBreaker::new());

    let wrapped = gateway.annotate("invoice-7").await;

    assert_eq!(wrapped.payload, "invoice-7");
    assert_eq!(wrapped.support.support_number, SUPPORT_NUMBER);
    assert_eq!(
        serde_json::to_value(&wrapped).expect("wrapper should serialize"),
        json!({
            "payload": "invoice-7",
            "support": {
                "supportNumber": SUPPORT_NUMBER,
                "isOpenNow": true,
                "opensAt": null,
            }
        })
    );
}
