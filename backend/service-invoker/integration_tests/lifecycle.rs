use crate::helpers::{InfoResponse, invoker_for};

use service_invoker::{ClientProperties, ErrorKind, ServiceInvoker};

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// **VALUE**: Verifies construction without base URL fails before any allocation.
///
/// **WHY THIS MATTERS**: Misconfiguration must stop start-up, not the first request.
///
/// **BUG THIS CATCHES**: Would catch the builder allocating a transport before validating.
#[test]
fn given_missing_base_url_when_building_then_client_configuration_error() {
    // GIVEN: Properties with no base URL
    let properties = ClientProperties::default();

    // WHEN: Building (no runtime needed, nothing is allocated)
    let err = ServiceInvoker::builder("custom-web-service")
        .properties(properties)
        .build()
        .unwrap_err();

    // THEN: Configuration error naming the service
    assert_eq!(err.kind(), ErrorKind::ClientConfiguration);
    assert!(err.to_string().contains("custom-web-service"));
}

/// **VALUE**: Verifies building without any properties is a configuration error.
#[test]
fn given_no_properties_when_building_then_client_configuration_error() {
    let err = ServiceInvoker::builder("orphan").build().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ClientConfiguration);
}

/// **VALUE**: Verifies dispose is idempotent, including on an unused invoker.
///
/// **WHY THIS MATTERS**: Shutdown hooks and Drop may both dispose the same invoker.
///
/// **BUG THIS CATCHES**: Would catch a double close panicking or erroring.
#[tokio::test]
async fn given_unused_invoker_when_disposed_twice_then_no_failure() {
    let server = MockServer::start().await;
    let invoker = invoker_for(&server);

    invoker.dispose();
    invoker.dispose();

    assert!(invoker.is_disposed());
}

/// **VALUE**: Verifies a disposed invoker refuses new calls with a Transport error.
#[tokio::test]
async fn given_disposed_invoker_when_calling_then_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "x"})))
        .expect(0)
        .mount(&server)
        .await;
    let invoker = invoker_for(&server);
    invoker.dispose();

    let err = invoker.get_json::<InfoResponse>("/info").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
}

/// **VALUE**: Verifies disposal during an in-flight call lets that call finish.
///
/// **WHY THIS MATTERS**: Graceful shutdown must not abort requests already on the wire.
///
/// **BUG THIS CATCHES**: Would catch dispose tearing down connections in use.
#[tokio::test]
async fn given_in_flight_call_when_disposed_then_call_completes() {
    // GIVEN: A slow endpoint
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"name": "late"}))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    let invoker = invoker_for(&server);

    // WHEN: Disposing while the call is waiting for its response
    let (result, ()) = futures_util::future::join(
        invoker.get_json::<InfoResponse>("/info"),
        async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            invoker.dispose();
        },
    )
    .await;

    // THEN: The in-flight call succeeded, later ones are refused
    assert_eq!(result.unwrap().name, "late");
    assert!(invoker.is_disposed());
    assert!(invoker.get_json::<InfoResponse>("/info").await.is_err());
}
