use crate::helpers::{InfoResponse, RecordingSink, SERVICE, invoker_for, invoker_with};

use service_invoker::correlation::{self, Correlation};
use service_invoker::{
    ClientProperties, ErrorKind, ErrorTranslatorConfig, InvokerError, LocalError, Method, Outcome,
    ServiceInvoker,
};

use common::HttpStatusCode;

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// **VALUE**: Verifies a JSON round trip through the full chain.
///
/// **WHY THIS MATTERS**: This is the main path every application uses.
///
/// **BUG THIS CATCHES**: Would catch the body, content type or path being lost anywhere
/// between the builder and the transport.
#[tokio::test]
async fn given_info_endpoint_when_post_json_then_decoded_response_returned() {
    // GIVEN: A mock expecting a JSON body with JSON headers
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/info"))
        .and(header("content-type", "application/json"))
        .and(header("accept", "application/json"))
        .and(body_json(json!({"ssn": "123456789"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "alice"})))
        .expect(1)
        .mount(&server)
        .await;
    let invoker = invoker_for(&server);

    // WHEN: Posting
    let info: InfoResponse = invoker
        .post_json("/info", &json!({"ssn": "123456789"}))
        .await
        .unwrap();

    // THEN: Response decoded
    assert_eq!(info.name, "alice");
}

/// **VALUE**: Verifies the basic-auth header is sent iff authorization is enabled.
///
/// **WHY THIS MATTERS**: Leaking credentials to services that do not need them is as
/// bad as omitting them where they are required.
///
/// **BUG THIS CATCHES**: Would catch the auth interceptor being installed unconditionally.
#[tokio::test]
async fn given_auth_toggle_when_calling_then_authorization_header_follows_toggle() {
    // GIVEN: One invoker with auth, one without
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "bob"})))
        .mount(&server)
        .await;
    let secured =
        invoker_with(ClientProperties::new(server.uri()).with_basic_auth("user", "pass"));
    let plain = invoker_for(&server);

    // WHEN: Both call the same endpoint
    let _: InfoResponse = secured.get_json("/login").await.unwrap();
    let _: InfoResponse = plain.get_json("/login").await.unwrap();

    // THEN: Only the first request carried credentials
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[0].headers.get("authorization").unwrap(),
        "Basic dXNlcjpwYXNz"
    );
    assert!(requests[1].headers.get("authorization").is_none());
}

/// **VALUE**: Verifies a caller-provided Authorization header is not overwritten.
#[tokio::test]
async fn given_explicit_authorization_when_auth_enabled_then_caller_header_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let invoker =
        invoker_with(ClientProperties::new(server.uri()).with_basic_auth("user", "pass"));

    let request = invoker
        .request(Method::GET, "/me")
        .unwrap()
        .with_header(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_static("Bearer token-1"),
        );
    let response = invoker.execute(request).await.unwrap();

    assert_eq!(response.status.as_u16(), 204);
}

/// **VALUE**: Verifies an error body with an identifier becomes a RemoteRejection.
///
/// **WHY THIS MATTERS**: Callers branch on the identifier to pick a recovery path.
///
/// **BUG THIS CATCHES**: Would catch non-2xx responses being returned as Ok.
#[tokio::test]
async fn given_error_body_with_identifier_when_calling_then_remote_rejection_with_identifier() {
    // GIVEN: A 400 with an identifier mapped to a business error
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/info"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"errorCode": "INVALID_SSN", "message": "ssn is blank"})),
        )
        .mount(&server)
        .await;
    let invoker = ServiceInvoker::builder(SERVICE)
        .properties(ClientProperties::new(server.uri()))
        .error_translator(
            ErrorTranslatorConfig::default()
                .with_mapping("INVALID_SSN", LocalError::business("InvalidSsn")),
        )
        .build()
        .unwrap();

    // WHEN: Posting an invalid payload
    let err = invoker
        .post_json::<_, InfoResponse>("/info", &json!({"ssn": ""}))
        .await
        .unwrap_err();

    // THEN: Rejection carries status, identifier and business class
    assert_eq!(err.kind(), ErrorKind::RemoteRejection);
    assert_eq!(err.status(), Some(HttpStatusCode(400)));
    assert_eq!(err.remote_identifier(), Some("INVALID_SSN"));
    assert!(err.is_business());
}

/// **VALUE**: Verifies an unparseable error body still yields a RemoteRejection.
#[tokio::test]
async fn given_plain_text_error_when_calling_then_remote_rejection_without_identifier() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal failure"))
        .mount(&server)
        .await;
    let invoker = invoker_for(&server);

    let err = invoker.get_json::<InfoResponse>("/info").await.unwrap_err();

    match err {
        InvokerError::RemoteRejection {
            status,
            remote_identifier,
            body,
            ..
        } => {
            assert_eq!(status, HttpStatusCode(500));
            assert!(remote_identifier.is_none());
            assert_eq!(body, "Internal failure");
        }
        other => panic!("Expected RemoteRejection, got {other:?}"),
    }
}

/// **VALUE**: Verifies a 2xx body of the wrong shape is a DecodingError.
///
/// **BUG THIS CATCHES**: Would catch decode failures being reported as remote rejections.
#[tokio::test]
async fn given_unexpected_body_when_decoding_then_decoding_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
        .mount(&server)
        .await;
    let invoker = invoker_for(&server);

    let err = invoker.get_json::<InfoResponse>("/info").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Decoding);
    assert_eq!(err.status(), Some(HttpStatusCode(200)));
}

/// **VALUE**: Verifies an empty 204 decodes into `()` and `None`.
///
/// **WHY THIS MATTERS**: Write endpoints commonly answer `204 No Content`; treating that
/// as a decoding failure would turn every successful write into an error.
///
/// **BUG THIS CATCHES**: Would catch empty bodies being handed straight to the JSON parser,
/// while still requiring a body for shapes that need one.
#[tokio::test]
async fn given_no_content_response_when_post_json_then_empty_shapes_decode() {
    // GIVEN: An endpoint answering 204 with no body
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/info"))
        .respond_with(ResponseTemplate::new(204))
        .expect(3)
        .mount(&server)
        .await;
    let invoker = invoker_for(&server);
    let payload = json!({"ssn": "123456789"});

    // WHEN: Decoding into unit, an optional value and a required shape
    let unit: Result<(), InvokerError> = invoker.post_json("/info", &payload).await;
    let optional: Option<serde_json::Value> = invoker.post_json("/info", &payload).await.unwrap();
    let required = invoker
        .post_json::<_, InfoResponse>("/info", &payload)
        .await
        .unwrap_err();

    // THEN: Empty shapes succeed, the required one is a decoding error
    assert!(unit.is_ok());
    assert_eq!(optional, None);
    assert_eq!(required.kind(), ErrorKind::Decoding);
    assert_eq!(required.status(), Some(HttpStatusCode(204)));
}

/// Mounts `/start` answering 302 towards `/target`, which returns a body.
async fn redirecting_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", format!("{}/target", server.uri())),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/target"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "moved"})))
        .mount(&server)
        .await;
    server
}

/// **VALUE**: Verifies `followRedirects = false` surfaces the 302 to the caller.
///
/// **WHY THIS MATTERS**: Services that must not be redirected (for example to a login
/// page) rely on the redirect being reported instead of silently followed.
///
/// **BUG THIS CATCHES**: Would catch the redirect policy being ignored by the client.
#[tokio::test]
async fn given_redirects_disabled_when_calling_then_remote_rejection_with_302() {
    // GIVEN: An invoker that does not follow redirects
    let server = redirecting_server().await;
    let sink = RecordingSink::shared();
    let invoker = ServiceInvoker::builder(SERVICE)
        .properties(ClientProperties::new(server.uri()).with_follow_redirects(false))
        .observation_sink(sink.clone())
        .build()
        .unwrap();

    // WHEN: Calling the redirecting endpoint
    let err = invoker.get_json::<InfoResponse>("/start").await.unwrap_err();

    // THEN: The 302 is a rejection, observed as a redirection, and the target never hit
    assert_eq!(err.kind(), ErrorKind::RemoteRejection);
    assert_eq!(err.status(), Some(HttpStatusCode(302)));
    let observations = sink.taken();
    assert_eq!(observations.len(), 1);
    assert_eq!(observations[0].outcome, Outcome::Redirection);
    assert_eq!(observations[0].status, Some(HttpStatusCode(302)));
    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.url.path() != "/target"));
}

/// **VALUE**: Verifies `followRedirects = true` lands on the target and decodes its body.
///
/// **BUG THIS CATCHES**: Would catch redirects never being followed when enabled.
#[tokio::test]
async fn given_redirects_enabled_when_calling_then_target_body_decoded() {
    let server = redirecting_server().await;
    let invoker = invoker_with(ClientProperties::new(server.uri()).with_follow_redirects(true));

    let info: InfoResponse = invoker.get_json("/start").await.unwrap();

    assert_eq!(info.name, "moved");
}

/// **VALUE**: Verifies connection failures are Transport errors and never retried.
///
/// **BUG THIS CATCHES**: Would catch connect failures being misclassified or retried
/// (a retry would double the wait before the error surfaces).
#[tokio::test]
async fn given_closed_port_when_calling_then_transport_connection_error() {
    // GIVEN: A port nothing listens on
    let invoker = invoker_with(ClientProperties::new("http://127.0.0.1:1"));

    // WHEN: Calling
    let err = invoker.get_json::<InfoResponse>("/info").await.unwrap_err();

    // THEN: Transport error flagged as connection failure
    match err {
        InvokerError::Transport { is_connection, .. } => assert!(is_connection),
        other => panic!("Expected Transport, got {other:?}"),
    }
}

/// **VALUE**: Verifies the response timeout produces a timeout Transport error.
#[tokio::test]
async fn given_slow_server_when_calling_then_transport_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_millis(500)))
        .mount(&server)
        .await;
    let invoker = invoker_with(ClientProperties::new(server.uri()).with_timeouts(1000, 100, 100));

    let err = invoker.get_json::<InfoResponse>("/slow").await.unwrap_err();

    match err {
        InvokerError::Transport { is_timeout, .. } => assert!(is_timeout),
        other => panic!("Expected Transport timeout, got {other:?}"),
    }
}

/// **VALUE**: Verifies correlation headers are forwarded from the task scope.
///
/// **WHY THIS MATTERS**: Request IDs tie downstream logs to the inbound request.
#[tokio::test]
async fn given_correlation_scope_when_calling_then_ids_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("x-request-id", "req-7"))
        .and(header("x-user-ip", "192.168.1.10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "carol"})))
        .expect(1)
        .mount(&server)
        .await;
    let invoker = invoker_for(&server);

    let info: InfoResponse = correlation::scope(
        Correlation::new("req-7").with_client_ip("192.168.1.10"),
        invoker.get_json("/login"),
    )
    .await
    .unwrap();

    assert_eq!(info.name, "carol");
}

/// **VALUE**: Verifies every exchange is reported to the observation sink.
///
/// **BUG THIS CATCHES**: Would catch failures skipping the observation or wrong outcome buckets.
#[tokio::test]
async fn given_mixed_statuses_when_calling_then_observations_recorded() {
    // GIVEN: One OK and one not-found endpoint
    let server = MockServer::start().await;
    Mock::given(path("/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "x"})))
        .mount(&server)
        .await;
    Mock::given(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let sink = RecordingSink::shared();
    let invoker = ServiceInvoker::builder(SERVICE)
        .properties(ClientProperties::new(server.uri()))
        .observation_sink(sink.clone())
        .build()
        .unwrap();

    // WHEN: Calling both
    let _: InfoResponse = invoker.get_json("/ok").await.unwrap();
    let _ = invoker.delete("/missing").await;

    // THEN: Two observations with matching outcomes
    let observations = sink.taken();
    assert_eq!(observations.len(), 2);
    assert_eq!(observations[0].name, SERVICE);
    assert_eq!(observations[0].method, "GET");
    assert_eq!(observations[0].uri, "/ok");
    assert_eq!(observations[0].outcome, Outcome::Success);
    assert_eq!(observations[1].method, "DELETE");
    assert_eq!(observations[1].outcome, Outcome::ClientError);
    assert_eq!(observations[1].status, Some(HttpStatusCode(404)));
}

/// **VALUE**: Verifies many concurrent calls share one invoker.
///
/// **WHY THIS MATTERS**: One invoker per service is shared by every request handler.
///
/// **BUG THIS CATCHES**: Would catch permits leaking (later calls would time out).
#[tokio::test]
async fn given_shared_invoker_when_many_concurrent_calls_then_all_succeed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "n"})))
        .expect(20)
        .mount(&server)
        .await;
    let invoker = Arc::new(invoker_with(
        ClientProperties::new(server.uri()).with_pool(4, 2),
    ));

    let calls = (0..20).map(|i| {
        let invoker = Arc::clone(&invoker);
        async move { invoker.get_json::<InfoResponse>(&format!("/item/{i}")).await }
    });
    let results = futures_util::future::join_all(calls).await;

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(invoker.available_connections(), 4);
}

/// **VALUE**: Verifies pool exhaustion waits up to the connect timeout, then fails.
///
/// **WHY THIS MATTERS**: Exhaustion must neither fail immediately nor hang.
///
/// **BUG THIS CATCHES**: Would catch the pool bounds not being enforced at all.
#[tokio::test]
async fn given_exhausted_pool_when_second_call_waits_past_connect_timeout_then_transport_timeout() {
    // GIVEN: A single-connection pool and a slow endpoint
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"name": "slow"}))
                .set_delay(std::time::Duration::from_millis(400)),
        )
        .mount(&server)
        .await;
    let invoker = invoker_with(
        ClientProperties::new(server.uri())
            .with_pool(1, 1)
            .with_timeouts(100, 2000, 2000),
    );

    // WHEN: Two calls race for the only connection
    let (first, second) = futures_util::future::join(
        invoker.get_json::<InfoResponse>("/a"),
        invoker.get_json::<InfoResponse>("/b"),
    )
    .await;

    // THEN: One succeeds, the other times out waiting for the pool
    let (ok, err) = match (first, second) {
        (Ok(ok), Err(err)) | (Err(err), Ok(ok)) => (ok, err),
        other => panic!("Expected one success and one failure, got {other:?}"),
    };
    assert_eq!(ok.name, "slow");
    assert!(matches!(
        err,
        InvokerError::Transport {
            is_timeout: true,
            ..
        }
    ));
}
