use sample::demo::{self, INFO_PATH, LOGIN_PATH, SERVICE_NAME};

use service_invoker::{ClientProperties, ErrorKind, ServiceInvoker};

use serde_json::json;
use wiremock::matchers::{body_json, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// **VALUE**: Verifies the demo runs every call and reports each outcome.
///
/// **WHY THIS MATTERS**: The demo is the reference for how applications use the invoker;
/// a failing call must be reported and must not abort the remaining ones.
///
/// **BUG THIS CATCHES**: Would catch a failing call propagating out of the demo, or the
/// remote rejection details being lost.
#[tokio::test]
async fn given_mock_service_when_demo_runs_then_one_success_and_four_rejections() {
    // GIVEN: A service accepting only the valid ssn, and rejecting /login
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/api{INFO_PATH}")))
        .and(body_json(json!({"ssn": "123456789"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "alice", "age": 30})))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/api{INFO_PATH}")))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"errorCode": "InvalidParameterException", "message": "bad ssn"})),
        )
        .with_priority(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/api{LOGIN_PATH}")))
        .and(header_exists("authorization"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"errorCode": "MissingRequestHeaderException"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let invoker = ServiceInvoker::builder(SERVICE_NAME)
        .properties(
            ClientProperties::new(format!("{}/api", server.uri())).with_basic_auth("sample", "pw"),
        )
        .build()
        .unwrap();

    // WHEN: Running the demo
    let report = demo::run(&invoker).await;

    // THEN: Five steps, only the first succeeded, the rest are remote rejections
    assert_eq!(report.steps.len(), 5);
    assert_eq!(report.succeeded(), 1);
    let first = report.steps[0].result.as_ref().unwrap();
    assert_eq!(first.fields["name"], "alice");

    let login = report.steps[1].result.as_ref().unwrap_err();
    assert_eq!(login.remote_identifier(), Some("MissingRequestHeaderException"));

    for step in &report.steps[1..] {
        let err = step.result.as_ref().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteRejection, "{}", step.label);
    }
}
