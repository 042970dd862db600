// Unit tests for error module

use crate::error::SampleError;

use service_invoker::{ClientProperties, ServiceInvoker};

/// **VALUE**: Tests that errors can be serialized for structured output.
///
/// **BUG THIS CATCHES**: Would catch a non-serializable field sneaking into SampleError.
#[test]
fn given_sample_error_when_serialized_then_tagged_json() {
    // GIVEN: An invoker failure converted into a SampleError
    let invoker_err = ServiceInvoker::builder("custom-web-service")
        .properties(ClientProperties::default())
        .build()
        .unwrap_err();
    let err = SampleError::from(invoker_err);

    // WHEN: Serializing to JSON
    let json = serde_json::to_string(&err).unwrap();

    // THEN: Variant tag and message are present
    assert!(json.contains("\"type\":\"Invoker\""));
    assert!(json.contains("base URL"));
}

/// **VALUE**: Verifies the conversion records where it happened.
#[test]
fn given_invoker_error_when_converted_then_location_points_here() {
    let invoker_err = ServiceInvoker::builder("x").build().unwrap_err();

    let err = SampleError::from(invoker_err);

    assert!(err.to_string().contains("tests/error.rs"));
}
