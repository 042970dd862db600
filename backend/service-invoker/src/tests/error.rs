use crate::error::{ConfigError, ErrorKind, InvokerError};
use crate::error_translator::LocalError;

use common::{ErrorLocation, HttpStatusCode};

use std::panic::Location;

/// **VALUE**: Verifies constructors capture the caller's location.
///
/// **WHY THIS MATTERS**: The location is the only pointer back to the failing call site
/// when an error reaches the logs.
///
/// **BUG THIS CATCHES**: Would catch `#[track_caller]` being removed from a constructor,
/// which makes every error point into `error/invoker.rs`.
#[test]
fn given_transport_error_when_formatted_then_includes_caller_location() {
    // GIVEN: An error constructed in this file
    let err = InvokerError::transport("connection reset");

    // WHEN: Formatting it
    let rendered = err.to_string();

    // THEN: Type, message and this file's name appear
    assert!(rendered.contains("Transport Error"));
    assert!(rendered.contains("connection reset"));
    assert!(rendered.contains("tests/error.rs"));
    assert_eq!(err.kind(), ErrorKind::Transport);
}

/// **VALUE**: Verifies ConfigError converts into a ClientConfiguration error.
///
/// **WHY THIS MATTERS**: Builders use `?` on config results; the caller must see
/// a single error type with the original message kept.
///
/// **BUG THIS CATCHES**: Would catch the From impl mapping to the wrong variant.
#[test]
#[track_caller]
fn given_config_error_when_converted_then_client_configuration_keeps_message() {
    let config_err = ConfigError::ValidationError {
        location: ErrorLocation::from(Location::caller()),
        service: "svc".to_string(),
        reason: "base URL cannot be null or blank".to_string(),
    };

    let err: InvokerError = config_err.into();

    assert_eq!(err.kind(), ErrorKind::ClientConfiguration);
    assert!(err.to_string().contains("base URL cannot be null or blank"));
}

/// **VALUE**: Verifies accessors on a remote rejection.
///
/// **BUG THIS CATCHES**: Would catch `status()`/`remote_identifier()` returning `None`
/// for the one variant that carries them.
#[test]
fn given_remote_rejection_when_inspected_then_status_identifier_and_class_available() {
    let err = InvokerError::remote_rejection(
        HttpStatusCode(409),
        Some("E409".to_string()),
        Some(LocalError::business("DuplicateOrder")),
        "duplicate",
        "{}",
    );

    assert_eq!(err.kind(), ErrorKind::RemoteRejection);
    assert_eq!(err.status(), Some(HttpStatusCode(409)));
    assert_eq!(err.remote_identifier(), Some("E409"));
    assert!(err.is_business());
    assert!(err.to_string().contains("409"));
}

/// **VALUE**: Verifies non-rejection variants carry no identifier and are never business.
#[test]
fn given_decoding_error_when_inspected_then_no_identifier() {
    let err = InvokerError::decoding("missing field `id`", Some(HttpStatusCode(200)));

    assert_eq!(err.kind(), ErrorKind::Decoding);
    assert_eq!(err.status(), Some(HttpStatusCode(200)));
    assert_eq!(err.remote_identifier(), None);
    assert!(!err.is_business());
}

/// **VALUE**: Verifies kind names are stable strings.
#[test]
fn given_error_kinds_when_as_str_then_upper_snake_case() {
    assert_eq!(ErrorKind::ClientConfiguration.as_str(), "CLIENT_CONFIGURATION");
    assert_eq!(ErrorKind::Transport.as_str(), "TRANSPORT");
    assert_eq!(ErrorKind::RemoteRejection.as_str(), "REMOTE_REJECTION");
    assert_eq!(ErrorKind::Decoding.as_str(), "DECODING");
}

/// **VALUE**: Verifies a request-time builder error is reported as a transport failure.
///
/// **WHY THIS MATTERS**: `ClientConfiguration` means the invoker could not be created at
/// start-up; a single malformed request must not look like a broken service setup.
///
/// **BUG THIS CATCHES**: Would catch reqwest builder errors being mapped to
/// `ClientConfiguration` when they happen while sending.
#[test]
fn given_request_builder_error_when_converted_then_transport_error() {
    // GIVEN: A reqwest error raised while building a single request
    let error = reqwest::Client::new()
        .get("not a url")
        .build()
        .unwrap_err();
    assert!(error.is_builder());

    // WHEN: Converting it
    let err = InvokerError::from_reqwest(&error);

    // THEN: Transport, neither timeout nor connection
    assert!(matches!(
        err,
        InvokerError::Transport {
            is_timeout: false,
            is_connection: false,
            ..
        }
    ));
}
