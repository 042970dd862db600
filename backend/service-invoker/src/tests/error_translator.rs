// Unit tests for the error translator
// Covers both extraction strategies, fallbacks and decoding.

use crate::error::{ErrorKind, InvokerError};
use crate::error_translator::{ErrorClass, ErrorTranslator, ErrorTranslatorConfig, LocalError};
use crate::http::HttpResponse;

use common::HttpStatusCode;

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::Deserialize;

fn response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status: StatusCode::from_u16(status).unwrap(),
        headers: HeaderMap::new(),
        body: body.as_bytes().to_vec(),
    }
}

fn rejection(result: Result<HttpResponse, InvokerError>) -> InvokerError {
    match result {
        Err(err @ InvokerError::RemoteRejection { .. }) => err,
        Err(other) => panic!("Expected RemoteRejection, got {other:?}"),
        Ok(resp) => panic!("Expected rejection, got HTTP {}", resp.status),
    }
}

/// **VALUE**: Verifies 2xx responses pass through untouched.
///
/// **BUG THIS CATCHES**: Would catch the translator inspecting or consuming successful bodies.
#[test]
fn given_success_response_when_translated_then_passes_through() {
    let translator = ErrorTranslator::default();

    let resp = translator.translate(response(201, "{\"id\":1}")).unwrap();

    assert_eq!(resp.status.as_u16(), 201);
    assert_eq!(resp.body, b"{\"id\":1}");
}

/// **VALUE**: Verifies the configured identifier field is extracted from a JSON error body.
///
/// **WHY THIS MATTERS**: Callers branch on the remote identifier to decide how to
/// recover (e.g. "insufficient funds" vs "account locked").
///
/// **BUG THIS CATCHES**: Would catch the identifier or message being dropped.
#[test]
fn given_error_body_with_identifier_when_translated_then_rejection_carries_it() {
    // GIVEN: Default config (identifier field `errorCode`, message field `message`)
    let translator = ErrorTranslator::default();

    // WHEN: Translating a 400 with both fields
    let err = rejection(translator.translate(response(
        400,
        r#"{"errorCode":"E100","message":"Invalid SSN"}"#,
    )));

    // THEN: Identifier, status and message are carried
    assert_eq!(err.remote_identifier(), Some("E100"));
    assert_eq!(err.status(), Some(HttpStatusCode(400)));
    match &err {
        InvokerError::RemoteRejection { message, body, .. } => {
            assert_eq!(message, "Invalid SSN");
            assert!(body.contains("E100"));
        }
        _ => unreachable!(),
    }
}

/// **VALUE**: Verifies the first configured identifier field present wins.
///
/// **BUG THIS CATCHES**: Would catch fields being checked in map order instead of config order.
#[test]
fn given_several_identifier_fields_when_translated_then_first_present_wins() {
    let translator =
        ErrorTranslator::new(ErrorTranslatorConfig::identifier_fields(["code", "errorCode"]));

    let both = rejection(translator.translate(response(
        422,
        r#"{"errorCode":"LATER","code":"FIRST"}"#,
    )));
    let fallback = rejection(translator.translate(response(422, r#"{"errorCode":"ONLY"}"#)));

    assert_eq!(both.remote_identifier(), Some("FIRST"));
    assert_eq!(fallback.remote_identifier(), Some("ONLY"));
}

/// **VALUE**: Verifies an unparseable body still yields a rejection, without identifier.
///
/// **WHY THIS MATTERS**: Proxies and load balancers answer with HTML error pages.
///
/// **BUG THIS CATCHES**: Would catch a JSON parse failure being surfaced as a DecodingError.
#[test]
fn given_html_error_body_when_translated_then_rejection_without_identifier() {
    let translator = ErrorTranslator::default();

    let err = rejection(translator.translate(response(502, "<html>Bad Gateway</html>")));

    assert_eq!(err.kind(), ErrorKind::RemoteRejection);
    assert_eq!(err.remote_identifier(), None);
    assert!(err.local_error().is_none());
    assert!(err.to_string().contains("Bad Gateway"));
}

/// **VALUE**: Verifies full-name extraction with a scan package prefix.
///
/// **WHY THIS MATTERS**: Remote services often send the short exception name while the
/// mapping table is keyed by fully-qualified name.
///
/// **BUG THIS CATCHES**: Would catch scan packages being ignored or joined without a dot.
#[test]
fn given_short_name_and_scan_package_when_translated_then_maps_to_qualified_entry() {
    // GIVEN: A full-name config with one scan package and one mapping
    let config = ErrorTranslatorConfig::full_name("exceptionName")
        .with_scan_package("com.acme.errors.")
        .with_mapping(
            "com.acme.errors.InsufficientFunds",
            LocalError::business("InsufficientFunds"),
        );
    let translator = ErrorTranslator::new(config);

    // WHEN: The body names the short form
    let err = rejection(translator.translate(response(
        400,
        r#"{"exceptionName":"InsufficientFunds"}"#,
    )));

    // THEN: The qualified entry matched and is a business error
    assert_eq!(
        err.remote_identifier(),
        Some("com.acme.errors.InsufficientFunds")
    );
    assert!(err.is_business());
}

/// **VALUE**: Verifies an exact full-name match is preferred over scan packages.
#[test]
fn given_fully_qualified_name_when_translated_then_exact_match_used() {
    let config = ErrorTranslatorConfig::full_name("exceptionName")
        .with_scan_package("com.other")
        .with_mapping("com.acme.Locked", LocalError::runtime("Locked"));
    let translator = ErrorTranslator::new(config);

    let err = rejection(translator.translate(response(423, r#"{"exceptionName":"com.acme.Locked"}"#)));

    assert_eq!(err.local_error(), Some(&LocalError::runtime("Locked")));
    assert!(!err.is_business());
}

/// **VALUE**: Verifies unmapped identifiers fall back to the configured default class.
///
/// **BUG THIS CATCHES**: Would catch unmapped identifiers losing their identifier or class.
#[test]
fn given_unmapped_identifier_when_translated_then_default_class_applies() {
    let translator = ErrorTranslator::new(
        ErrorTranslatorConfig::default().with_default_class(ErrorClass::Business),
    );

    let err = rejection(translator.translate(response(404, r#"{"errorCode":"E404"}"#)));

    let local = err.local_error().unwrap();
    assert_eq!(local.name, "E404");
    assert_eq!(local.class, ErrorClass::Business);
}

/// **VALUE**: Verifies the status reason is used when the body carries no message.
#[test]
fn given_body_without_message_when_translated_then_reason_phrase_used() {
    let translator = ErrorTranslator::default();

    let err = rejection(translator.translate(response(503, r#"{"errorCode":"DOWN"}"#)));

    match err {
        InvokerError::RemoteRejection { message, .. } => {
            assert_eq!(message, "Service Unavailable")
        }
        _ => unreachable!(),
    }
}

#[derive(Debug, Deserialize)]
struct Info {
    name: String,
}

/// **VALUE**: Verifies a body of the wrong shape becomes a DecodingError with status.
///
/// **BUG THIS CATCHES**: Would catch decode failures surfacing as Transport errors.
#[test]
fn given_wrong_shape_when_decoded_then_decoding_error_with_status() {
    let translator = ErrorTranslator::default();
    let resp = response(200, r#"{"unexpected":true}"#);

    let err = translator.decode::<Info>(&resp).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Decoding);
    assert_eq!(err.status(), Some(HttpStatusCode(200)));
}

/// **VALUE**: Verifies unknown fields are ignored when decoding.
#[test]
fn given_extra_fields_when_decoded_then_known_fields_bind() {
    let translator = ErrorTranslator::default();
    let resp = response(200, r#"{"name":"alice","extra":1}"#);

    let info: Info = translator.decode(&resp).unwrap();

    assert_eq!(info.name, "alice");
}
