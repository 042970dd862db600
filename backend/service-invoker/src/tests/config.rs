// Unit tests for ClientProperties binding and validation

use crate::config::{ClientProperties, ServicesConfig};
use crate::error::ConfigError;

fn no_env(_: &str) -> Option<String> {
    None
}

// ============================================
// BINDING
// ============================================

/// **VALUE**: Verifies camelCase keys of a service section bind onto ClientProperties.
///
/// **WHY THIS MATTERS**: Operators write `maxPerRoute`, `connectionTimeout`, etc.
/// A serde rename mistake silently falls back to defaults.
///
/// **BUG THIS CATCHES**: Would catch a missing `rename_all = "camelCase"` on any config struct.
#[test]
fn given_full_service_section_when_bound_then_all_values_are_read() {
    // GIVEN: A document with every property set
    let config = ServicesConfig::from_toml_str(
        r#"
        [custom-web-service.client]
        baseUrl = "http://localhost:8080/api"

        [custom-web-service.client.pool]
        maxTotal = 50
        maxPerRoute = 10

        [custom-web-service.client.connection]
        connectionTimeout = 2000
        socketTimeout = 3000
        responseTimeout = 4000
        followRedirects = false

        [custom-web-service.client.authorization]
        enable = true
        username = "svc"
        password = "secret"
        "#,
    )
    .unwrap();

    // WHEN: Binding the service
    let props = config
        .client_properties_with("custom-web-service", no_env)
        .unwrap();

    // THEN: Every field carries the configured value
    assert_eq!(props.base_url(), Some("http://localhost:8080/api"));
    assert_eq!(props.pool.max_total, 50);
    assert_eq!(props.pool.max_per_route, 10);
    assert_eq!(props.connection.connection_timeout, 2000);
    assert_eq!(props.connection.socket_timeout, 3000);
    assert_eq!(props.connection.response_timeout, 4000);
    assert!(!props.connection.follow_redirects);
    assert!(props.authorization.enable);
    assert_eq!(props.authorization.username.as_deref(), Some("svc"));
    assert_eq!(props.authorization.password.expose(), "secret");
}

/// **VALUE**: Verifies omitted properties fall back to documented defaults.
///
/// **WHY THIS MATTERS**: Most services only configure a base URL.
///
/// **BUG THIS CATCHES**: Would catch a missing `#[serde(default = ...)]` turning an
/// optional key into a hard parse error.
#[test]
fn given_only_base_url_when_bound_then_defaults_fill_the_rest() {
    // GIVEN: A minimal section
    let config = ServicesConfig::from_toml_str(
        r#"
        [billing.client]
        baseUrl = "https://billing.internal"
        "#,
    )
    .unwrap();

    // WHEN: Binding it
    let props = config.client_properties_with("billing", no_env).unwrap();

    // THEN: Defaults apply
    assert_eq!(props.pool.max_total, 25);
    assert_eq!(props.pool.max_per_route, 5);
    assert_eq!(props.connection.connection_timeout, 5_000);
    assert_eq!(props.connection.socket_timeout, 10_000);
    assert_eq!(props.connection.response_timeout, 30_000);
    assert!(props.connection.follow_redirects);
    assert!(!props.authorization.enable);
}

/// **VALUE**: Verifies the legacy `baseServiceUrl` key is accepted.
///
/// **WHY THIS MATTERS**: Existing configuration files use the older key name.
///
/// **BUG THIS CATCHES**: Would catch the serde alias being dropped.
#[test]
fn given_legacy_base_service_url_key_when_bound_then_base_url_is_set() {
    let config = ServicesConfig::from_toml_str(
        r#"
        [legacy.client]
        baseServiceUrl = "http://legacy:9000"
        "#,
    )
    .unwrap();

    let props = config.client_properties_with("legacy", no_env).unwrap();

    assert_eq!(props.base_url(), Some("http://legacy:9000"));
}

/// **VALUE**: Verifies only sections with a `client` table are listed as services.
///
/// **WHY THIS MATTERS**: The registry builds one invoker per listed name; unrelated
/// top-level tables must not turn into broken clients.
///
/// **BUG THIS CATCHES**: Would catch `service_names` returning every top-level key.
#[test]
fn given_mixed_document_when_listing_services_then_only_client_sections_are_returned() {
    let config = ServicesConfig::from_toml_str(
        r#"
        [zeta.client]
        baseUrl = "http://z"

        [alpha.client]
        baseUrl = "http://a"

        [logging]
        level = "debug"
        "#,
    )
    .unwrap();

    assert_eq!(config.service_names(), vec!["alpha", "zeta"]);
}

/// **VALUE**: Verifies malformed TOML is reported as a ParseError.
///
/// **BUG THIS CATCHES**: Would catch parse failures being swallowed into defaults.
#[test]
fn given_malformed_toml_when_parsed_then_returns_parse_error() {
    let result = ServicesConfig::from_toml_str("[broken.client\nbaseUrl = ");

    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

/// **VALUE**: Verifies a wrongly typed value is a ParseError naming the section.
///
/// **WHY THIS MATTERS**: `maxTotal = "lots"` must fail loudly at start-up.
///
/// **BUG THIS CATCHES**: Would catch type errors being replaced by defaults.
#[test]
fn given_wrongly_typed_value_when_bound_then_parse_error_names_section() {
    let config = ServicesConfig::from_toml_str(
        r#"
        [svc.client.pool]
        maxTotal = "lots"
        "#,
    )
    .unwrap();

    let err = config.client_properties_with("svc", no_env).unwrap_err();

    match err {
        ConfigError::ParseError { origin, .. } => assert_eq!(origin, "svc.client"),
        other => panic!("Expected ParseError, got {other:?}"),
    }
}

// ============================================
// VALIDATION
// ============================================

/// **VALUE**: Verifies a missing base URL is rejected.
///
/// **WHY THIS MATTERS**: A client without base URL must never be built; the failure
/// belongs at start-up, not on the first request.
///
/// **BUG THIS CATCHES**: Would catch validation treating `None` or blank as valid.
#[test]
fn given_missing_or_blank_base_url_when_validated_then_fails() {
    // GIVEN: No base URL, and a whitespace-only one
    let missing = ClientProperties::default();
    let blank = ClientProperties::new("   ");

    // WHEN / THEN: Both are rejected with a message naming the base URL
    for props in [missing, blank] {
        let err = props.validate("svc").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
        assert!(err.to_string().contains("base URL"));
        assert!(err.to_string().contains("svc"));
    }
}

/// **VALUE**: Verifies non-http URLs are rejected.
///
/// **BUG THIS CATCHES**: Would catch `ftp://` or garbage strings slipping through.
#[test]
fn given_non_http_or_unparseable_url_when_validated_then_fails() {
    assert!(ClientProperties::new("ftp://files.local").validate("svc").is_err());
    assert!(ClientProperties::new("not a url").validate("svc").is_err());
}

/// **VALUE**: Verifies pool bounds are checked.
///
/// **WHY THIS MATTERS**: A zero-sized pool would make every request wait for the
/// full connect timeout and then fail.
///
/// **BUG THIS CATCHES**: Would catch `maxPerRoute > maxTotal` or zero sizes being accepted.
#[test]
fn given_invalid_pool_sizes_when_validated_then_fails() {
    let zero = ClientProperties::new("http://svc").with_pool(0, 0);
    let inverted = ClientProperties::new("http://svc").with_pool(2, 10);

    assert!(zero.validate("svc").is_err());
    let err = inverted.validate("svc").unwrap_err();
    assert!(err.to_string().contains("maxPerRoute"));
}

/// **VALUE**: Verifies zero timeouts are rejected.
///
/// **BUG THIS CATCHES**: Would catch a zero timeout being passed to reqwest, which
/// fails every request immediately.
#[test]
fn given_zero_timeout_when_validated_then_fails() {
    let props = ClientProperties::new("http://svc").with_timeouts(1000, 0, 1000);

    assert!(props.validate("svc").is_err());
}

/// **VALUE**: Verifies enabled auth needs a username.
///
/// **BUG THIS CATCHES**: Would catch sending `Basic base64(":")` to the remote.
#[test]
fn given_auth_enabled_without_username_when_validated_then_fails() {
    let mut props = ClientProperties::new("http://svc");
    props.authorization.enable = true;

    let err = props.validate("svc").unwrap_err();

    assert!(err.to_string().contains("username"));
}

/// **VALUE**: Verifies a valid snapshot returns the parsed URL.
#[test]
fn given_valid_properties_when_validated_then_returns_parsed_url() {
    let props = ClientProperties::new("https://x.com/api").with_basic_auth("user", "pass");

    let url = props.validate("svc").unwrap();

    assert_eq!(url.host_str(), Some("x.com"));
    assert_eq!(url.path(), "/api");
}

/// **VALUE**: Verifies the password never appears in Debug output of the properties.
///
/// **WHY THIS MATTERS**: Properties are logged with `{:?}` during troubleshooting.
///
/// **BUG THIS CATCHES**: Would catch the password field regressing to a plain String.
#[test]
fn given_properties_with_password_when_debug_formatted_then_password_hidden() {
    let props = ClientProperties::new("http://svc").with_basic_auth("user", "hunter2");

    let debug = format!("{props:?}");

    assert!(debug.contains("user"));
    assert!(!debug.contains("hunter2"));
}
