use crate::helpers::InfoResponse;

use service_invoker::{ConfigError, InvokerRegistry, ServiceInvoker, ServicesConfig};

use std::io::Write;
use std::path::Path;

use serde_json::json;
use serial_test::serial;
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write config");
    file
}

/// **VALUE**: Verifies a services file drives a working registry end to end.
///
/// **WHY THIS MATTERS**: This is how applications wire their invokers at start-up.
///
/// **BUG THIS CATCHES**: Would catch file loading, section binding or registry wiring breaking.
#[tokio::test]
async fn given_services_file_when_registry_built_then_invokers_are_usable() {
    // GIVEN: A file with two services pointing at the mock server
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "file"})))
        .mount(&server)
        .await;
    let file = write_config(&format!(
        r#"
        [custom-web-service.client]
        baseUrl = "{uri}/api/"

        [custom-web-service.client.pool]
        maxTotal = 10
        maxPerRoute = 2

        [audit.client]
        baseUrl = "{uri}"
        "#,
        uri = server.uri()
    ));

    // WHEN: Loading and building the registry
    let config = ServicesConfig::load(file.path()).unwrap();
    let registry = InvokerRegistry::from_config(&config).await.unwrap();

    // THEN: Both invokers exist and calls resolve against the base URL
    assert_eq!(registry.names().await, vec!["audit", "custom-web-service"]);
    let invoker = registry.get("custom-web-service").await.unwrap();
    assert_eq!(invoker.properties().pool.max_total, 10);
    let info: InfoResponse = invoker.get_json("/info").await.unwrap();
    assert_eq!(info.name, "file");

    // AND: dispose_all closes every invoker
    registry.dispose_all().await;
    assert!(invoker.is_disposed());
    assert!(registry.get("audit").await.unwrap().is_disposed());
}

/// **VALUE**: Verifies a missing file is a ReadError naming the path.
#[test]
fn given_missing_file_when_loading_then_read_error() {
    let err = ServicesConfig::load(Path::new("/definitely/not/here/services.toml")).unwrap_err();

    match err {
        ConfigError::ReadError { path, .. } => {
            assert!(path.ends_with("services.toml"));
        }
        other => panic!("Expected ReadError, got {other:?}"),
    }
}

/// **VALUE**: Verifies a process environment variable supplies a missing base URL.
///
/// **WHY THIS MATTERS**: Deployments inject per-environment URLs through the environment.
///
/// **BUG THIS CATCHES**: Would catch `client_properties` ignoring the process environment.
#[tokio::test]
#[serial]
async fn given_base_url_in_environment_when_building_from_config_then_env_value_used() {
    // GIVEN: A section without base URL and the URL in the environment
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "env"})))
        .mount(&server)
        .await;
    let config = ServicesConfig::from_toml_str(
        r#"
        [env-driven.client.pool]
        maxTotal = 3
        maxPerRoute = 3
        "#,
    )
    .unwrap();
    // SAFETY: env mutation is confined to #[serial] tests
    unsafe { std::env::set_var("ENV_DRIVEN_CLIENT_BASEURL", server.uri()) };

    // WHEN: Building the invoker
    let result = ServiceInvoker::from_config(&config, "env-driven");
    unsafe { std::env::remove_var("ENV_DRIVEN_CLIENT_BASEURL") };

    // THEN: It points at the server from the environment
    let invoker = result.unwrap();
    assert_eq!(invoker.base_url(), server.uri());
    let info: InfoResponse = invoker.get_json("/x").await.unwrap();
    assert_eq!(info.name, "env");
}

/// **VALUE**: Verifies a section with neither file nor env base URL fails at build time.
#[test]
#[serial]
fn given_no_base_url_anywhere_when_building_from_config_then_fails() {
    let config = ServicesConfig::from_toml_str("[nowhere.client]\n").unwrap();

    let err = ServiceInvoker::from_config(&config, "nowhere").unwrap_err();

    assert!(err.to_string().contains("base URL"));
}
