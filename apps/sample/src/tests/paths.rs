use crate::paths::{CONFIG_PATH_VAR, DEFAULT_CONFIG_PATH, LOG_DIR_VAR, config_path, log_dir};

use std::path::PathBuf;

use serial_test::serial;

/// **VALUE**: Verifies the config path falls back to the bundled file and honours overrides.
///
/// **BUG THIS CATCHES**: Would catch the override variable being ignored.
#[test]
#[serial]
fn given_config_override_when_resolving_then_override_wins() {
    // SAFETY: env mutation is confined to #[serial] tests
    unsafe { std::env::remove_var(CONFIG_PATH_VAR) };
    assert_eq!(config_path(), PathBuf::from(DEFAULT_CONFIG_PATH));

    unsafe { std::env::set_var(CONFIG_PATH_VAR, "/etc/sample/services.toml") };
    let overridden = config_path();
    unsafe { std::env::remove_var(CONFIG_PATH_VAR) };

    assert_eq!(overridden, PathBuf::from("/etc/sample/services.toml"));
}

/// **VALUE**: Verifies the default log directory is app-specific.
#[test]
#[serial]
fn given_no_log_dir_override_when_resolving_then_app_directory_used() {
    // SAFETY: env mutation is confined to #[serial] tests
    unsafe { std::env::remove_var(LOG_DIR_VAR) };

    let dir = log_dir();

    assert!(dir.ends_with("service-invoker-sample"));
}
