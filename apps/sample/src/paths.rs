//! Locations the sample reads from and writes to.
//!
//! Each location can be overridden through the environment; `.env` is loaded
//! first so overrides can live next to the binary.

use std::env;
use std::path::PathBuf;

use log::{debug, info, warn};

pub const CONFIG_PATH_VAR: &str = "SAMPLE_SERVICES_CONFIG";
pub const LOG_DIR_VAR: &str = "SAMPLE_LOG_DIR";

pub const DEFAULT_CONFIG_PATH: &str = "config/services.toml";
const APP_DIR_NAME: &str = "service-invoker-sample";

/// Load `.env` from the working directory, then from the executable's directory.
pub fn load_dotenv() -> Option<PathBuf> {
    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded .env from: {path:?}");
        return Some(path);
    }

    let exe_dir = env::current_exe().ok()?.parent()?.to_path_buf();
    let env_path = exe_dir.join(".env");
    if !env_path.exists() {
        debug!("No .env file found");
        return None;
    }

    match dotenvy::from_path(&env_path) {
        Ok(()) => {
            info!("Loaded .env from: {env_path:?}");
            Some(env_path)
        }
        Err(e) => {
            warn!("Failed to parse .env at {env_path:?}: {e}");
            None
        }
    }
}

pub fn config_path() -> PathBuf {
    env::var(CONFIG_PATH_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Env override, then the platform data directory, then the temp directory.
pub fn log_dir() -> PathBuf {
    if let Ok(dir) = env::var(LOG_DIR_VAR) {
        return PathBuf::from(dir);
    }

    dirs::data_local_dir()
        .unwrap_or_else(env::temp_dir)
        .join(APP_DIR_NAME)
}
