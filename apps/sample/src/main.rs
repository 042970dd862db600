use sample::demo::{self, SERVICE_NAME};
use sample::error::SampleError;
use sample::logger::initialize as LoggerInitialize;
use sample::paths;

use service_invoker::correlation::{self, Correlation};
use service_invoker::{InvokerRegistry, ServicesConfig};

use common::ErrorLocation;

use std::fs::create_dir_all;
use std::panic::Location;

use log::info;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), SampleError> {
    let log_dir = paths::log_dir();
    create_dir_all(&log_dir).map_err(|e| SampleError::Sample {
        message: format!("Failed to create log directory: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    // Initialize logger FIRST
    LoggerInitialize(&log_dir)?;
    info!("Service invoker sample starting");
    info!("Log directory: {}", log_dir.display());

    // Environment overrides must be in place before binding
    paths::load_dotenv();

    let config_path = paths::config_path();
    let config = ServicesConfig::load(&config_path)?;
    let registry = InvokerRegistry::from_config(&config).await?;
    info!("Registered services: {:?}", registry.names().await);

    let invoker = registry
        .get(SERVICE_NAME)
        .await
        .ok_or_else(|| SampleError::Sample {
            message: format!(
                "Service '{SERVICE_NAME}' is not configured in {}",
                config_path.display()
            ),
            location: ErrorLocation::from(Location::caller()),
        })?;

    let request_id = Uuid::new_v4().to_string();
    info!("Running demo with request id {request_id}");
    let report = correlation::scope(
        Correlation::new(request_id).with_client_ip("127.0.0.1"),
        demo::run(&invoker),
    )
    .await;

    registry.dispose_all().await;
    info!(
        "Service invoker sample finished ({} of {} calls succeeded)",
        report.succeeded(),
        report.steps.len()
    );

    Ok(())
}
