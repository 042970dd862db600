//! Demonstration calls against `custom-web-service`.
//!
//! The first call is expected to succeed. The others exercise the failure
//! paths of the remote service: a missing header on `/login`, then a null,
//! an empty and a non-numeric `ssn` on `/info`.

use service_invoker::{InvokerError, Method, ServiceInvoker};

use log::{error, info};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const SERVICE_NAME: &str = "custom-web-service";

pub const INFO_PATH: &str = "/info";
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Serialize)]
pub struct GetInfoRequest {
    pub ssn: Option<String>,
}

impl GetInfoRequest {
    pub fn new(ssn: Option<&str>) -> Self {
        Self {
            ssn: ssn.map(str::to_string),
        }
    }
}

/// Whatever fields the service returns.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct GetInfoResponse {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug)]
pub struct DemoStep {
    pub label: &'static str,
    pub result: Result<GetInfoResponse, InvokerError>,
}

#[derive(Debug, Default)]
pub struct DemoReport {
    pub steps: Vec<DemoStep>,
}

impl DemoReport {
    pub fn succeeded(&self) -> usize {
        self.steps.iter().filter(|s| s.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.steps.len() - self.succeeded()
    }

    fn push(&mut self, label: &'static str, result: Result<GetInfoResponse, InvokerError>) {
        match &result {
            Ok(response) => info!("{label}: Response Info: {:?}", response.fields),
            Err(e @ InvokerError::RemoteRejection { .. }) => error!(
                "{label}: rejected with {:?} (identifier: {})",
                e.status(),
                e.remote_identifier().unwrap_or("none")
            ),
            Err(e) => error!("{label}: {} failure: {e}", e.kind().as_str()),
        }
        self.steps.push(DemoStep { label, result });
    }
}

/// Run every demonstration call; failures are logged, never propagated.
pub async fn run(invoker: &ServiceInvoker) -> DemoReport {
    let mut report = DemoReport::default();

    report.push("info with valid ssn", post_info(invoker, Some("123456789")).await);
    report.push("login without headers", get_login(invoker).await);
    report.push("info with null ssn", post_info(invoker, None).await);
    report.push("info with empty ssn", post_info(invoker, Some("")).await);
    report.push("info with non-numeric ssn", post_info(invoker, Some("a1233")).await);

    info!(
        "Demo finished: {} succeeded, {} failed",
        report.succeeded(),
        report.failed()
    );
    report
}

async fn post_info(
    invoker: &ServiceInvoker,
    ssn: Option<&str>,
) -> Result<GetInfoResponse, InvokerError> {
    invoker
        .post_json(INFO_PATH, &GetInfoRequest::new(ssn))
        .await
}

async fn get_login(invoker: &ServiceInvoker) -> Result<GetInfoResponse, InvokerError> {
    let request = invoker.request(Method::GET, LOGIN_PATH)?;
    invoker.execute_json(request).await
}
