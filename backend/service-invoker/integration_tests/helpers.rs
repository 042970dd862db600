//! Test helpers for invoker integration tests.

use service_invoker::{ClientProperties, Observation, ObservationSink, ServiceInvoker};

use std::sync::{Arc, Mutex};

use serde::Deserialize;
use wiremock::MockServer;

pub const SERVICE: &str = "custom-web-service";

#[derive(Debug, Deserialize, PartialEq)]
pub struct InfoResponse {
    pub name: String,
}

/// Test helper: Invoker pointed at a mock server with default properties.
pub fn invoker_for(server: &MockServer) -> ServiceInvoker {
    invoker_with(ClientProperties::new(server.uri()))
}

/// Test helper: Invoker built from explicit properties.
pub fn invoker_with(properties: ClientProperties) -> ServiceInvoker {
    ServiceInvoker::builder(SERVICE)
        .properties(properties)
        .build()
        .expect("Failed to build invoker")
}

/// Observation sink that keeps everything it receives.
#[derive(Default)]
pub struct RecordingSink {
    pub observations: Mutex<Vec<Observation>>,
}

impl ObservationSink for RecordingSink {
    fn record(&self, observation: &Observation) {
        self.observations
            .lock()
            .expect("sink poisoned")
            .push(observation.clone());
    }
}

impl RecordingSink {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn taken(&self) -> Vec<Observation> {
        std::mem::take(&mut *self.observations.lock().expect("sink poisoned"))
    }
}
