//! One structured log record per exchange, with sensitive fields masked.
//!
//! Field order is fixed:
//! `service method url status latency_ms request_headers request_body
//! response_headers response_body`, followed by `error` when the call failed.
//! The error text is written as an escaped, double-quoted string.

use super::{Interceptor, Next};
use crate::error::invoker::InvokerError;
use crate::http::{HttpResponse, RequestContext};
use crate::masking::FieldMasker;
use crate::masking::payload::{mask_body, mask_headers, mask_url};

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::info;

pub const LOG_TARGET: &str = "service_invoker::http";

const ABSENT: &str = "-";

pub struct MaskingLogInterceptor {
    service: String,
    masker: Arc<dyn FieldMasker>,
}

impl MaskingLogInterceptor {
    pub fn new(service: impl Into<String>, masker: Arc<dyn FieldMasker>) -> Self {
        Self {
            service: service.into(),
            masker,
        }
    }
}

/// Render the log record for one exchange.
pub fn render_exchange(
    service: &str,
    request: &RequestContext,
    outcome: Result<&HttpResponse, &InvokerError>,
    latency: Duration,
    masker: &dyn FieldMasker,
) -> String {
    let mut line = format!(
        "service={service} method={} url={} status={} latency_ms={} request_headers={} request_body={}",
        request.method,
        mask_url(&request.url, masker),
        outcome.map_or_else(|_| ABSENT.to_string(), |r| r.status.as_u16().to_string()),
        latency.as_millis(),
        mask_headers(&request.headers, masker),
        mask_body(request.body.as_deref(), masker),
    );

    match outcome {
        Ok(response) => {
            line.push_str(&format!(
                " response_headers={} response_body={}",
                mask_headers(&response.headers, masker),
                mask_body(Some(response.body.as_slice()), masker)
            ));
        }
        Err(error) => {
            line.push_str(&format!(
                " response_headers={ABSENT} response_body={ABSENT} error={:?}",
                error.to_string()
            ));
        }
    }

    line
}

#[async_trait]
impl Interceptor for MaskingLogInterceptor {
    fn name(&self) -> &'static str {
        "masking-log"
    }

    async fn intercept(
        &self,
        request: &mut RequestContext,
        next: Next<'_>,
    ) -> Result<HttpResponse, InvokerError> {
        let started = Instant::now();
        let result = next.run(request).await;

        info!(
            target: LOG_TARGET,
            "{}",
            render_exchange(
                &self.service,
                request,
                result.as_ref(),
                started.elapsed(),
                self.masker.as_ref()
            )
        );

        result
    }
}
