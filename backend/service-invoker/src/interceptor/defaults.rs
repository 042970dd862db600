use super::{Interceptor, Next};
use crate::correlation::{self, REQUEST_ID_HEADER, USER_IP_HEADER};
use crate::error::invoker::InvokerError;
use crate::http::{HttpResponse, RequestContext};

use async_trait::async_trait;
use log::warn;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};

const APPLICATION_JSON: &str = "application/json";

/// JSON content negotiation plus correlation headers from the task scope.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHeadersInterceptor;

impl DefaultHeadersInterceptor {
    pub fn apply(request: &mut RequestContext) {
        let headers = &mut request.headers;
        headers
            .entry(ACCEPT)
            .or_insert(HeaderValue::from_static(APPLICATION_JSON));

        if request.body.is_some() {
            headers
                .entry(CONTENT_TYPE)
                .or_insert(HeaderValue::from_static(APPLICATION_JSON));
        }

        if let Some(current) = correlation::current() {
            insert_if_absent(headers, REQUEST_ID_HEADER, current.request_id.as_deref());
            insert_if_absent(headers, USER_IP_HEADER, current.client_ip.as_deref());
        }
    }
}

fn insert_if_absent(headers: &mut HeaderMap, name: &'static str, value: Option<&str>) {
    let Some(value) = value else {
        return;
    };
    let name = HeaderName::from_static(name);
    if headers.contains_key(&name) {
        return;
    }
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(e) => warn!("Skipping {name} header, invalid value: {e}"),
    }
}

#[async_trait]
impl Interceptor for DefaultHeadersInterceptor {
    fn name(&self) -> &'static str {
        "default-headers"
    }

    async fn intercept(
        &self,
        request: &mut RequestContext,
        next: Next<'_>,
    ) -> Result<HttpResponse, InvokerError> {
        Self::apply(request);
        next.run(request).await
    }
}
