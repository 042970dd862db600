//! Per-task correlation data forwarded as request headers.

use std::future::Future;

tokio::task_local! {
    static CORRELATION: Correlation;
}

pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const USER_IP_HEADER: &str = "x-user-ip";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Correlation {
    pub request_id: Option<String>,
    pub client_ip: Option<String>,
}

impl Correlation {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: Some(request_id.into()),
            client_ip: None,
        }
    }

    pub fn with_client_ip(mut self, client_ip: impl Into<String>) -> Self {
        self.client_ip = Some(client_ip.into());
        self
    }
}

/// Run `future` with `correlation` visible to every invoker call it makes.
pub async fn scope<F>(correlation: Correlation, future: F) -> F::Output
where
    F: Future,
{
    CORRELATION.scope(correlation, future).await
}

/// Correlation of the current task, if it runs inside [`scope`].
pub fn current() -> Option<Correlation> {
    CORRELATION.try_with(Correlation::clone).ok()
}
