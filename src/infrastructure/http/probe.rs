use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client as ReqwestClient, StatusCode};
use tracing::debug;

use crate::domain::errors::WaitFailure;
use crate::domain::models::poll::Outcome;
use crate::services::convergence_waiter::{ConvergenceWaiter, WaitReport};
use crate::services::error_classifier::{classify_error, ErrorClass, StatusCodeClassifier};

/// Per-request timeout applied by [`HttpProbe::new`]
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Readiness probe for an HTTP endpoint.
///
/// A tick is satisfied when the endpoint answers `200 OK`; the response
/// body becomes the wait's value. Client errors the [`StatusCodeClassifier`]
/// deems permanent (401, 403, ...) abort the wait; every other status
/// counts as not-yet. Request failures go through the same classifier:
/// timeouts and refused connections are retried, malformed requests abort.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    http_client: ReqwestClient,
    url: String,
    bearer_token: Option<String>,
    classifier: StatusCodeClassifier,
}

impl HttpProbe {
    /// Create a probe for `url` with its own client and the default
    /// request timeout
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let http_client = ReqwestClient::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_client(http_client, url))
    }

    /// Create a probe that reuses an existing client
    pub fn with_client(http_client: ReqwestClient, url: impl Into<String>) -> Self {
        Self {
            http_client,
            url: url.into(),
            bearer_token: None,
            classifier: StatusCodeClassifier::new(),
        }
    }

    /// Send `Authorization: Bearer <token>` with every request
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Replace the status policy, e.g. to keep retrying a 403 while RBAC
    /// bindings propagate
    #[must_use]
    pub fn with_classifier(mut self, classifier: StatusCodeClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Perform one request and classify the answer
    pub async fn check(&self) -> Outcome<String> {
        let mut request = self.http_client.get(&self.url);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => return classify_error(&err, &self.classifier),
        };

        let status = response.status();
        if status != StatusCode::OK {
            debug!(url = %self.url, status = status.as_u16(), "probe returned unexpected status");
            let observation = format!("Returned wrong status code: {}", status.as_u16());
            if status.is_client_error()
                && self.classifier.classify_status(status.as_u16()) == ErrorClass::Permanent
            {
                return Outcome::HardError(observation);
            }
            return Outcome::NotYet(Some(observation));
        }

        match response.text().await {
            Ok(body) => Outcome::Satisfied(body),
            Err(err) => classify_error(&err, &self.classifier),
        }
    }

    /// Poll [`HttpProbe::check`] with the cadence of `waiter`
    pub async fn wait(&self, waiter: &ConvergenceWaiter) -> Result<WaitReport<String>, WaitFailure> {
        waiter.wait(move || self.check()).await
    }
}
