//! Submission strategies: a local mock and a real HTTP client.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{
    header::{ACCEPT, CONTENT_TYPE},
    Client, Method, Response,
};
use shared::{
    domain::{FormDescriptor, HttpMethod, Payload},
    protocol::TransportResponse,
};
use tracing::{debug, info, warn};
use url::Url;

use crate::{error::TransportError, interpreter::ResponseInterpreter};

pub const MOCK_LATENCY: Duration = Duration::from_millis(600);
const JSON_MIME: &str = "application/json";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionTransport: Send + Sync {
    async fn submit(
        &self,
        descriptor: &FormDescriptor,
        payload: &Payload,
    ) -> Result<TransportResponse, TransportError>;
}

/// Fabricates a reply after a fixed delay. Never fails.
#[derive(Debug, Clone)]
pub struct MockTransport {
    latency: Duration,
    interpreter: ResponseInterpreter,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new(MOCK_LATENCY, ResponseInterpreter::default())
    }
}

impl MockTransport {
    pub fn new(latency: Duration, interpreter: ResponseInterpreter) -> Self {
        Self {
            latency,
            interpreter,
        }
    }
}

#[async_trait]
impl SubmissionTransport for MockTransport {
    async fn submit(
        &self,
        descriptor: &FormDescriptor,
        payload: &Payload,
    ) -> Result<TransportResponse, TransportError> {
        tokio::time::sleep(self.latency).await;
        debug!(
            purpose = descriptor.purpose.as_str(),
            fields = payload.len(),
            "synthesized mock submission"
        );
        Ok(TransportResponse::Synthesized(
            self.interpreter.synthesize(descriptor, payload),
        ))
    }
}

#[derive(Debug, Clone)]
pub struct NetworkTransport {
    http: Client,
    page_url: Url,
}

impl NetworkTransport {
    pub fn new(page_url: Url) -> Self {
        Self::with_client(Client::new(), page_url)
    }

    pub fn with_client(http: Client, page_url: Url) -> Self {
        Self { http, page_url }
    }

    /// Resolves the form's `action` against the page; no action means the page
    /// itself.
    pub fn target_url(&self, descriptor: &FormDescriptor) -> Result<Url, TransportError> {
        match descriptor.action.as_deref() {
            Some(action) => self
                .page_url
                .join(action)
                .map_err(|source| TransportError::InvalidTarget {
                    target: action.to_string(),
                    source,
                }),
            None => Ok(self.page_url.clone()),
        }
    }

    /// Target URL with every payload field set as a query parameter. A
    /// parameter already present in the action with the same name is replaced.
    pub fn query_url(
        &self,
        descriptor: &FormDescriptor,
        payload: &Payload,
    ) -> Result<Url, TransportError> {
        let mut url = self.target_url(descriptor)?;
        let retained: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| payload.get(key).is_none())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        if retained.is_empty() && payload.is_empty() {
            url.set_query(None);
            return Ok(url);
        }

        url.query_pairs_mut()
            .clear()
            .extend_pairs(retained)
            .extend_pairs(payload.iter());
        Ok(url)
    }
}

fn reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[async_trait]
impl SubmissionTransport for NetworkTransport {
    async fn submit(
        &self,
        descriptor: &FormDescriptor,
        payload: &Payload,
    ) -> Result<TransportResponse, TransportError> {
        let response = if descriptor.method == HttpMethod::Get {
            let url = self.query_url(descriptor, payload)?;
            debug!(%url, "submitting form via query string");
            self.http
                .get(url)
                .header(ACCEPT, JSON_MIME)
                .send()
                .await?
        } else {
            let url = self.target_url(descriptor)?;
            debug!(%url, method = %descriptor.method, "submitting form as json");
            self.http
                .request(reqwest_method(descriptor.method), url)
                .header(ACCEPT, JSON_MIME)
                .header(CONTENT_TYPE, JSON_MIME)
                .json(payload)
                .send()
                .await?
        };

        read_response(response).await
    }
}

async fn read_response(response: Response) -> Result<TransportResponse, TransportError> {
    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::Status {
            status: status.as_u16(),
        });
    }

    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains(JSON_MIME));

    if is_json {
        let body = response.json().await.map_err(TransportError::Decode)?;
        Ok(TransportResponse::Json(body))
    } else {
        let body = response.text().await.map_err(TransportError::Decode)?;
        Ok(TransportResponse::Text(body))
    }
}

/// Picks the strategy for one form.
///
/// Without a network transport every form is mocked, whatever it declares.
pub fn select_transport(
    descriptor: &FormDescriptor,
    mock: MockTransport,
    network: Option<NetworkTransport>,
) -> Arc<dyn SubmissionTransport> {
    match network {
        Some(network) if !descriptor.mock => {
            info!(method = %descriptor.method, "form submits over the network");
            Arc::new(network)
        }
        Some(_) => {
            info!("form declares mock mode");
            Arc::new(mock)
        }
        None => {
            if !descriptor.mock {
                warn!("no network transport available; falling back to mock submission");
            }
            Arc::new(mock)
        }
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
