// Transport seam: one POST per envelope, raw body back. Timeouts live here,
// the core never retries.

use crate::config::AdapterConfig;
use crate::envelope::RequestEnvelope;
use crate::error::{AdapterError, ClientError};
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use tracing::debug;

/// Form field the backend reads the request document from.
pub const REQUEST_FIELD: &str = "rq";

#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn post(&self, envelope: &RequestEnvelope) -> Result<Bytes, AdapterError>;
}

pub struct HttpTransport {
    client: reqwest::Client,
    endpoint_url: String,
}

impl HttpTransport {
    pub fn new(config: &AdapterConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout_ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::InitError(e.to_string()))?;

        Ok(Self {
            client,
            endpoint_url: config.endpoint_url.clone(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, envelope: &RequestEnvelope) -> Result<Bytes, AdapterError> {
        let xml = envelope.to_xml()?;
        debug!(operation = %envelope.operation(), bytes = xml.len(), "posting envelope");

        let response = self
            .client
            .post(&self.endpoint_url)
            .form(&[(REQUEST_FIELD, xml.as_str())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AdapterError::UpstreamUnavailable(format!("request timed out: {}", e))
                } else {
                    AdapterError::UpstreamUnavailable(format!("network error: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::UpstreamUnavailable(format!(
                "backend answered with HTTP {}",
                status.as_u16()
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| AdapterError::UpstreamUnavailable(format!("cannot read body: {}", e)))
    }
}
