//! Forwarding analysis lines to the remote work endpoint.

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header;
use thiserror::Error;

/// Errors that can occur while posting an analysis line.
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// The HTTP request failed.
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The endpoint answered with a non-success status.
    #[error("Unexpected status: {0}")]
    Status(reqwest::StatusCode),
}

/// Delivery coordinates for one unit of analysis work.
#[derive(Debug, Clone)]
pub struct WorkEndpoint {
    host: String,
    work_id: String,
    token: String,
}

impl WorkEndpoint {
    pub fn new(host: &str, work_id: &str, token: &str) -> Self {
        Self {
            host: host.to_string(),
            work_id: work_id.to_string(),
            token: token.to_string(),
        }
    }

    /// The endpoint URL: `{host}/api/external-engine/work/{work_id}`.
    pub fn url(&self) -> String {
        format!("{}/api/external-engine/work/{}", self.host, self.work_id)
    }

    /// Builds the POST for one analysis line: bearer auth, `text/plain`
    /// content type, the line as the body.
    fn request(&self, client: &Client, line: &str) -> RequestBuilder {
        client
            .post(self.url())
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .header(header::CONTENT_TYPE, "text/plain")
            .body(line.to_string())
    }

    /// Posts one analysis line as the plain-text request body.
    pub fn post_line(&self, client: &Client, line: &str) -> Result<(), DeliveryError> {
        let response = self.request(client, line).send()?;

        if !response.status().is_success() {
            return Err(DeliveryError::Status(response.status()));
        }

        tracing::info!("Delivered analysis line for work {}", self.work_id);
        Ok(())
    }
}
