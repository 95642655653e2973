//! Trends HTTP Client
//!
//! Posts the report form to `/get_trends` and decodes the JSON reply.

use async_trait::async_trait;
use reqwest::multipart::Form;
use reqwest::Client;
use std::time::Duration;

use super::error::{ReportError, ReportResult};
use super::source::TrendsSource;
use super::types::{TrendsRequest, TrendsResponse};
use crate::config::ClientConfig;

/// HTTP client for the trends endpoint
pub struct TrendsClient {
    client: Client,
    url: String,
}

impl TrendsClient {
    /// Create a client for the endpoint described by `config`
    pub fn new(config: &ClientConfig) -> ReportResult<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            url: config.endpoint_url(),
        })
    }

    /// Full URL requests are sent to
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Build the multipart body a browser `FormData` would send
    fn form(request: &TrendsRequest) -> Form {
        request
            .fields()
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value))
    }
}

#[async_trait]
impl TrendsSource for TrendsClient {
    async fn fetch_trends(&self, request: &TrendsRequest) -> ReportResult<TrendsResponse> {
        tracing::debug!(
            url = %self.url,
            data_type = %request.granularity,
            "Requesting trends"
        );

        let response = self
            .client
            .post(&self.url)
            .multipart(Self::form(request))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ReportError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let trends = TrendsResponse::from_json(&body)?;
        tracing::debug!(points = trends.len(), "Trends received");

        Ok(trends)
    }
}
