use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::debug;

use crate::error::TransportError;
use crate::token::TokenProvider;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Authenticated JSON POST against the CRM API. `path` is relative to the
/// API base, e.g. `quotations.create`.
#[async_trait]
pub trait AuthenticatedPost: Send + Sync {
    async fn post_json(&self, path: &str, body: &Value) -> Result<HttpResponse, TransportError>;
}

pub fn build_client(timeout_secs: u64) -> Result<Client, TransportError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|error| TransportError::Client(error.to_string()))
}

pub struct TeamleaderTransport<P> {
    client: Client,
    api_base: String,
    tokens: P,
}

impl<P> TeamleaderTransport<P> {
    pub fn new(client: Client, api_base: impl Into<String>, tokens: P) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self { client, api_base, tokens }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl<P: TokenProvider> AuthenticatedPost for TeamleaderTransport<P> {
    async fn post_json(&self, path: &str, body: &Value) -> Result<HttpResponse, TransportError> {
        let access_token = self.tokens.access_token().await?;
        let url = self.endpoint(path);

        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|error| request_error(&url, error))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|error| request_error(&url, error))?;

        debug!(event_name = "crm.http.response", url = %url, status, "crm responded");
        Ok(HttpResponse { status, body })
    }
}

fn request_error(url: &str, error: reqwest::Error) -> TransportError {
    TransportError::Request { url: url.to_string(), message: error.to_string() }
}
