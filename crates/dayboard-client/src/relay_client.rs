//! HTTP client for the dayboard relay.

use std::time::Duration;

use dayboard_protocol::{
    EVENTS_PATH, EventsResponse, REFRESH_PATH, RefreshStatus, RelayResponse, STATUS_PATH,
    TOKEN_PATH, TokenRequest,
};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{ClientError, ClientResult};

/// Client for the relay's `/api/calendar` routes.
#[derive(Debug, Clone)]
pub struct RelayClient {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl RelayClient {
    /// Creates a client for the relay at `base_url`. Every call is bounded
    /// by `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {}", e)))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http,
            base_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Reads the cached events.
    pub async fn events(&self) -> ClientResult<EventsResponse> {
        let response = self.send(self.http.get(self.url(EVENTS_PATH))).await?;
        Self::decode(Self::check_status(response)?).await
    }

    /// Hands `token` to the relay and returns its verdict.
    ///
    /// A 400 is returned as a body with `success: false`, not as an error.
    pub async fn submit_token(&self, token: &str) -> ClientResult<RelayResponse> {
        let response = self
            .send(
                self.http
                    .post(self.url(TOKEN_PATH))
                    .json(&TokenRequest::new(token)),
            )
            .await?;
        Self::decode(response).await
    }

    /// Forces a refresh.
    pub async fn refresh(&self) -> ClientResult<RelayResponse> {
        let response = self.send(self.http.post(self.url(REFRESH_PATH))).await?;
        Self::decode(response).await
    }

    /// Reads the refresh bookkeeping.
    pub async fn status(&self) -> ClientResult<RefreshStatus> {
        let response = self.send(self.http.get(self.url(STATUS_PATH))).await?;
        Self::decode(Self::check_status(response)?).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> ClientResult<Response> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Relay(format!(
                    "{} did not answer within {}s",
                    self.base_url,
                    self.timeout.as_secs()
                ))
            } else {
                ClientError::Relay(format!("failed to reach {}: {}", self.base_url, e))
            }
        })?;
        debug!(status = %response.status(), url = %response.url(), "relay answered");
        Ok(response)
    }

    fn check_status(response: Response) -> ClientResult<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(ClientError::Relay(format!(
                "relay returned {}",
                response.status()
            )))
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        response
            .json()
            .await
            .map_err(|e| ClientError::Relay(format!("unexpected relay response: {}", e)))
    }
}
