//! HTTP client for the records API.
//!
//! Wraps a shared [`reqwest::Client`], injecting the bearer token when one is
//! stored and unwrapping the `{code, message, data}` envelope the backend
//! puts around every payload. Failure presentation is centralized here: each
//! failed call emits exactly one notification and returns a typed
//! [`ApiError`], so callers handle logic without duplicating toasts.
//!
//! Calls are single-attempt: no retries, no timeout, no cancellation.

pub mod error;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;
use crate::notify::NotificationBus;
use crate::session::token::TokenStore;

pub use error::{ApiError, Result};

/// Envelope code denoting success.
pub const SUCCESS_CODE: i64 = 200;

/// The outer JSON wrapper around every API response.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Payload of `GET /health`.
#[derive(Debug, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// Error bodies are not always envelopes; only the message is of interest.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Clone)]
pub struct HttpClient {
    base_url: String,
    http: reqwest::Client,
    token: TokenStore,
    notify: NotificationBus,
}

impl HttpClient {
    pub fn new(config: &ApiConfig, token: TokenStore, notify: NotificationBus) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            token,
            notify,
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.request::<(), T>(Method::GET, endpoint, None, &[]).await
    }

    pub async fn get_query<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        self.request::<(), T>(Method::GET, endpoint, None, query)
            .await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        self.request(Method::POST, endpoint, Some(body), &[]).await
    }

    /// POST without a request body (logout, refresh).
    pub async fn post_empty<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.request::<(), T>(Method::POST, endpoint, None, &[])
            .await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        self.request(Method::PUT, endpoint, Some(body), &[]).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.request::<(), T>(Method::DELETE, endpoint, None, &[])
            .await
    }

    /// Backend health probe.
    pub async fn status(&self) -> Result<HealthStatus> {
        self.get("/health").await
    }

    async fn request<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);

        let mut req = self
            .http
            .request(method, &url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = self.token.get() {
            req = req.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let response = match req.send().await {
            Ok(response) => response,
            Err(e) => {
                self.notify.error("Network request failed");
                return Err(ApiError::Network(e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            self.notify.error(&message);
            return Err(ApiError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let raw = match response.text().await {
            Ok(raw) => raw,
            Err(e) => {
                self.notify.error("Network request failed");
                return Err(ApiError::Network(e));
            }
        };

        let envelope: Envelope = match serde_json::from_str(&raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                self.notify.error("Invalid response from server");
                return Err(ApiError::Decode(e));
            }
        };

        if envelope.code != SUCCESS_CODE {
            let message = if envelope.message.is_empty() {
                format!("Request failed with code {}", envelope.code)
            } else {
                envelope.message
            };
            self.notify.warning(&message);
            return Err(ApiError::Api {
                code: envelope.code,
                message,
            });
        }

        match serde_json::from_value(envelope.data) {
            Ok(data) => Ok(data),
            Err(e) => {
                self.notify.error("Invalid response from server");
                Err(ApiError::Decode(e))
            }
        }
    }
}
