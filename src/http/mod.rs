//! The request pipeline every API call goes through.
//!
//! Outgoing requests pass through the registered [`RequestStage`]s in order.
//! Failed responses are classified into an [`ApiError`] exactly once, after
//! the matching side effects have been reported to the [`PipelineListener`].

pub mod listener;
pub mod stage;

pub use listener::{PipelineListener, SilentListener};
pub use stage::{AuthStage, RequestStage};

use crate::core::config::ApiConfig;
use crate::core::error::{ApiError, ErrorBody, ErrorDetails};
use crate::session::SessionManager;
use anyhow::{Context, Result};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

pub const SIGN_IN_ROUTE: &str = "/signin";

pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";
pub const FORBIDDEN_MESSAGE: &str = "You do not have permission to perform this action.";
pub const NOT_FOUND_MESSAGE: &str = "The requested resource was not found.";
pub const SERVER_ERROR_MESSAGE: &str = "Server error. Please try again later.";
pub const SERVICE_UNAVAILABLE_MESSAGE: &str =
    "Service is temporarily unavailable. Please try again later.";
pub const REQUEST_FAILED_MESSAGE: &str = "Request failed";

const USER_AGENT: &str = concat!("maglo/", env!("CARGO_PKG_VERSION"));

pub struct ApiClient {
    client: Client,
    base_url: String,
    stages: Vec<Box<dyn RequestStage>>,
    session: Arc<SessionManager>,
    listener: Arc<dyn PipelineListener>,
}

impl ApiClient {
    /// Builds a client with the bearer token stage installed.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        session: Arc<SessionManager>,
        listener: Arc<dyn PipelineListener>,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            stages: vec![Box::new(AuthStage::new(Arc::clone(&session)))],
            session,
            listener,
        })
    }

    pub fn from_config(
        config: &ApiConfig,
        session: Arc<SessionManager>,
        listener: Arc<dyn PipelineListener>,
    ) -> Result<Self> {
        Self::new(&config.base_url, config.timeout(), session, listener)
    }

    /// Appends a stage that runs after the ones already registered.
    pub fn with_stage(mut self, stage: impl RequestStage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.get_with_query(path, &[]).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let request = self.client.get(self.url(path, query));
        let response = self.execute(Method::GET, path, request).await?;
        self.decode(response).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.client.post(self.url(path, &[])).json(body);
        let response = self.execute(Method::POST, path, request).await?;
        self.decode(response).await
    }

    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.client.post(self.url(path, &[]));
        let response = self.execute(Method::POST, path, request).await?;
        self.decode(response).await
    }

    /// Posts without a body and ignores whatever the server answers with.
    pub async fn post_discarding(&self, path: &str) -> Result<(), ApiError> {
        let request = self.client.post(self.url(path, &[]));
        self.execute(Method::POST, path, request).await.map(|_| ())
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> String {
        let url = format!("{}{}", self.base_url, path);
        if query.is_empty() {
            return url;
        }
        // An unparseable base URL is reported by reqwest when the request is sent
        match Url::parse(&url) {
            Ok(mut parsed) => {
                parsed
                    .query_pairs_mut()
                    .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
                parsed.to_string()
            }
            Err(_) => url,
        }
    }

    #[instrument(name = "ApiRequest", skip_all, fields(method = %method, path = %path))]
    async fn execute(
        &self,
        method: Method,
        path: &str,
        mut request: RequestBuilder,
    ) -> Result<Response, ApiError> {
        let authenticated = self.session.is_authenticated().await;
        for stage in &self.stages {
            request = stage.apply(request).await;
        }

        debug!("Sending request");
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Request did not reach the server");
                let error = ApiError::network(NETWORK_ERROR_MESSAGE);
                self.listener.notify(error.message());
                return Err(error);
            }
        };

        let status = response.status();
        debug!(status = status.as_u16(), "Received response");
        if status.is_success() {
            return Ok(response);
        }
        Err(self.reject(status, response, authenticated).await)
    }

    /// Performs the side effects for a failed response and builds its error.
    async fn reject(&self, status: StatusCode, response: Response, authenticated: bool) -> ApiError {
        let body: ErrorBody = match response.bytes().await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
            Err(e) => {
                debug!(error = %e, "Failed to read error body");
                ErrorBody::default()
            }
        };
        let body_message = body.message.filter(|m| !m.trim().is_empty());

        match status {
            // Concurrent rejections of one session redirect only once
            StatusCode::UNAUTHORIZED => {
                let expired = self.session.expire().await;
                if expired || !authenticated {
                    info!("Request rejected as unauthorized, redirecting to sign in");
                    self.listener.navigate(SIGN_IN_ROUTE);
                }
                self.listener.notify(SESSION_EXPIRED_MESSAGE);
            }
            StatusCode::FORBIDDEN => self.listener.notify(FORBIDDEN_MESSAGE),
            StatusCode::NOT_FOUND => self.listener.notify(NOT_FOUND_MESSAGE),
            StatusCode::INTERNAL_SERVER_ERROR => self.listener.notify(SERVER_ERROR_MESSAGE),
            StatusCode::SERVICE_UNAVAILABLE => self.listener.notify(SERVICE_UNAVAILABLE_MESSAGE),
            _ => {
                if let Some(message) = &body_message {
                    self.listener.notify(message);
                }
            }
        }

        let message = body_message.unwrap_or_else(|| status_message(status));
        let error = ApiError::from_status(
            status.as_u16(),
            ErrorDetails {
                message,
                code: body.code,
                errors: body.errors,
            },
        );
        warn!(status = status.as_u16(), error = %error, "Request failed");
        error
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T, ApiError> {
        let status = response.status().as_u16();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "Connection dropped while reading the response");
                let error = ApiError::network(NETWORK_ERROR_MESSAGE);
                self.listener.notify(error.message());
                return Err(error);
            }
        };
        serde_json::from_slice(&bytes).map_err(|e| {
            warn!(error = %e, "Response body did not match the expected shape");
            ApiError::Unknown { status }
        })
    }
}

/// Fallback message for a failed response without a body message.
fn status_message(status: StatusCode) -> String {
    format!("{REQUEST_FAILED_MESSAGE} with status code {}", status.as_u16())
}
