//! TriMet web services client
//!
//! Every operation is a single GET: the request object is serialized into the
//! query string next to `appID` and `json=true`, and the `resultSet` of the
//! JSON answer is decoded into the endpoint's response type.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, Request, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::TrimetConfig;
use crate::error::TrimetError;
use crate::request::{
    ArrivalsRequest, DetoursRequest, Endpoint, RouteConfigRequest, StopsRequest, Validate,
};
use crate::response::{
    ArrivalsResponse, DetoursResponse, Envelope, RouteConfigResponse, StopsResponse,
    error_message_from_body,
};

/// Media type requested from the service
pub const MEDIA_TYPE: &str = "application/json";

/// Trait for TriMet web service clients
#[async_trait]
pub trait TrimetClient: Send + Sync {
    /// Next arrivals at the requested stops
    async fn arrivals(&self, request: &ArrivalsRequest) -> Result<ArrivalsResponse, TrimetError>;

    /// Detours in effect, optionally limited to some routes
    async fn detours(&self, request: &DetoursRequest) -> Result<DetoursResponse, TrimetError>;

    /// Routes with their directions and stops
    async fn route_config(
        &self,
        request: &RouteConfigRequest,
    ) -> Result<RouteConfigResponse, TrimetError>;

    /// Stops within an area
    async fn stops(&self, request: &StopsRequest) -> Result<StopsResponse, TrimetError>;

    /// Check if the service is reachable
    async fn is_healthy(&self) -> bool;
}

/// TriMet client over HTTP
#[derive(Debug, Clone)]
pub struct HttpTrimetClient {
    client: Client,
    base_url: Url,
    config: TrimetConfig,
}

impl HttpTrimetClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be initialized.
    pub fn new(config: &TrimetConfig) -> Result<Self, TrimetError> {
        config.validate()?;
        let base_url = config.parsed_base_url()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| TrimetError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            config: config.clone(),
        })
    }

    /// Base URL endpoints are resolved against
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub const fn config(&self) -> &TrimetConfig {
        &self.config
    }

    /// Build a GET request for `endpoint`
    ///
    /// The endpoint is resolved relative to the base URL and must not start
    /// with a slash. `params` is appended to the query after `appID` and
    /// `json=true`.
    ///
    /// # Errors
    ///
    /// Returns [`TrimetError::InvalidRequest`] for an absolute endpoint and
    /// [`TrimetError::RequestFailed`] if the URL or query cannot be built.
    pub fn new_request<Q>(&self, endpoint: &str, params: &Q) -> Result<Request, TrimetError>
    where
        Q: Serialize + ?Sized,
    {
        if endpoint.starts_with('/') {
            return Err(TrimetError::InvalidRequest(format!(
                "endpoint '{endpoint}' must be relative to the base URL"
            )));
        }

        let url = self.base_url.join(endpoint).map_err(|e| {
            TrimetError::RequestFailed(format!("invalid endpoint '{endpoint}': {e}"))
        })?;

        self.client
            .get(url)
            .header(ACCEPT, MEDIA_TYPE)
            .header(USER_AGENT, self.config.user_agent.as_str())
            .query(&[("appID", self.config.app_id.as_str()), ("json", "true")])
            .query(params)
            .build()
            .map_err(|e| TrimetError::RequestFailed(e.without_url().to_string()))
    }

    /// Send a request and decode the `resultSet` of its answer into `T`
    ///
    /// # Errors
    ///
    /// Returns a transport error, [`TrimetError::Api`] for error statuses or
    /// reported service errors, and [`TrimetError::ParseError`] for bodies
    /// that do not decode.
    pub async fn execute<T>(&self, request: Request) -> Result<T, TrimetError>
    where
        T: DeserializeOwned,
    {
        let method = request.method().to_string();
        let url = redacted(request.url());

        debug!(%method, %url, "Sending TriMet request");

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| self.transport_error(e, &url))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(TrimetError::RateLimitExceeded {
                retry_after_secs: response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok()),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| TrimetError::ParseError(e.to_string()))?;

        Self::check_response(status, &method, &url, &body)?;
        Self::decode(status, &method, &url, &body)
    }

    /// Generic GET: build the request for `endpoint`, send it and decode
    ///
    /// # Errors
    ///
    /// See [`Self::new_request`] and [`Self::execute`].
    pub async fn get<Q, T>(&self, endpoint: &str, params: &Q) -> Result<T, TrimetError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.new_request(endpoint, params)?;
        self.execute(request).await
    }

    /// Validate a typed request and send it to its endpoint
    ///
    /// # Errors
    ///
    /// Returns [`TrimetError::InvalidRequest`] without any network I/O if
    /// validation fails, otherwise see [`Self::get`].
    pub async fn send<R>(&self, request: &R) -> Result<R::Response, TrimetError>
    where
        R: Endpoint + Validate + Serialize + Sync,
    {
        request.validate()?;
        self.get(R::ENDPOINT, request).await
    }

    /// Turn a non-2xx status into [`TrimetError::Api`]
    ///
    /// The message is the content of the service's `errorMessage` when the
    /// body carries one; any other body is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`TrimetError::Api`] for statuses outside 200..=299.
    pub fn check_response(
        status: StatusCode,
        method: &str,
        url: &str,
        body: &str,
    ) -> Result<(), TrimetError> {
        if status.is_success() {
            return Ok(());
        }

        let message = error_message_from_body(body);
        warn!(%method, %url, status = status.as_u16(), %message, "TriMet request failed");

        Err(TrimetError::Api {
            method: method.to_string(),
            url: url.to_string(),
            status: status.as_u16(),
            message,
        })
    }

    fn decode<T>(status: StatusCode, method: &str, url: &str, body: &str) -> Result<T, TrimetError>
    where
        T: DeserializeOwned,
    {
        let envelope: Envelope<T> =
            serde_json::from_str(body).map_err(|e| TrimetError::ParseError(e.to_string()))?;

        envelope.result_set.into_result().map_err(|message| {
            warn!(%method, %url, %message, "TriMet reported an error");
            TrimetError::Api {
                method: method.to_string(),
                url: url.to_string(),
                status: status.as_u16(),
                message,
            }
        })
    }

    /// reqwest puts the full URL, app id included, into its error text
    fn transport_error(&self, error: reqwest::Error, url: &str) -> TrimetError {
        if error.is_timeout() {
            return TrimetError::Timeout {
                timeout_secs: self.config.timeout_secs,
            };
        }

        let error = error.without_url();
        let message = match std::error::Error::source(&error) {
            Some(source) => format!("{error} for {url}: {source}"),
            None => format!("{error} for {url}"),
        };
        TrimetError::ConnectionFailed(message)
    }
}

#[async_trait]
impl TrimetClient for HttpTrimetClient {
    #[instrument(skip(self))]
    async fn arrivals(&self, request: &ArrivalsRequest) -> Result<ArrivalsResponse, TrimetError> {
        let response = self.send(request).await?;
        debug!(count = response.arrivals.len(), "Arrivals found");
        Ok(response)
    }

    #[instrument(skip(self))]
    async fn detours(&self, request: &DetoursRequest) -> Result<DetoursResponse, TrimetError> {
        let response = self.send(request).await?;
        debug!(count = response.detours.len(), "Detours found");
        Ok(response)
    }

    #[instrument(skip(self))]
    async fn route_config(
        &self,
        request: &RouteConfigRequest,
    ) -> Result<RouteConfigResponse, TrimetError> {
        let response = self.send(request).await?;
        debug!(count = response.routes.len(), "Routes found");
        Ok(response)
    }

    #[instrument(skip(self))]
    async fn stops(&self, request: &StopsRequest) -> Result<StopsResponse, TrimetError> {
        let response = self.send(request).await?;
        if response.locations.is_empty() {
            warn!("No stops found");
        }
        debug!(count = response.locations.len(), "Stops found");
        Ok(response)
    }

    async fn is_healthy(&self) -> bool {
        self.client.get(self.base_url.clone()).send().await.is_ok()
    }
}

/// URL without its query, so the app id never reaches logs or errors
fn redacted(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}
