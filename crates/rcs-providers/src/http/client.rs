//! Authenticated REST client
//!
//! One `RestClient` talks to one service endpoint. Every request carries the
//! identity provider's current token; a 401 invalidates the token and the
//! request is sent once more with a fresh one. Idempotent requests are
//! retried on transient failures (transport errors, 5xx, throttling).

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, LOCATION};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use rcs_domain::error::{Error, Result};
use rcs_domain::ports::SharedIdentityProvider;

use crate::constants::{CONTENT_TYPE_JSON, HEADER_AUTH_TOKEN};
use crate::http::{HttpClientConfig, RestRequest, RetryPolicy};
use crate::utils::HttpResponseUtils;

/// Successful response
#[derive(Debug, Clone)]
pub struct RestResponse {
    /// Status code (always 2xx)
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: Bytes,
}

impl RestResponse {
    /// Deserialize the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Deserialize the value under `key` of a JSON envelope
    pub fn json_field<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let mut value: serde_json::Value = self.json()?;
        let field = value
            .get_mut(key)
            .map(serde_json::Value::take)
            .ok_or_else(|| Error::internal(format!("response has no '{key}' field")))?;
        Ok(serde_json::from_value(field)?)
    }

    /// Like [`Self::json_field`], but an absent or `null` field is `None`
    pub fn json_field_opt<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let mut value: serde_json::Value = self.json()?;
        match value.get_mut(key).map(serde_json::Value::take) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(field) => Ok(Some(serde_json::from_value(field)?)),
        }
    }

    /// Read a header as a string
    pub fn header(&self, name: &str) -> Option<&str> {
        HttpResponseUtils::header_str(&self.headers, name)
    }

    /// Identifier of a created resource: last segment of `Location`
    pub fn created_id(&self) -> Option<String> {
        self.header("X-Object-ID")
            .map(str::to_string)
            .or_else(|| {
                let location = self.headers.get(LOCATION)?.to_str().ok()?;
                location
                    .trim_end_matches('/')
                    .rsplit('/')
                    .next()
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            })
    }
}

/// REST client bound to one service endpoint
#[derive(Clone)]
pub struct RestClient {
    http: Client,
    identity: SharedIdentityProvider,
    base_url: Url,
    retry: RetryPolicy,
    service: &'static str,
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("service", &self.service)
            .field("base_url", &self.base_url.as_str())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl RestClient {
    /// Create a client for the service at `base_url`
    ///
    /// # Arguments
    /// * `service` - Short service name used in logs (e.g. "object_storage")
    /// * `base_url` - Endpoint resolved from the service catalog
    /// * `identity` - Token source
    /// * `config` - Timeouts, user agent and retry policy
    pub fn new(
        service: &'static str,
        base_url: &str,
        identity: SharedIdentityProvider,
        config: &HttpClientConfig,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            Error::configuration_with_source(format!("invalid {service} endpoint '{base_url}'"), e)
        })?;
        if base_url.cannot_be_a_base() {
            return Err(Error::config(format!(
                "{service} endpoint '{base_url}' cannot carry a path"
            )));
        }
        Ok(Self {
            http: config.build_client()?,
            identity,
            base_url,
            retry: config.retry,
            service,
        })
    }

    /// Resolve the endpoint through the identity provider, then create the client
    pub async fn from_catalog(
        service: &'static str,
        service_type: &str,
        region: Option<&str>,
        internal: bool,
        identity: SharedIdentityProvider,
        config: &HttpClientConfig,
    ) -> Result<Self> {
        let base_url = identity.endpoint(service_type, region, internal).await?;
        tracing::debug!(service, %base_url, "resolved service endpoint");
        Self::new(service, &base_url, identity, config)
    }

    /// Base URL of the service
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL of a request
    pub fn url_for(&self, request: &RestRequest) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| Error::config(format!("{} endpoint cannot carry a path", self.service)))?;
            path.pop_if_empty();
            path.extend(request.segments.iter().map(String::as_str));
        }
        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &request.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Send a request and return the successful response
    ///
    /// # Errors
    ///
    /// Non-success statuses are mapped by [`HttpResponseUtils::error_for_status`];
    /// transport failures become `Error::Network`.
    pub async fn send(&self, request: RestRequest) -> Result<RestResponse> {
        let url = self.url_for(&request)?;
        let description = request.describe();
        let mut attempt: u32 = 0;
        let mut reauthenticated = false;

        loop {
            let token = self.identity.token().await?;
            let mut builder = self
                .http
                .request(request.method.clone(), url.clone())
                .header(HEADER_AUTH_TOKEN, token.id.as_str())
                .header(ACCEPT, CONTENT_TYPE_JSON);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(content_type) = &request.content_type {
                builder = builder.header(CONTENT_TYPE, content_type.as_str());
            }
            if let Some(body) = &request.body {
                builder = builder.body(body.clone());
            }

            tracing::trace!(service = self.service, request = %description, attempt, "sending");
            let failure = match builder.send().await {
                Ok(response) => {
                    let status = response.status();
                    let headers = response.headers().clone();

                    if status == StatusCode::UNAUTHORIZED && !reauthenticated {
                        tracing::info!(
                            service = self.service,
                            request = %description,
                            "token rejected, re-authenticating"
                        );
                        self.identity.invalidate().await;
                        reauthenticated = true;
                        continue;
                    }

                    let body = response.bytes().await.map_err(|e| {
                        Error::network_with_source(format!("reading body of {description}"), e)
                    })?;

                    if status.is_success() {
                        tracing::debug!(
                            service = self.service,
                            request = %description,
                            status = status.as_u16(),
                            "request completed"
                        );
                        return Ok(RestResponse {
                            status,
                            headers,
                            body,
                        });
                    }

                    HttpResponseUtils::error_for_status(
                        status,
                        &headers,
                        &String::from_utf8_lossy(&body),
                        &description,
                    )
                }
                Err(e) => Error::network_with_source(format!("{description} failed"), e),
            };

            if request.is_idempotent() && failure.is_transient() && attempt < self.retry.max_retries
            {
                let delay = self.delay_for(&failure, attempt);
                tracing::warn!(
                    service = self.service,
                    request = %description,
                    attempt,
                    ?delay,
                    error = %failure,
                    "transient failure, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            tracing::debug!(
                service = self.service,
                request = %description,
                error = %failure,
                "request failed"
            );
            return Err(failure);
        }
    }

    /// Send a request and deserialize its JSON body
    pub async fn send_json<T: DeserializeOwned>(&self, request: RestRequest) -> Result<T> {
        self.send(request).await?.json()
    }

    /// Send a request and deserialize the value under `key` of its JSON body
    pub async fn send_field<T: DeserializeOwned>(&self, request: RestRequest, key: &str) -> Result<T> {
        self.send(request).await?.json_field(key)
    }

    /// Send a request and discard its body
    pub async fn send_empty(&self, request: RestRequest) -> Result<()> {
        self.send(request).await.map(|_| ())
    }

    fn delay_for(&self, failure: &Error, attempt: u32) -> Duration {
        match failure {
            Error::RateLimited {
                retry_after: Some(retry_after),
                ..
            } => (*retry_after).min(self.retry.max_backoff),
            _ => self.retry.backoff(attempt),
        }
    }
}
