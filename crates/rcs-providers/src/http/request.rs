//! REST request description
//!
//! A request is described relative to a service's base URL: path segments
//! are percent-encoded one by one, so names containing spaces, `?` or `#`
//! cannot escape their segment.

use bytes::Bytes;
use reqwest::Method;
use serde::Serialize;

use rcs_domain::error::Result;
use rcs_domain::pagination::PageRequest;

use crate::constants::CONTENT_TYPE_JSON;

/// One REST call relative to a service base URL
#[derive(Debug, Clone)]
pub struct RestRequest {
    pub(crate) method: Method,
    pub(crate) segments: Vec<String>,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Option<Bytes>,
    pub(crate) content_type: Option<String>,
}

impl RestRequest {
    /// Request with an explicit method
    pub fn new<I, S>(method: Method, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            segments: segments.into_iter().map(Into::into).collect(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            content_type: None,
        }
    }

    /// GET request
    pub fn get<I: IntoIterator<Item = S>, S: Into<String>>(segments: I) -> Self {
        Self::new(Method::GET, segments)
    }

    /// HEAD request
    pub fn head<I: IntoIterator<Item = S>, S: Into<String>>(segments: I) -> Self {
        Self::new(Method::HEAD, segments)
    }

    /// POST request
    pub fn post<I: IntoIterator<Item = S>, S: Into<String>>(segments: I) -> Self {
        Self::new(Method::POST, segments)
    }

    /// PUT request
    pub fn put<I: IntoIterator<Item = S>, S: Into<String>>(segments: I) -> Self {
        Self::new(Method::PUT, segments)
    }

    /// DELETE request
    pub fn delete<I: IntoIterator<Item = S>, S: Into<String>>(segments: I) -> Self {
        Self::new(Method::DELETE, segments)
    }

    /// Append path segments (`a/b` style names are split on `/`)
    #[must_use]
    pub fn path(mut self, name: &str) -> Self {
        self.segments.extend(name.split('/').map(str::to_string));
        self
    }

    /// Append a query parameter
    #[must_use]
    pub fn query<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append a query parameter when a value is present
    #[must_use]
    pub fn query_opt<K: Into<String>, V: ToString>(self, key: K, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Append `marker` and `limit` of a page request
    #[must_use]
    pub fn page(self, page: &PageRequest) -> Self {
        self.query_opt("limit", page.limit)
            .query_opt("marker", page.marker.as_deref())
    }

    /// Add a request header
    #[must_use]
    pub fn header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set a JSON body
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Some(Bytes::from(serde_json::to_vec(body)?));
        self.content_type = Some(CONTENT_TYPE_JSON.to_string());
        Ok(self)
    }

    /// Set a raw body
    #[must_use]
    pub fn body<B: Into<Bytes>>(mut self, body: B, content_type: Option<&str>) -> Self {
        self.body = Some(body.into());
        self.content_type = content_type.map(str::to_string);
        self
    }

    /// HTTP method
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Whether repeating the request cannot change the outcome
    pub fn is_idempotent(&self) -> bool {
        matches!(
            self.method,
            Method::GET | Method::HEAD | Method::PUT | Method::DELETE | Method::OPTIONS
        )
    }

    /// Human-readable `METHOD /path` used in logs and errors
    pub fn describe(&self) -> String {
        format!("{} /{}", self.method, self.segments.join("/"))
    }
}
