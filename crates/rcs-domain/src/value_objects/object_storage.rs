//! Object Storage Value Objects
//!
//! Containers hold objects; both carry user metadata transported as
//! `X-Container-Meta-*` / `X-Object-Meta-*` headers. Object names may contain
//! `/`, which listings can fold into pseudo-directories with a delimiter.

use crate::constants::{MAX_CONTAINER_NAME_LENGTH, MAX_OBJECT_NAME_LENGTH};
use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

// ============================================================================
// NAMES
// ============================================================================

/// Check a container name
///
/// Names are non-empty, at most 256 bytes and contain no `/`.
pub fn validate_container_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_argument("container name cannot be empty"));
    }
    if name.len() > MAX_CONTAINER_NAME_LENGTH {
        return Err(Error::invalid_argument(format!(
            "container name exceeds {MAX_CONTAINER_NAME_LENGTH} bytes"
        )));
    }
    if name.contains('/') {
        return Err(Error::invalid_argument(format!(
            "container name '{name}' cannot contain '/'"
        )));
    }
    Ok(())
}

/// Check an object name
///
/// Names are non-empty and at most 1024 bytes; `/` is allowed.
pub fn validate_object_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_argument("object name cannot be empty"));
    }
    if name.len() > MAX_OBJECT_NAME_LENGTH {
        return Err(Error::invalid_argument(format!(
            "object name exceeds {MAX_OBJECT_NAME_LENGTH} bytes"
        )));
    }
    Ok(())
}

// ============================================================================
// METADATA
// ============================================================================

/// User metadata with case-insensitive keys
///
/// HTTP headers do not preserve case, so keys are stored lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, String>);

impl Metadata {
    /// Empty metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value
    pub fn insert<K: AsRef<str>, V: Into<String>>(&mut self, key: K, value: V) -> Option<String> {
        self.0.insert(key.as_ref().to_ascii_lowercase(), value.into())
    }

    /// Builder-style insert
    #[must_use]
    pub fn with<K: AsRef<str>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.insert(key, value);
        self
    }

    /// Look up a value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(&key.to_ascii_lowercase()).map(String::as_str)
    }

    /// Remove a value
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(&key.to_ascii_lowercase())
    }

    /// Whether a key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(&key.to_ascii_lowercase())
    }

    /// Iterate over `(key, value)` pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Keys in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no entries
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy every entry of `other` over this one
    pub fn merge(&mut self, other: &Metadata) {
        for (k, v) in other.iter() {
            self.insert(k, v);
        }
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut metadata = Self::new();
        for (k, v) in iter {
            metadata.insert(k, v);
        }
        metadata
    }
}

// ============================================================================
// CONTAINERS AND OBJECTS
// ============================================================================

/// Container as returned by an account listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    /// Container name
    pub name: String,
    /// Number of objects
    #[serde(default)]
    pub count: u64,
    /// Total bytes stored
    #[serde(default)]
    pub bytes: u64,
}

/// Object (or pseudo-directory) as returned by a container listing
///
/// With a delimiter, folded prefixes come back as `{"subdir": "..."}`;
/// those entries only carry a name and report [`ContainerObject::is_directory`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerObject {
    /// Object name, or pseudo-directory prefix
    #[serde(alias = "subdir")]
    pub name: String,
    /// MD5 of the content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    /// Size in bytes
    #[serde(default)]
    pub bytes: u64,
    /// MIME type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Last modification time
    #[serde(
        default,
        deserialize_with = "deserialize_listing_time",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_modified: Option<DateTime<Utc>>,
}

impl ContainerObject {
    /// Pseudo-directory entry
    pub fn directory<S: Into<String>>(prefix: S) -> Self {
        Self {
            name: prefix.into(),
            hash: None,
            bytes: 0,
            content_type: None,
            last_modified: None,
        }
    }

    /// Whether this entry is a folded pseudo-directory
    pub fn is_directory(&self) -> bool {
        self.hash.is_none() && self.content_type.is_none() && self.last_modified.is_none()
    }
}

/// Listing timestamps have no zone suffix (`2024-05-01T12:00:00.123456`)
fn deserialize_listing_time<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Some(naive.and_utc()))
        .map_err(serde::de::Error::custom)
}

/// Filters of a container listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectListOptions {
    /// Only names starting with this prefix
    pub prefix: Option<String>,
    /// Fold names at this character into pseudo-directories
    pub delimiter: Option<char>,
}

impl ObjectListOptions {
    /// Listing restricted to `prefix`
    pub fn prefix<S: Into<String>>(prefix: S) -> Self {
        Self {
            prefix: Some(prefix.into()),
            delimiter: None,
        }
    }

    /// Same filters, folded at `delimiter`
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }
}

/// Outcome of creating a container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerCreated {
    /// The container was created (201)
    Created,
    /// A container with that name already existed (202)
    AlreadyExists,
}

/// Account-level headers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountHeaders {
    /// Number of containers
    pub container_count: u64,
    /// Number of objects
    pub object_count: u64,
    /// Total bytes stored
    pub bytes_used: u64,
    /// Account metadata (includes `temp-url-key` when set)
    pub metadata: Metadata,
}

/// Container-level headers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerHeaders {
    /// Number of objects
    pub object_count: u64,
    /// Total bytes stored
    pub bytes_used: u64,
    /// Container metadata
    pub metadata: Metadata,
}

/// Object-level headers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectHeaders {
    /// Size in bytes
    pub content_length: u64,
    /// MIME type
    pub content_type: Option<String>,
    /// MD5 of the content (MD5 of the segment ETags for manifests)
    pub etag: Option<String>,
    /// Last modification time
    pub last_modified: Option<DateTime<Utc>>,
    /// `container/prefix` of the segments when this is a large-object manifest
    pub object_manifest: Option<String>,
    /// When the object expires, if it was created with `delete_after`
    pub delete_at: Option<DateTime<Utc>>,
    /// Object metadata
    pub metadata: Metadata,
}

/// Options for creating an object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateObjectOptions {
    /// MIME type; the service guesses when absent
    pub content_type: Option<String>,
    /// Object metadata
    pub metadata: Metadata,
    /// Delete the object automatically after this long
    pub delete_after: Option<Duration>,
}

/// Object content together with its headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectContent {
    /// Object headers
    pub headers: ObjectHeaders,
    /// Object bytes
    pub data: bytes::Bytes,
}

// ============================================================================
// CDN
// ============================================================================

/// CDN settings of a container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CdnContainer {
    /// Container name
    pub name: String,
    /// Whether the container is published on the CDN
    pub cdn_enabled: bool,
    /// Edge cache TTL in seconds
    pub ttl: u32,
    /// Whether CDN access logs are kept
    #[serde(default)]
    pub log_retention: bool,
    /// HTTP URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cdn_uri: Option<String>,
    /// HTTPS URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cdn_ssl_uri: Option<String>,
    /// Streaming URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cdn_streaming_uri: Option<String>,
    /// iOS streaming URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cdn_ios_uri: Option<String>,
}

// ============================================================================
// BULK OPERATIONS
// ============================================================================

/// Per-item failure of a bulk operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkFailure {
    /// `container/object` path that failed
    pub path: String,
    /// Status line reported for it
    pub status: String,
}

/// Response of a bulk delete
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkDeleteResult {
    /// Items removed
    pub deleted: u64,
    /// Items that did not exist
    pub not_found: u64,
    /// Items that could not be removed
    pub errors: Vec<BulkFailure>,
}

impl BulkDeleteResult {
    /// Whether every item was removed or already gone
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Response of an archive extraction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractArchiveResult {
    /// Files created from the archive
    pub files_created: u64,
    /// Files that could not be created
    pub errors: Vec<BulkFailure>,
}

/// Archive format accepted by extract-archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    /// Plain tar
    Tar,
    /// Gzip-compressed tar
    TarGz,
    /// Bzip2-compressed tar
    TarBz2,
}

impl ArchiveFormat {
    /// Value of the `extract-archive` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tar => "tar",
            Self::TarGz => "tar.gz",
            Self::TarBz2 => "tar.bz2",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// TEMP URLS
// ============================================================================

/// Method a temp URL grants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TempUrlMethod {
    /// Download
    Get,
    /// Upload
    Put,
}

impl TempUrlMethod {
    /// HTTP method name as signed
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
        }
    }
}

impl fmt::Display for TempUrlMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HMAC digest used to sign temp URLs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TempUrlDigest {
    /// HMAC-SHA-256
    #[default]
    Sha256,
    /// HMAC-SHA-512
    Sha512,
}

/// Temp URL request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempUrlRequest {
    /// Container name
    pub container: String,
    /// Object name
    pub object: String,
    /// Granted method
    pub method: TempUrlMethod,
    /// Validity window from now
    pub expires_in: Duration,
    /// Digest to sign with
    pub digest: TempUrlDigest,
}

impl TempUrlRequest {
    /// GET temp URL for `container/object` valid for `expires_in`
    pub fn get<C: Into<String>, O: Into<String>>(container: C, object: O, expires_in: Duration) -> Self {
        Self {
            container: container.into(),
            object: object.into(),
            method: TempUrlMethod::Get,
            expires_in,
            digest: TempUrlDigest::default(),
        }
    }
}
