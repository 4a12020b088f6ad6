//! Cloud Files (OpenStack Swift) provider
//!
//! Storage calls go to the `object-store` endpoint; CDN management has its
//! own `rax:object-cdn` endpoint, which is optional in the catalog. User
//! metadata travels as `X-{Account,Container,Object}-Meta-*` headers.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::Url;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, ETAG, HeaderMap, LAST_MODIFIED};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use rcs_domain::constants::{
    SERVICE_TYPE_OBJECT_CDN, SERVICE_TYPE_OBJECT_STORE, TEMP_URL_KEY_METADATA,
};
use rcs_domain::error::{Error, Result};
use rcs_domain::pagination::{Page, PageRequest};
use rcs_domain::ports::{ObjectStorageProvider, SharedIdentityProvider};
use rcs_domain::value_objects::{
    AccountHeaders, ArchiveFormat, BulkDeleteResult, BulkFailure, CdnContainer, Container,
    ContainerCreated, ContainerHeaders, ContainerObject, CreateObjectOptions,
    ExtractArchiveResult, Metadata, ObjectContent, ObjectHeaders, ObjectListOptions,
    TempUrlRequest, validate_container_name, validate_object_name,
};

use crate::constants::{
    BULK_DELETE_MAX_PATHS, CONTENT_TYPE_TEXT, HEADER_ACCOUNT_META_PREFIX, HEADER_CONTAINER_META_PREFIX,
    HEADER_COPY_FROM, HEADER_DELETE_AFTER, HEADER_DELETE_AT, HEADER_OBJECT_MANIFEST, HEADER_OBJECT_META_PREFIX,
    HEADER_PURGE_EMAIL, HEADER_REMOVE_CONTAINER_META_PREFIX,
};
use crate::http::{HttpClientConfig, RestClient, RestRequest, RestResponse};
use crate::object_storage::temp_url::TempUrlSigner;
use crate::utils::HttpResponseUtils;

/// User metadata carried by headers starting with `prefix`
fn metadata_from(headers: &HeaderMap, prefix: &str) -> Metadata {
    headers
        .iter()
        .filter_map(|(name, value)| {
            let key = name.as_str().strip_prefix(prefix)?;
            Some((key.to_string(), value.to_str().ok()?.to_string()))
        })
        .collect()
}

fn with_metadata(request: RestRequest, prefix: &str, metadata: &Metadata) -> RestRequest {
    metadata
        .iter()
        .fold(request, |request, (key, value)| {
            request.header(format!("{prefix}{key}"), value)
        })
}

/// Percent-encoded `/container/object` path
fn encoded_path(container: &str, object: Option<&str>) -> String {
    let Ok(mut url) = Url::parse("http://localhost/") else {
        return format!("/{container}");
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(container);
        if let Some(object) = object {
            segments.extend(object.split('/'));
        }
    }
    url.path().to_string()
}

fn object_headers(headers: &HeaderMap) -> ObjectHeaders {
    ObjectHeaders {
        content_length: HttpResponseUtils::header_u64(headers, CONTENT_LENGTH.as_str()),
        content_type: HttpResponseUtils::header_str(headers, CONTENT_TYPE.as_str())
            .map(str::to_string),
        etag: HttpResponseUtils::header_str(headers, ETAG.as_str())
            .map(|etag| etag.trim_matches('"').to_string()),
        last_modified: HttpResponseUtils::header_str(headers, LAST_MODIFIED.as_str())
            .and_then(|raw| DateTime::parse_from_rfc2822(raw).ok())
            .map(|dt| dt.with_timezone(&Utc)),
        object_manifest: HttpResponseUtils::header_str(headers, HEADER_OBJECT_MANIFEST)
            .map(str::to_string),
        delete_at: HttpResponseUtils::header_str(headers, HEADER_DELETE_AT)
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0)),
        metadata: metadata_from(headers, HEADER_OBJECT_META_PREFIX),
    }
}

/// Expiry and metadata headers of an object upload
fn with_object_options(request: RestRequest, options: &CreateObjectOptions) -> RestRequest {
    let request = match options.delete_after {
        Some(delete_after) => {
            request.header(HEADER_DELETE_AFTER, delete_after.as_secs().to_string())
        }
        None => request,
    };
    with_metadata(request, HEADER_OBJECT_META_PREFIX, &options.metadata)
}

/// Listing body, where `204 No Content` means an empty listing
fn listing<T: DeserializeOwned>(response: &RestResponse) -> Result<Vec<T>> {
    if response.body.is_empty() {
        Ok(Vec::new())
    } else {
        response.json()
    }
}

fn parse_failures(errors: Vec<(String, String)>) -> Vec<BulkFailure> {
    errors
        .into_iter()
        .map(|(path, status)| BulkFailure { path, status })
        .collect()
}

#[derive(Deserialize)]
struct BulkDeleteBody {
    #[serde(rename = "Number Deleted", default)]
    deleted: u64,
    #[serde(rename = "Number Not Found", default)]
    not_found: u64,
    #[serde(rename = "Errors", default)]
    errors: Vec<(String, String)>,
}

#[derive(Deserialize)]
struct ExtractArchiveBody {
    #[serde(rename = "Number Files Created", default)]
    files_created: u64,
    #[serde(rename = "Errors", default)]
    errors: Vec<(String, String)>,
}

/// Cloud Files provider
///
/// # Example
///
/// ```ignore
/// let storage = CloudFilesProvider::connect(identity, Some("ORD"), false, &HttpClientConfig::default()).await?;
/// storage.create_container("backups", &Metadata::new()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CloudFilesProvider {
    storage: RestClient,
    cdn: Option<RestClient>,
}

impl CloudFilesProvider {
    /// Create a provider over existing storage and (optional) CDN clients
    pub fn new(storage: RestClient, cdn: Option<RestClient>) -> Self {
        Self { storage, cdn }
    }

    /// Resolve the storage and CDN endpoints and create a provider
    ///
    /// # Arguments
    /// * `internal` - Use the ServiceNet storage URL
    pub async fn connect(
        identity: SharedIdentityProvider,
        region: Option<&str>,
        internal: bool,
        config: &HttpClientConfig,
    ) -> Result<Self> {
        let storage = RestClient::from_catalog(
            "object_storage",
            SERVICE_TYPE_OBJECT_STORE,
            region,
            internal,
            identity.clone(),
            config,
        )
        .await?;
        let cdn = match RestClient::from_catalog(
            "object_cdn",
            SERVICE_TYPE_OBJECT_CDN,
            region,
            false,
            identity,
            config,
        )
        .await
        {
            Ok(client) => Some(client),
            Err(e) if e.is_not_found() => {
                tracing::info!("no object CDN endpoint in the catalog, CDN operations disabled");
                None
            }
            Err(e) => return Err(e),
        };
        Ok(Self::new(storage, cdn))
    }

    fn cdn(&self) -> Result<&RestClient> {
        self.cdn
            .as_ref()
            .ok_or_else(|| Error::not_found("object CDN endpoint"))
    }

    fn object(method: reqwest::Method, container: &str, name: &str) -> Result<RestRequest> {
        validate_container_name(container)?;
        validate_object_name(name)?;
        Ok(RestRequest::new(method, [container]).path(name))
    }

    fn container(method: reqwest::Method, name: &str) -> Result<RestRequest> {
        validate_container_name(name)?;
        Ok(RestRequest::new(method, [name]))
    }

    async fn list<T: DeserializeOwned>(
        client: &RestClient,
        request: RestRequest,
        page: &PageRequest,
        key: impl Fn(&T) -> String,
    ) -> Result<Page<T>> {
        let response = client
            .send(request.query("format", "json").page(page))
            .await?;
        let items = listing(&response)?;
        Ok(Page::from_full_page(items, page.limit, key))
    }

    async fn replace_object_metadata(&self, container: &str, name: &str, metadata: &Metadata) -> Result<()> {
        let request = with_metadata(
            Self::object(reqwest::Method::POST, container, name)?,
            HEADER_OBJECT_META_PREFIX,
            metadata,
        );
        self.storage.send_empty(request).await
    }
}

#[async_trait]
impl ObjectStorageProvider for CloudFilesProvider {
    async fn get_account_headers(&self) -> Result<AccountHeaders> {
        let response = self.storage.send(RestRequest::head(Vec::<String>::new())).await?;
        let headers = &response.headers;
        Ok(AccountHeaders {
            container_count: HttpResponseUtils::header_u64(headers, "x-account-container-count"),
            object_count: HttpResponseUtils::header_u64(headers, "x-account-object-count"),
            bytes_used: HttpResponseUtils::header_u64(headers, "x-account-bytes-used"),
            metadata: metadata_from(headers, HEADER_ACCOUNT_META_PREFIX),
        })
    }

    async fn update_account_metadata(&self, metadata: &Metadata) -> Result<()> {
        let request = with_metadata(
            RestRequest::post(Vec::<String>::new()),
            HEADER_ACCOUNT_META_PREFIX,
            metadata,
        );
        self.storage.send_empty(request).await
    }

    async fn list_containers(&self, page: PageRequest) -> Result<Page<Container>> {
        Self::list(
            &self.storage,
            RestRequest::get(Vec::<String>::new()),
            &page,
            |c: &Container| c.name.clone(),
        )
        .await
    }

    async fn create_container(&self, name: &str, metadata: &Metadata) -> Result<ContainerCreated> {
        let request = with_metadata(
            Self::container(reqwest::Method::PUT, name)?,
            HEADER_CONTAINER_META_PREFIX,
            metadata,
        );
        let response = self.storage.send(request).await?;
        let created = if response.status == reqwest::StatusCode::CREATED {
            ContainerCreated::Created
        } else {
            ContainerCreated::AlreadyExists
        };
        tracing::info!(container = name, ?created, "container created");
        Ok(created)
    }

    async fn delete_container(&self, name: &str, delete_objects: bool) -> Result<()> {
        let request = Self::container(reqwest::Method::DELETE, name)?;
        if delete_objects {
            let objects = self
                .list_all_objects(name, &ObjectListOptions::default())
                .await?;
            let paths: Vec<String> = objects
                .iter()
                .map(|object| format!("{name}/{}", object.name))
                .collect();
            if !paths.is_empty() {
                let result = self.bulk_delete(&paths).await?;
                if !result.is_success() {
                    return Err(Error::conflict(format!(
                        "could not empty container {name}: {} object(s) failed to delete",
                        result.errors.len()
                    )));
                }
            }
        }
        self.storage.send_empty(request).await?;
        tracing::info!(container = name, "container deleted");
        Ok(())
    }

    async fn get_container_headers(&self, name: &str) -> Result<ContainerHeaders> {
        let response = self
            .storage
            .send(Self::container(reqwest::Method::HEAD, name)?)
            .await?;
        let headers = &response.headers;
        Ok(ContainerHeaders {
            object_count: HttpResponseUtils::header_u64(headers, "x-container-object-count"),
            bytes_used: HttpResponseUtils::header_u64(headers, "x-container-bytes-used"),
            metadata: metadata_from(headers, HEADER_CONTAINER_META_PREFIX),
        })
    }

    async fn update_container_metadata(&self, name: &str, metadata: &Metadata) -> Result<()> {
        let request = with_metadata(
            Self::container(reqwest::Method::POST, name)?,
            HEADER_CONTAINER_META_PREFIX,
            metadata,
        );
        self.storage.send_empty(request).await
    }

    async fn delete_container_metadata(&self, name: &str, keys: &[String]) -> Result<()> {
        let request = keys
            .iter()
            .fold(Self::container(reqwest::Method::POST, name)?, |request, key| {
                request.header(format!("{HEADER_REMOVE_CONTAINER_META_PREFIX}{key}"), "x")
            });
        self.storage.send_empty(request).await
    }

    async fn list_objects(
        &self,
        container: &str,
        options: &ObjectListOptions,
        page: PageRequest,
    ) -> Result<Page<ContainerObject>> {
        let request = Self::container(reqwest::Method::GET, container)?
            .query_opt("prefix", options.prefix.as_deref())
            .query_opt("delimiter", options.delimiter);
        Self::list(&self.storage, request, &page, |o: &ContainerObject| {
            o.name.clone()
        })
        .await
    }

    async fn create_object(
        &self,
        container: &str,
        name: &str,
        data: Bytes,
        options: &CreateObjectOptions,
    ) -> Result<()> {
        let etag = format!("{:x}", md5::compute(&data));
        let size = data.len();
        let request = Self::object(reqwest::Method::PUT, container, name)?
            .header(ETAG.as_str(), etag)
            .body(data, options.content_type.as_deref());
        let request = with_object_options(request, options);
        self.storage.send_empty(request).await?;
        tracing::debug!(container, object = name, size, "object uploaded");
        Ok(())
    }

    async fn get_object(&self, container: &str, name: &str) -> Result<ObjectContent> {
        let response = self
            .storage
            .send(Self::object(reqwest::Method::GET, container, name)?)
            .await?;
        let mut headers = object_headers(&response.headers);
        if headers.content_length == 0 {
            headers.content_length = response.body.len() as u64;
        }
        Ok(ObjectContent {
            headers,
            data: response.body,
        })
    }

    async fn delete_object(&self, container: &str, name: &str) -> Result<()> {
        self.storage
            .send_empty(Self::object(reqwest::Method::DELETE, container, name)?)
            .await
    }

    async fn copy_object(
        &self,
        src_container: &str,
        src_name: &str,
        dst_container: &str,
        dst_name: &str,
    ) -> Result<()> {
        validate_container_name(src_container)?;
        validate_object_name(src_name)?;
        let request = Self::object(reqwest::Method::PUT, dst_container, dst_name)?
            .header(HEADER_COPY_FROM, encoded_path(src_container, Some(src_name)))
            .body(Bytes::new(), None);
        self.storage.send_empty(request).await
    }

    async fn get_object_headers(&self, container: &str, name: &str) -> Result<ObjectHeaders> {
        let response = self
            .storage
            .send(Self::object(reqwest::Method::HEAD, container, name)?)
            .await?;
        Ok(object_headers(&response.headers))
    }

    async fn update_object_metadata(&self, container: &str, name: &str, metadata: &Metadata) -> Result<()> {
        let mut merged = self.get_object_metadata(container, name).await?;
        merged.merge(metadata);
        self.replace_object_metadata(container, name, &merged).await
    }

    async fn delete_object_metadata(&self, container: &str, name: &str, keys: &[String]) -> Result<()> {
        let mut remaining = self.get_object_metadata(container, name).await?;
        for key in keys {
            remaining.remove(key);
        }
        self.replace_object_metadata(container, name, &remaining).await
    }

    async fn create_manifest(
        &self,
        container: &str,
        name: &str,
        segment_container: &str,
        segment_prefix: &str,
        options: &CreateObjectOptions,
    ) -> Result<()> {
        validate_container_name(segment_container)?;
        let request = Self::object(reqwest::Method::PUT, container, name)?
            .header(
                HEADER_OBJECT_MANIFEST,
                format!("{segment_container}/{segment_prefix}"),
            )
            .body(Bytes::new(), options.content_type.as_deref());
        let request = with_object_options(request, options);
        self.storage.send_empty(request).await?;
        tracing::debug!(container, object = name, segment_prefix, "manifest created");
        Ok(())
    }

    async fn list_cdn_containers(&self, page: PageRequest) -> Result<Page<CdnContainer>> {
        let cdn = self.cdn()?;
        Self::list(cdn, RestRequest::get(Vec::<String>::new()), &page, |c: &CdnContainer| {
            c.name.clone()
        })
        .await
    }

    async fn enable_cdn(&self, container: &str, ttl: u32) -> Result<CdnContainer> {
        let request = Self::container(reqwest::Method::PUT, container)?
            .header("X-Ttl", ttl.to_string())
            .header("X-Cdn-Enabled", "True");
        self.cdn()?.send_empty(request).await?;
        tracing::info!(container, ttl, "container published on CDN");
        self.get_cdn_container(container).await
    }

    async fn disable_cdn(&self, container: &str) -> Result<()> {
        let request =
            Self::container(reqwest::Method::POST, container)?.header("X-Cdn-Enabled", "False");
        self.cdn()?.send_empty(request).await
    }

    async fn get_cdn_container(&self, container: &str) -> Result<CdnContainer> {
        let response = self
            .cdn()?
            .send(Self::container(reqwest::Method::HEAD, container)?)
            .await?;
        let headers = &response.headers;
        let uri = |name: &str| HttpResponseUtils::header_str(headers, name).map(str::to_string);
        Ok(CdnContainer {
            name: container.to_string(),
            cdn_enabled: HttpResponseUtils::header_bool(headers, "x-cdn-enabled"),
            ttl: u32::try_from(HttpResponseUtils::header_u64(headers, "x-ttl")).unwrap_or(u32::MAX),
            log_retention: HttpResponseUtils::header_bool(headers, "x-log-retention"),
            cdn_uri: uri("x-cdn-uri"),
            cdn_ssl_uri: uri("x-cdn-ssl-uri"),
            cdn_streaming_uri: uri("x-cdn-streaming-uri"),
            cdn_ios_uri: uri("x-cdn-ios-uri"),
        })
    }

    async fn purge_cdn_object(&self, container: &str, name: &str, email: Option<&str>) -> Result<()> {
        let mut request = Self::object(reqwest::Method::DELETE, container, name)?;
        if let Some(email) = email {
            request = request.header(HEADER_PURGE_EMAIL, email);
        }
        self.cdn()?.send_empty(request).await
    }

    async fn bulk_delete(&self, paths: &[String]) -> Result<BulkDeleteResult> {
        let mut result = BulkDeleteResult::default();
        for chunk in paths.chunks(BULK_DELETE_MAX_PATHS) {
            let body = chunk
                .iter()
                .map(|path| {
                    let (container, object) = match path.trim_start_matches('/').split_once('/') {
                        Some((container, object)) => (container, Some(object)),
                        None => (path.trim_start_matches('/'), None),
                    };
                    encoded_path(container, object)
                })
                .collect::<Vec<_>>()
                .join("\n");
            let request = RestRequest::post(Vec::<String>::new())
                .query("bulk-delete", "true")
                .body(body, Some(CONTENT_TYPE_TEXT));
            let response: BulkDeleteBody = self.storage.send_json(request).await?;
            result.deleted += response.deleted;
            result.not_found += response.not_found;
            result.errors.extend(parse_failures(response.errors));
        }
        tracing::info!(
            deleted = result.deleted,
            not_found = result.not_found,
            errors = result.errors.len(),
            "bulk delete finished"
        );
        Ok(result)
    }

    async fn extract_archive(
        &self,
        upload_path: &str,
        format: ArchiveFormat,
        data: Bytes,
    ) -> Result<ExtractArchiveResult> {
        let upload_path = upload_path.trim_matches('/');
        let mut request = RestRequest::put(Vec::<String>::new());
        if !upload_path.is_empty() {
            request = request.path(upload_path);
        }
        let request = request
            .query("extract-archive", format.as_str())
            .body(data, None);
        let response: ExtractArchiveBody = self.storage.send_json(request).await?;
        Ok(ExtractArchiveResult {
            files_created: response.files_created,
            errors: parse_failures(response.errors),
        })
    }

    async fn create_temp_url(&self, request: &TempUrlRequest) -> Result<String> {
        let account = self.get_account_headers().await?;
        let key = account
            .metadata
            .get(TEMP_URL_KEY_METADATA)
            .ok_or_else(|| Error::not_found("account temp URL key"))?;
        TempUrlSigner::new(key).signed_url(self.storage.base_url(), request, Utc::now())
    }

    fn provider_name(&self) -> &str {
        "cloud"
    }
}
