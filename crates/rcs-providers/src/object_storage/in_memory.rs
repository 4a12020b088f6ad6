//! In-memory object storage
//!
//! Behaves like a single Swift account: objects expire after `delete_after`,
//! listings fold at a delimiter, manifests concatenate their segments on read
//! and temp URLs are signed against [`IN_MEMORY_STORAGE_URL`]. A metadata
//! update with an empty value removes that key, as a blank `X-*-Meta-*`
//! header does on the live service.

use std::collections::BTreeMap;
use std::io::Read;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use dashmap::mapref::one::{Ref, RefMut};
use flate2::read::GzDecoder;
use reqwest::Url;
use tokio::sync::RwLock;

use rcs_domain::constants::{MAX_SINGLE_OBJECT_SIZE, TEMP_URL_KEY_METADATA};
use rcs_domain::error::{Error, Result};
use rcs_domain::pagination::{Page, PageRequest};
use rcs_domain::ports::ObjectStorageProvider;
use rcs_domain::value_objects::{
    AccountHeaders, ArchiveFormat, BulkDeleteResult, BulkFailure, CdnContainer, Container,
    ContainerCreated, ContainerHeaders, ContainerObject, CreateObjectOptions,
    ExtractArchiveResult, Metadata, ObjectContent, ObjectHeaders, ObjectListOptions,
    TempUrlRequest, validate_container_name, validate_object_name,
};

use crate::constants::{IN_MEMORY_CDN_URL, IN_MEMORY_STORAGE_URL};
use crate::object_storage::temp_url::TempUrlSigner;
use crate::utils::page_by_key;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

fn apply_metadata(target: &mut Metadata, update: &Metadata) {
    for (key, value) in update.iter() {
        if value.is_empty() {
            target.remove(key);
        } else {
            target.insert(key, value);
        }
    }
}

fn md5_hex(data: &[u8]) -> String {
    format!("{:x}", md5::compute(data))
}

fn byte_len(data: &[u8]) -> u64 {
    u64::try_from(data.len()).unwrap_or(u64::MAX)
}

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    content_type: String,
    etag: String,
    last_modified: DateTime<Utc>,
    metadata: Metadata,
    manifest: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl StoredObject {
    fn new(data: Bytes, content_type: Option<&str>, metadata: Metadata) -> Self {
        Self {
            etag: md5_hex(&data),
            data,
            content_type: content_type.unwrap_or(DEFAULT_CONTENT_TYPE).to_string(),
            last_modified: Utc::now(),
            metadata,
            manifest: None,
            expires_at: None,
        }
    }

    fn with_options(data: Bytes, options: &CreateObjectOptions) -> Result<Self> {
        let mut object = Self::new(
            data,
            options.content_type.as_deref(),
            options.metadata.clone(),
        );
        if let Some(delete_after) = options.delete_after {
            let delta = TimeDelta::from_std(delete_after)
                .map_err(|_| Error::invalid_argument("delete-after is out of range"))?;
            object.expires_at = Some(object.last_modified + delta);
        }
        Ok(object)
    }

    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }

    fn listing(&self, name: &str) -> ContainerObject {
        ContainerObject {
            name: name.to_string(),
            hash: Some(self.etag.clone()),
            bytes: byte_len(&self.data),
            content_type: Some(self.content_type.clone()),
            last_modified: Some(self.last_modified),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CdnSettings {
    enabled: bool,
    ttl: u32,
}

#[derive(Debug, Default)]
struct ContainerRecord {
    metadata: Metadata,
    objects: BTreeMap<String, StoredObject>,
    cdn: Option<CdnSettings>,
}

impl ContainerRecord {
    fn live_objects(&self, now: DateTime<Utc>) -> impl Iterator<Item = (&String, &StoredObject)> {
        self.objects.iter().filter(move |(_, object)| object.is_live(now))
    }

    /// `(object count, bytes used)`
    fn usage(&self, now: DateTime<Utc>) -> (u64, u64) {
        self.live_objects(now)
            .fold((0, 0), |(count, bytes), (_, object)| {
                (count + 1, bytes + byte_len(&object.data))
            })
    }
}

/// Names in `objects` after `prefix`, folded at `delimiter`
fn fold_listing<'a>(
    objects: impl Iterator<Item = (&'a String, &'a StoredObject)>,
    options: &ObjectListOptions,
) -> Vec<ContainerObject> {
    let prefix = options.prefix.as_deref().unwrap_or_default();
    let mut entries = Vec::new();
    let mut last_directory: Option<&str> = None;
    for (name, object) in objects.filter(|(name, _)| name.starts_with(prefix)) {
        let folded = options.delimiter.and_then(|delimiter| {
            name[prefix.len()..]
                .find(delimiter)
                .map(|pos| &name[..prefix.len() + pos + delimiter.len_utf8()])
        });
        match folded {
            Some(directory) => {
                if last_directory != Some(directory) {
                    entries.push(ContainerObject::directory(directory));
                    last_directory = Some(directory);
                }
            }
            None => entries.push(object.listing(name)),
        }
    }
    entries
}

fn bad_archive(e: std::io::Error) -> Error {
    Error::invalid_argument(format!("unreadable archive: {e}"))
}

/// Regular files of an archive as `(path, content)`
fn unpack(format: ArchiveFormat, data: &[u8]) -> Result<Vec<(String, Bytes)>> {
    let reader: Box<dyn Read + '_> = match format {
        ArchiveFormat::Tar => Box::new(data),
        ArchiveFormat::TarGz => Box::new(GzDecoder::new(data)),
        ArchiveFormat::TarBz2 => {
            return Err(Error::invalid_argument(
                "tar.bz2 archives are not supported by the in-memory backend",
            ));
        }
    };
    let mut archive = tar::Archive::new(reader);
    let mut files = Vec::new();
    for entry in archive.entries().map_err(bad_archive)? {
        let mut entry = entry.map_err(bad_archive)?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let path = entry
            .path()
            .map_err(bad_archive)?
            .to_string_lossy()
            .trim_start_matches("./")
            .to_string();
        let mut content = Vec::new();
        entry.read_to_end(&mut content).map_err(bad_archive)?;
        files.push((path, Bytes::from(content)));
    }
    Ok(files)
}

/// In-memory object storage account
#[derive(Debug, Default)]
pub struct InMemoryObjectStorage {
    containers: DashMap<String, ContainerRecord>,
    account_metadata: RwLock<Metadata>,
}

impl InMemoryObjectStorage {
    /// Create an empty account
    pub fn new() -> Self {
        Self::default()
    }

    fn container(&self, name: &str) -> Result<Ref<'_, String, ContainerRecord>> {
        validate_container_name(name)?;
        self.containers
            .get(name)
            .ok_or_else(|| Error::not_found(format!("container {name}")))
    }

    fn container_mut(&self, name: &str) -> Result<RefMut<'_, String, ContainerRecord>> {
        validate_container_name(name)?;
        self.containers
            .get_mut(name)
            .ok_or_else(|| Error::not_found(format!("container {name}")))
    }

    fn stored(&self, container: &str, name: &str) -> Result<StoredObject> {
        validate_object_name(name)?;
        let record = self.container(container)?;
        record
            .objects
            .get(name)
            .filter(|object| object.is_live(Utc::now()))
            .cloned()
            .ok_or_else(|| Error::not_found(format!("object {container}/{name}")))
    }

    fn store(&self, container: &str, name: &str, object: StoredObject) -> Result<()> {
        validate_object_name(name)?;
        self.container_mut(container)?
            .objects
            .insert(name.to_string(), object);
        Ok(())
    }

    /// Content and ETag of an object, concatenating segments for a manifest
    fn content(&self, object: &StoredObject) -> Result<(Bytes, String)> {
        let Some(manifest) = &object.manifest else {
            return Ok((object.data.clone(), object.etag.clone()));
        };
        let (segment_container, prefix) = manifest
            .split_once('/')
            .unwrap_or((manifest.as_str(), ""));
        let record = self.container(segment_container)?;
        let mut data = BytesMut::new();
        let mut etags = String::new();
        for (_, segment) in record
            .live_objects(Utc::now())
            .filter(|(name, _)| name.starts_with(prefix))
        {
            data.extend_from_slice(&segment.data);
            etags.push_str(&segment.etag);
        }
        Ok((data.freeze(), md5_hex(etags.as_bytes())))
    }

    fn headers(&self, object: &StoredObject) -> Result<(ObjectHeaders, Bytes)> {
        let (data, etag) = self.content(object)?;
        let headers = ObjectHeaders {
            content_length: byte_len(&data),
            content_type: Some(object.content_type.clone()),
            etag: Some(etag),
            last_modified: Some(object.last_modified),
            object_manifest: object.manifest.clone(),
            delete_at: object.expires_at,
            metadata: object.metadata.clone(),
        };
        Ok((headers, data))
    }

    fn cdn_container(name: &str, settings: CdnSettings) -> CdnContainer {
        CdnContainer {
            name: name.to_string(),
            cdn_enabled: settings.enabled,
            ttl: settings.ttl,
            log_retention: false,
            cdn_uri: Some(format!("{IN_MEMORY_CDN_URL}/{name}")),
            cdn_ssl_uri: Some(format!("{IN_MEMORY_CDN_URL}/ssl/{name}")),
            cdn_streaming_uri: Some(format!("{IN_MEMORY_CDN_URL}/stream/{name}")),
            cdn_ios_uri: Some(format!("{IN_MEMORY_CDN_URL}/ios/{name}")),
        }
    }

    fn delete_path(&self, path: &str, result: &mut BulkDeleteResult) {
        let path = path.trim_start_matches('/');
        let outcome = match path.split_once('/') {
            Some((container, object)) => self
                .container_mut(container)
                .and_then(|mut record| {
                    record
                        .objects
                        .remove(object)
                        .map(|_| ())
                        .ok_or_else(|| Error::not_found(path))
                }),
            None => self.delete_empty_container(path),
        };
        match outcome {
            Ok(()) => result.deleted += 1,
            Err(e) if e.is_not_found() => result.not_found += 1,
            Err(e) => result.errors.push(BulkFailure {
                path: path.to_string(),
                status: if e.is_conflict() {
                    "409 Conflict".to_string()
                } else {
                    "400 Bad Request".to_string()
                },
            }),
        }
    }

    fn delete_empty_container(&self, name: &str) -> Result<()> {
        validate_container_name(name)?;
        let removed = self
            .containers
            .remove_if(name, |_, record| record.usage(Utc::now()).0 == 0);
        if removed.is_some() {
            return Ok(());
        }
        if self.containers.contains_key(name) {
            Err(Error::conflict(format!("container {name} is not empty")))
        } else {
            Err(Error::not_found(format!("container {name}")))
        }
    }
}

#[async_trait]
impl ObjectStorageProvider for InMemoryObjectStorage {
    async fn get_account_headers(&self) -> Result<AccountHeaders> {
        let now = Utc::now();
        let (object_count, bytes_used) = self
            .containers
            .iter()
            .map(|entry| entry.usage(now))
            .fold((0, 0), |(count, bytes), (c, b)| (count + c, bytes + b));
        Ok(AccountHeaders {
            container_count: u64::try_from(self.containers.len()).unwrap_or(u64::MAX),
            object_count,
            bytes_used,
            metadata: self.account_metadata.read().await.clone(),
        })
    }

    async fn update_account_metadata(&self, metadata: &Metadata) -> Result<()> {
        apply_metadata(&mut *self.account_metadata.write().await, metadata);
        Ok(())
    }

    async fn list_containers(&self, page: PageRequest) -> Result<Page<Container>> {
        let now = Utc::now();
        let containers = self
            .containers
            .iter()
            .map(|entry| {
                let (count, bytes) = entry.usage(now);
                Container {
                    name: entry.key().clone(),
                    count,
                    bytes,
                }
            })
            .collect();
        Ok(page_by_key(containers, &page, |c: &Container| c.name.clone()))
    }

    async fn create_container(&self, name: &str, metadata: &Metadata) -> Result<ContainerCreated> {
        validate_container_name(name)?;
        let mut created = ContainerCreated::AlreadyExists;
        let mut record = self.containers.entry(name.to_string()).or_insert_with(|| {
            created = ContainerCreated::Created;
            ContainerRecord::default()
        });
        apply_metadata(&mut record.metadata, metadata);
        Ok(created)
    }

    async fn delete_container(&self, name: &str, delete_objects: bool) -> Result<()> {
        if delete_objects {
            self.container_mut(name)?.objects.clear();
        }
        self.delete_empty_container(name)
    }

    async fn get_container_headers(&self, name: &str) -> Result<ContainerHeaders> {
        let record = self.container(name)?;
        let (object_count, bytes_used) = record.usage(Utc::now());
        Ok(ContainerHeaders {
            object_count,
            bytes_used,
            metadata: record.metadata.clone(),
        })
    }

    async fn update_container_metadata(&self, name: &str, metadata: &Metadata) -> Result<()> {
        apply_metadata(&mut self.container_mut(name)?.metadata, metadata);
        Ok(())
    }

    async fn delete_container_metadata(&self, name: &str, keys: &[String]) -> Result<()> {
        let mut record = self.container_mut(name)?;
        for key in keys {
            record.metadata.remove(key);
        }
        Ok(())
    }

    async fn list_objects(
        &self,
        container: &str,
        options: &ObjectListOptions,
        page: PageRequest,
    ) -> Result<Page<ContainerObject>> {
        let entries = {
            let record = self.container(container)?;
            fold_listing(record.live_objects(Utc::now()), options)
        };
        Ok(page_by_key(entries, &page, |o: &ContainerObject| {
            o.name.clone()
        }))
    }

    async fn create_object(
        &self,
        container: &str,
        name: &str,
        data: Bytes,
        options: &CreateObjectOptions,
    ) -> Result<()> {
        if byte_len(&data) > MAX_SINGLE_OBJECT_SIZE {
            return Err(Error::rate_limited(
                format!("object {container}/{name} exceeds the single upload limit"),
                None,
            ));
        }
        let object = StoredObject::with_options(data, options)?;
        self.store(container, name, object)
    }

    async fn get_object(&self, container: &str, name: &str) -> Result<ObjectContent> {
        let object = self.stored(container, name)?;
        let (headers, data) = self.headers(&object)?;
        Ok(ObjectContent { headers, data })
    }

    async fn delete_object(&self, container: &str, name: &str) -> Result<()> {
        validate_object_name(name)?;
        let now = Utc::now();
        let removed = self.container_mut(container)?.objects.remove(name);
        match removed {
            Some(object) if object.is_live(now) => Ok(()),
            _ => Err(Error::not_found(format!("object {container}/{name}"))),
        }
    }

    async fn copy_object(
        &self,
        src_container: &str,
        src_name: &str,
        dst_container: &str,
        dst_name: &str,
    ) -> Result<()> {
        let source = self.stored(src_container, src_name)?;
        let (data, _) = self.content(&source)?;
        let copy = StoredObject::new(data, Some(&source.content_type), source.metadata);
        self.store(dst_container, dst_name, copy)
    }

    async fn get_object_headers(&self, container: &str, name: &str) -> Result<ObjectHeaders> {
        let object = self.stored(container, name)?;
        Ok(self.headers(&object)?.0)
    }

    async fn update_object_metadata(&self, container: &str, name: &str, metadata: &Metadata) -> Result<()> {
        let mut object = self.stored(container, name)?;
        apply_metadata(&mut object.metadata, metadata);
        self.store(container, name, object)
    }

    async fn delete_object_metadata(&self, container: &str, name: &str, keys: &[String]) -> Result<()> {
        let mut object = self.stored(container, name)?;
        for key in keys {
            object.metadata.remove(key);
        }
        self.store(container, name, object)
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
        let mut manifest = StoredObject::with_options(Bytes::new(), options)?;
        manifest.manifest = Some(format!("{segment_container}/{segment_prefix}"));
        self.store(container, name, manifest)
    }

    async fn list_cdn_containers(&self, page: PageRequest) -> Result<Page<CdnContainer>> {
        let containers = self
            .containers
            .iter()
            .filter_map(|entry| entry.cdn.map(|cdn| Self::cdn_container(entry.key(), cdn)))
            .collect();
        Ok(page_by_key(containers, &page, |c: &CdnContainer| {
            c.name.clone()
        }))
    }

    async fn enable_cdn(&self, container: &str, ttl: u32) -> Result<CdnContainer> {
        let settings = CdnSettings { enabled: true, ttl };
        self.container_mut(container)?.cdn = Some(settings);
        Ok(Self::cdn_container(container, settings))
    }

    async fn disable_cdn(&self, container: &str) -> Result<()> {
        let mut record = self.container_mut(container)?;
        let settings = record
            .cdn
            .as_mut()
            .ok_or_else(|| Error::not_found(format!("CDN container {container}")))?;
        settings.enabled = false;
        Ok(())
    }

    async fn get_cdn_container(&self, container: &str) -> Result<CdnContainer> {
        let settings = self
            .container(container)?
            .cdn
            .ok_or_else(|| Error::not_found(format!("CDN container {container}")))?;
        Ok(Self::cdn_container(container, settings))
    }

    async fn purge_cdn_object(&self, container: &str, name: &str, email: Option<&str>) -> Result<()> {
        let enabled = self
            .container(container)?
            .cdn
            .is_some_and(|settings| settings.enabled);
        if !enabled {
            return Err(Error::not_found(format!("CDN container {container}")));
        }
        self.stored(container, name)?;
        tracing::debug!(container, object = name, email, "CDN purge accepted");
        Ok(())
    }

    async fn bulk_delete(&self, paths: &[String]) -> Result<BulkDeleteResult> {
        let mut result = BulkDeleteResult::default();
        for path in paths {
            self.delete_path(path, &mut result);
        }
        Ok(result)
    }

    async fn extract_archive(
        &self,
        upload_path: &str,
        format: ArchiveFormat,
        data: Bytes,
    ) -> Result<ExtractArchiveResult> {
        let files = unpack(format, &data)?;
        let upload_path = upload_path.trim_matches('/');
        let mut result = ExtractArchiveResult::default();
        for (path, content) in files {
            let target = if upload_path.is_empty() {
                path.split_once('/')
                    .map(|(container, object)| (container.to_string(), object.to_string()))
            } else {
                Some(match upload_path.split_once('/') {
                    Some((container, prefix)) => (container.to_string(), format!("{prefix}/{path}")),
                    None => (upload_path.to_string(), path.clone()),
                })
            };
            let stored = target
                .ok_or_else(|| Error::invalid_argument(format!("{path} has no container directory")))
                .and_then(|(container, object)| {
                    validate_container_name(&container)?;
                    validate_object_name(&object)?;
                    self.containers.entry(container.clone()).or_default();
                    self.store(&container, &object, StoredObject::new(content, None, Metadata::new()))
                });
            match stored {
                Ok(()) => result.files_created += 1,
                Err(_) => result.errors.push(BulkFailure {
                    path,
                    status: "400 Bad Request".to_string(),
                }),
            }
        }
        Ok(result)
    }

    async fn create_temp_url(&self, request: &TempUrlRequest) -> Result<String> {
        let key = self
            .account_metadata
            .read()
            .await
            .get(TEMP_URL_KEY_METADATA)
            .map(str::to_string)
            .ok_or_else(|| Error::not_found("account temp URL key"))?;
        let base = Url::parse(IN_MEMORY_STORAGE_URL)
            .map_err(|e| Error::internal(format!("invalid in-memory storage URL: {e}")))?;
        TempUrlSigner::new(key).signed_url(&base, request, Utc::now())
    }

    fn provider_name(&self) -> &str {
        "in_memory"
    }
}
