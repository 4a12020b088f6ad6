use crate::constants::DEFAULT_PAGE_SIZE;
use crate::error::{Error, Result};
use crate::pagination::{Page, PageRequest, collect_all};
use crate::value_objects::{
    AccountHeaders, ArchiveFormat, BulkDeleteResult, CdnContainer, Container, ContainerCreated,
    ContainerHeaders, ContainerObject, CreateObjectOptions, ExtractArchiveResult, Metadata,
    ObjectContent, ObjectHeaders, ObjectListOptions, TempUrlRequest,
};
use async_trait::async_trait;
use bytes::Bytes;

/// Object Storage Provider Interface
///
/// Containers are addressed by name and objects by `(container, name)`.
/// Listings are ordered by name and paged with the last name as marker.
///
/// # Example
///
/// ```ignore
/// use rcs_domain::ports::ObjectStorageProvider;
///
/// storage.create_container("backups", &Metadata::new()).await?;
/// storage.create_object("backups", "db/2024-05-01.sql", data, &Default::default()).await?;
/// let listing = storage.list_all_objects("backups", &ObjectListOptions::prefix("db/")).await?;
/// ```
#[async_trait]
pub trait ObjectStorageProvider: Send + Sync {
    // ========================================================================
    // ACCOUNT
    // ========================================================================

    /// Get account counters and metadata
    async fn get_account_headers(&self) -> Result<AccountHeaders>;

    /// Set (merge) account metadata
    async fn update_account_metadata(&self, metadata: &Metadata) -> Result<()>;

    // ========================================================================
    // CONTAINERS
    // ========================================================================

    /// List one page of containers
    async fn list_containers(&self, page: PageRequest) -> Result<Page<Container>>;

    /// Create a container with initial metadata
    async fn create_container(&self, name: &str, metadata: &Metadata)
    -> Result<ContainerCreated>;

    /// Delete a container
    ///
    /// # Arguments
    /// * `name` - Container to delete
    /// * `delete_objects` - Delete every object first; otherwise a non-empty
    ///   container is rejected with `Conflict`
    async fn delete_container(&self, name: &str, delete_objects: bool) -> Result<()>;

    /// Get container counters and metadata
    async fn get_container_headers(&self, name: &str) -> Result<ContainerHeaders>;

    /// Set (merge) container metadata
    async fn update_container_metadata(&self, name: &str, metadata: &Metadata) -> Result<()>;

    /// Remove container metadata keys
    async fn delete_container_metadata(&self, name: &str, keys: &[String]) -> Result<()>;

    // ========================================================================
    // OBJECTS
    // ========================================================================

    /// List one page of objects
    async fn list_objects(
        &self,
        container: &str,
        options: &ObjectListOptions,
        page: PageRequest,
    ) -> Result<Page<ContainerObject>>;

    /// Upload an object, replacing any existing one
    async fn create_object(
        &self,
        container: &str,
        name: &str,
        data: Bytes,
        options: &CreateObjectOptions,
    ) -> Result<()>;

    /// Download an object
    ///
    /// For a large-object manifest the concatenated segments are returned.
    async fn get_object(&self, container: &str, name: &str) -> Result<ObjectContent>;

    /// Delete an object
    async fn delete_object(&self, container: &str, name: &str) -> Result<()>;

    /// Copy an object server-side
    async fn copy_object(
        &self,
        src_container: &str,
        src_name: &str,
        dst_container: &str,
        dst_name: &str,
    ) -> Result<()>;

    /// Get object headers and metadata
    async fn get_object_headers(&self, container: &str, name: &str) -> Result<ObjectHeaders>;

    /// Set (merge) object metadata
    async fn update_object_metadata(
        &self,
        container: &str,
        name: &str,
        metadata: &Metadata,
    ) -> Result<()>;

    /// Remove object metadata keys
    async fn delete_object_metadata(
        &self,
        container: &str,
        name: &str,
        keys: &[String],
    ) -> Result<()>;

    /// Create a dynamic large object manifest over every object named
    /// `{segment_container}/{segment_prefix}*`
    ///
    /// Content type, metadata and expiry in `options` apply to the manifest.
    async fn create_manifest(
        &self,
        container: &str,
        name: &str,
        segment_container: &str,
        segment_prefix: &str,
        options: &CreateObjectOptions,
    ) -> Result<()>;

    // ========================================================================
    // CDN
    // ========================================================================

    /// List one page of CDN-enabled containers
    async fn list_cdn_containers(&self, page: PageRequest) -> Result<Page<CdnContainer>>;

    /// Publish a container on the CDN with the given TTL
    async fn enable_cdn(&self, container: &str, ttl: u32) -> Result<CdnContainer>;

    /// Stop publishing a container on the CDN
    async fn disable_cdn(&self, container: &str) -> Result<()>;

    /// Get the CDN settings of a container
    async fn get_cdn_container(&self, container: &str) -> Result<CdnContainer>;

    /// Purge an object from the CDN edge caches
    async fn purge_cdn_object(
        &self,
        container: &str,
        name: &str,
        email: Option<&str>,
    ) -> Result<()>;

    // ========================================================================
    // BULK OPERATIONS
    // ========================================================================

    /// Delete many objects (`container/object`) or empty containers at once
    async fn bulk_delete(&self, paths: &[String]) -> Result<BulkDeleteResult>;

    /// Upload an archive and unpack it server-side
    ///
    /// # Arguments
    /// * `upload_path` - `container` or `container/prefix` to unpack into;
    ///   empty to create one container per top-level archive directory
    async fn extract_archive(
        &self,
        upload_path: &str,
        format: ArchiveFormat,
        data: Bytes,
    ) -> Result<ExtractArchiveResult>;

    /// Build a signed URL granting temporary anonymous access to an object
    async fn create_temp_url(&self, request: &TempUrlRequest) -> Result<String>;

    /// Name of this provider (e.g. "cloud", "in_memory")
    fn provider_name(&self) -> &str;

    // ========================================================================
    // PROVIDED OPERATIONS
    // ========================================================================

    /// Container metadata only
    async fn get_container_metadata(&self, name: &str) -> Result<Metadata> {
        Ok(self.get_container_headers(name).await?.metadata)
    }

    /// Object metadata only
    async fn get_object_metadata(&self, container: &str, name: &str) -> Result<Metadata> {
        Ok(self.get_object_headers(container, name).await?.metadata)
    }

    /// Copy an object, then delete the source
    async fn move_object(
        &self,
        src_container: &str,
        src_name: &str,
        dst_container: &str,
        dst_name: &str,
    ) -> Result<()> {
        self.copy_object(src_container, src_name, dst_container, dst_name)
            .await?;
        self.delete_object(src_container, src_name).await
    }

    /// Upload an object in segments with a manifest on top
    ///
    /// Segments are stored as `{name}/{index:08}` in the same container, so
    /// lexical order equals upload order. The manifest carries the content
    /// type and metadata of `options`; segments share its expiry. Returns
    /// the number of segments.
    async fn upload_segmented(
        &self,
        container: &str,
        name: &str,
        data: Bytes,
        segment_size: usize,
        options: &CreateObjectOptions,
    ) -> Result<usize> {
        if segment_size == 0 {
            return Err(Error::invalid_argument("segment size must be positive"));
        }
        let prefix = format!("{name}/");
        let segment_options = CreateObjectOptions {
            delete_after: options.delete_after,
            ..CreateObjectOptions::default()
        };
        let mut offset = 0;
        let mut index = 0;
        while offset < data.len() || index == 0 {
            let end = usize::min(offset + segment_size, data.len());
            let segment = data.slice(offset..end);
            let segment_name = format!("{prefix}{index:08}");
            self.create_object(container, &segment_name, segment, &segment_options)
                .await?;
            offset = end;
            index += 1;
        }
        self.create_manifest(container, name, container, &prefix, options)
            .await?;
        Ok(index)
    }

    /// Every container
    async fn list_all_containers(&self) -> Result<Vec<Container>> {
        collect_all(Some(DEFAULT_PAGE_SIZE), |page| self.list_containers(page)).await
    }

    /// Every object matching the listing options
    async fn list_all_objects(
        &self,
        container: &str,
        options: &ObjectListOptions,
    ) -> Result<Vec<ContainerObject>> {
        collect_all(Some(DEFAULT_PAGE_SIZE), |page| {
            self.list_objects(container, options, page)
        })
        .await
    }

    /// Every CDN-enabled container
    async fn list_all_cdn_containers(&self) -> Result<Vec<CdnContainer>> {
        collect_all(Some(DEFAULT_PAGE_SIZE), |page| self.list_cdn_containers(page)).await
    }
}
