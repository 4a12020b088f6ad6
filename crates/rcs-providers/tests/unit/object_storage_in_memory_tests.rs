//! In-memory object storage tests

use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use flate2::Compression;
use flate2::write::GzEncoder;
use rcs_domain::error::Error;
use rcs_domain::pagination::PageRequest;
use rcs_domain::ports::ObjectStorageProvider;
use rcs_domain::value_objects::{
    ArchiveFormat, ContainerCreated, CreateObjectOptions, Metadata, ObjectListOptions,
    TempUrlMethod, TempUrlRequest,
};
use rcs_providers::object_storage::{InMemoryObjectStorage, TempUrlSigner};

async fn storage_with(container: &str, objects: &[(&str, &str)]) -> InMemoryObjectStorage {
    let storage = InMemoryObjectStorage::new();
    storage
        .create_container(container, &Metadata::new())
        .await
        .unwrap();
    for (name, body) in objects {
        storage
            .create_object(
                container,
                name,
                Bytes::copy_from_slice(body.as_bytes()),
                &CreateObjectOptions::default(),
            )
            .await
            .unwrap();
    }
    storage
}

fn tar_gz(files: &[(&str, &[u8])]) -> Bytes {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (path, content) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, path, *content).unwrap();
    }
    let encoder = builder.into_inner().unwrap();
    Bytes::from(encoder.finish().unwrap())
}

#[tokio::test]
async fn test_container_create_is_idempotent_and_merges_metadata() {
    let storage = InMemoryObjectStorage::new();
    assert_eq!(
        storage
            .create_container("logs", &Metadata::new().with("Owner", "ops"))
            .await
            .unwrap(),
        ContainerCreated::Created
    );
    assert_eq!(
        storage
            .create_container("logs", &Metadata::new().with("tier", "cold"))
            .await
            .unwrap(),
        ContainerCreated::AlreadyExists
    );

    let metadata = storage.get_container_metadata("logs").await.unwrap();
    assert_eq!(metadata.get("owner"), Some("ops"));
    assert_eq!(metadata.get("TIER"), Some("cold"));
}

#[tokio::test]
async fn test_object_round_trip_and_usage() {
    let storage = storage_with("docs", &[("a.txt", "hello"), ("b.txt", "world!")]).await;

    let content = storage.get_object("docs", "a.txt").await.unwrap();
    assert_eq!(&content.data[..], b"hello");
    assert_eq!(
        content.headers.etag.as_deref(),
        Some("5d41402abc4b2a76b9719d911017c592")
    );
    assert_eq!(
        content.headers.content_type.as_deref(),
        Some("application/octet-stream")
    );

    let headers = storage.get_container_headers("docs").await.unwrap();
    assert_eq!(headers.object_count, 2);
    assert_eq!(headers.bytes_used, 11);

    let account = storage.get_account_headers().await.unwrap();
    assert_eq!(account.container_count, 1);
    assert_eq!(account.object_count, 2);
}

#[tokio::test]
async fn test_missing_container_and_object_are_not_found() {
    let storage = storage_with("docs", &[]).await;
    assert!(storage.get_object("docs", "nope").await.unwrap_err().is_not_found());
    assert!(
        storage
            .get_container_headers("other")
            .await
            .unwrap_err()
            .is_not_found()
    );
    assert!(
        storage
            .create_object("other", "a", Bytes::new(), &CreateObjectOptions::default())
            .await
            .unwrap_err()
            .is_not_found()
    );
}

#[tokio::test]
async fn test_expired_objects_disappear() {
    let storage = storage_with("tmp", &[]).await;
    let options = CreateObjectOptions {
        delete_after: Some(Duration::ZERO),
        ..CreateObjectOptions::default()
    };
    storage
        .create_object("tmp", "gone", Bytes::from_static(b"x"), &options)
        .await
        .unwrap();

    assert!(storage.get_object("tmp", "gone").await.unwrap_err().is_not_found());
    assert_eq!(storage.get_container_headers("tmp").await.unwrap().object_count, 0);
    // an expired object does not keep the container from being deleted
    storage.delete_container("tmp", false).await.unwrap();
}

#[tokio::test]
async fn test_delete_non_empty_container_conflicts() {
    let storage = storage_with("docs", &[("a.txt", "a")]).await;
    let err = storage.delete_container("docs", false).await.unwrap_err();
    assert!(err.is_conflict());

    storage.delete_container("docs", true).await.unwrap();
    assert!(storage.list_all_containers().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_listing_with_prefix_delimiter_and_markers() {
    let storage = storage_with(
        "photos",
        &[
            ("2023/a.jpg", "a"),
            ("2024/01/b.jpg", "b"),
            ("2024/01/c.jpg", "c"),
            ("2024/02/d.jpg", "d"),
            ("2024/cover.jpg", "e"),
            ("readme", "f"),
        ],
    )
    .await;

    let options = ObjectListOptions::prefix("2024/").with_delimiter('/');
    let names: Vec<String> = storage
        .list_all_objects("photos", &options)
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.name)
        .collect();
    assert_eq!(names, ["2024/01/", "2024/02/", "2024/cover.jpg"]);

    let top = storage
        .list_all_objects("photos", &ObjectListOptions::default().with_delimiter('/'))
        .await
        .unwrap();
    assert_eq!(top.len(), 3);
    assert!(top[0].is_directory());
    assert!(!top[2].is_directory());

    let first = storage
        .list_objects("photos", &ObjectListOptions::default(), PageRequest::first(Some(4)))
        .await
        .unwrap();
    assert_eq!(first.next_marker(), Some("2024/02/d.jpg"));
    let second = storage
        .list_objects(
            "photos",
            &ObjectListOptions::default(),
            PageRequest::first(Some(4)).after("2024/02/d.jpg"),
        )
        .await
        .unwrap();
    let rest: Vec<_> = second.items().iter().map(|o| o.name.as_str()).collect();
    assert_eq!(rest, ["2024/cover.jpg", "readme"]);
    assert!(!second.has_next_page());
}

#[tokio::test]
async fn test_metadata_update_merges_and_removes() {
    let storage = storage_with("docs", &[("a.txt", "a")]).await;
    storage
        .update_object_metadata("docs", "a.txt", &Metadata::new().with("A", "1").with("b", "2"))
        .await
        .unwrap();
    storage
        .update_object_metadata("docs", "a.txt", &Metadata::new().with("b", ""))
        .await
        .unwrap();
    storage
        .delete_object_metadata("docs", "a.txt", &["a".to_string()])
        .await
        .unwrap();
    storage
        .update_object_metadata("docs", "a.txt", &Metadata::new().with("c", "3"))
        .await
        .unwrap();

    let metadata = storage.get_object_metadata("docs", "a.txt").await.unwrap();
    assert_eq!(metadata.len(), 1);
    assert_eq!(metadata.get("c"), Some("3"));
}

#[tokio::test]
async fn test_move_copies_then_deletes() {
    let storage = storage_with("src", &[("a.txt", "payload")]).await;
    storage.create_container("dst", &Metadata::new()).await.unwrap();

    storage
        .move_object("src", "a.txt", "dst", "b.txt")
        .await
        .unwrap();
    assert_eq!(
        &storage.get_object("dst", "b.txt").await.unwrap().data[..],
        b"payload"
    );
    assert!(storage.get_object("src", "a.txt").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_segmented_upload_reads_back_whole() {
    let storage = storage_with("big", &[]).await;
    let data = Bytes::from((0..=255_u8).cycle().take(1000).collect::<Vec<_>>());
    let options = CreateObjectOptions {
        content_type: Some("application/x-iso9660-image".to_string()),
        metadata: Metadata::new().with("kind", "iso"),
        delete_after: Some(Duration::from_secs(3600)),
    };

    let before = Utc::now();
    let segments = storage
        .upload_segmented("big", "disk.iso", data.clone(), 300, &options)
        .await
        .unwrap();
    assert_eq!(segments, 4);

    let content = storage.get_object("big", "disk.iso").await.unwrap();
    assert_eq!(content.data, data);
    assert_eq!(content.headers.content_length, 1000);
    assert_eq!(content.headers.object_manifest.as_deref(), Some("big/disk.iso/"));
    assert_eq!(content.headers.metadata.get("kind"), Some("iso"));
    assert_eq!(
        content.headers.content_type.as_deref(),
        Some("application/x-iso9660-image")
    );
    let delete_at = content.headers.delete_at.unwrap();
    assert!(delete_at >= before + chrono::TimeDelta::seconds(3600));

    // manifest etags look like plain ones
    let etag = content.headers.etag.unwrap();
    assert_eq!(etag.len(), 32);
    assert!(!etag.contains('"'));

    // segments expire with the manifest
    let segment = storage
        .get_object_headers("big", "disk.iso/00000000")
        .await
        .unwrap();
    assert!(segment.delete_at.is_some());
}

#[tokio::test]
async fn test_bulk_delete_counts_outcomes() {
    let storage = storage_with("c", &[("a", "1"), ("b", "2")]).await;
    storage.create_container("empty", &Metadata::new()).await.unwrap();
    storage.create_container("full", &Metadata::new()).await.unwrap();
    storage
        .create_object("full", "x", Bytes::from_static(b"x"), &CreateObjectOptions::default())
        .await
        .unwrap();

    let paths: Vec<String> = ["c/a", "/c/b", "c/missing", "empty", "full"]
        .iter()
        .map(|p| (*p).to_string())
        .collect();
    let result = storage.bulk_delete(&paths).await.unwrap();
    assert_eq!(result.deleted, 3);
    assert_eq!(result.not_found, 1);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].path, "full");
    assert_eq!(result.errors[0].status, "409 Conflict");
}

#[tokio::test]
async fn test_extract_archive_into_account_and_container() {
    let storage = InMemoryObjectStorage::new();
    let archive = tar_gz(&[
        ("site/index.html", &b"<html/>"[..]),
        ("site/css/main.css", &b"body{}"[..]),
        ("loose.txt", &b"no container"[..]),
    ]);

    let result = storage
        .extract_archive("", ArchiveFormat::TarGz, archive)
        .await
        .unwrap();
    assert_eq!(result.files_created, 2);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].path, "loose.txt");
    assert_eq!(
        &storage.get_object("site", "css/main.css").await.unwrap().data[..],
        b"body{}"
    );

    let result = storage
        .extract_archive("backup/2024", ArchiveFormat::TarGz, tar_gz(&[("a.txt", &b"a"[..])]))
        .await
        .unwrap();
    assert_eq!(result.files_created, 1);
    assert!(storage.get_object("backup", "2024/a.txt").await.is_ok());

    let err = storage
        .extract_archive("x", ArchiveFormat::TarBz2, Bytes::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));
}

#[tokio::test]
async fn test_cdn_lifecycle() {
    let storage = storage_with("site", &[("index.html", "<html/>")]).await;
    assert!(storage.get_cdn_container("site").await.unwrap_err().is_not_found());

    let cdn = storage.enable_cdn("site", 3600).await.unwrap();
    assert!(cdn.cdn_enabled);
    assert!(cdn.cdn_uri.unwrap().ends_with("/site"));
    storage
        .purge_cdn_object("site", "index.html", Some("ops@example.com"))
        .await
        .unwrap();
    assert!(
        storage
            .purge_cdn_object("site", "missing.html", None)
            .await
            .unwrap_err()
            .is_not_found()
    );

    storage.disable_cdn("site").await.unwrap();
    let cdn = storage.get_cdn_container("site").await.unwrap();
    assert!(!cdn.cdn_enabled);
    assert_eq!(storage.list_all_cdn_containers().await.unwrap().len(), 1);
    assert!(
        storage
            .purge_cdn_object("site", "index.html", None)
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_temp_url_verifies_against_account_key() {
    let storage = storage_with("docs", &[("report.pdf", "%PDF")]).await;
    let request = TempUrlRequest::get("docs", "report.pdf", Duration::from_secs(120));
    assert!(storage.create_temp_url(&request).await.unwrap_err().is_not_found());

    storage
        .update_account_metadata(&Metadata::new().with("Temp-URL-Key", "k3y"))
        .await
        .unwrap();
    let url = reqwest::Url::parse(&storage.create_temp_url(&request).await.unwrap()).unwrap();
    let query: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
    let expires: i64 = query["temp_url_expires"].parse().unwrap();
    let signer = TempUrlSigner::new("k3y");

    assert!(signer.verify(
        TempUrlMethod::Get,
        expires,
        url.path(),
        &query["temp_url_sig"],
        Utc::now()
    ));
    assert!(!signer.verify(
        TempUrlMethod::Put,
        expires,
        url.path(),
        &query["temp_url_sig"],
        Utc::now()
    ));
    assert!(!signer.verify(
        TempUrlMethod::Get,
        expires,
        url.path(),
        &query["temp_url_sig"],
        Utc::now() + chrono::Duration::seconds(121)
    ));
}
