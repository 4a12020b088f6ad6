//! Object storage scenarios

use std::io::Write;
use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use flate2::Compression;
use flate2::write::GzEncoder;
use rcs_domain::error::Result;
use rcs_domain::pagination::PageRequest;
use rcs_domain::value_objects::{
    ArchiveFormat, ContainerCreated, CreateObjectOptions, Metadata, ObjectListOptions,
    TempUrlRequest,
};
use rcs_integration::TestHarness;

async fn create_container(h: &TestHarness) -> Result<String> {
    let name = h.unique_name("container");
    h.object_storage()
        .create_container(&name, &Metadata::new())
        .await?;
    Ok(name)
}

async fn put(h: &TestHarness, container: &str, name: &str, data: &'static [u8]) -> Result<()> {
    h.object_storage()
        .create_object(
            container,
            name,
            Bytes::from_static(data),
            &CreateObjectOptions::default(),
        )
        .await
}

fn tar_gz(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (path, content) in files {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(u64::try_from(content.len()).unwrap());
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, path, *content).unwrap();
    }
    let mut encoder = builder.into_inner().unwrap();
    encoder.flush().unwrap();
    encoder.finish().unwrap()
}

async fn container_lifecycle(h: &TestHarness) -> Result<()> {
    let name = h.unique_name("container");
    let metadata = Metadata::new().with("Project", "rcs");
    assert_eq!(
        h.object_storage().create_container(&name, &metadata).await?,
        ContainerCreated::Created
    );
    assert_eq!(
        h.object_storage()
            .create_container(&name, &Metadata::new())
            .await?,
        ContainerCreated::AlreadyExists
    );

    let listed = h.object_storage().list_all_containers().await?;
    assert!(listed.iter().any(|c| c.name == name));
    assert_eq!(
        h.object_storage()
            .get_container_metadata(&name)
            .await?
            .get("project"),
        Some("rcs")
    );

    put(h, &name, "readme.txt", b"hello").await?;
    let err = h
        .object_storage()
        .delete_container(&name, false)
        .await
        .unwrap_err();
    assert!(err.is_conflict());

    h.object_storage().delete_container(&name, true).await?;
    assert!(
        h.object_storage()
            .get_container_headers(&name)
            .await
            .unwrap_err()
            .is_not_found()
    );
    Ok(())
}

async fn container_and_account_metadata(h: &TestHarness) -> Result<()> {
    let name = create_container(h).await?;
    h.object_storage()
        .update_container_metadata(&name, &Metadata::new().with("owner", "ops").with("tier", "2"))
        .await?;
    h.object_storage()
        .delete_container_metadata(&name, &["tier".to_string()])
        .await?;
    let metadata = h.object_storage().get_container_metadata(&name).await?;
    assert_eq!(metadata.get("owner"), Some("ops"));
    assert!(!metadata.contains_key("tier"));

    h.object_storage()
        .update_account_metadata(&Metadata::new().with("rcs-it-marker", "1"))
        .await?;
    let account = h.object_storage().get_account_headers().await?;
    assert_eq!(account.metadata.get("rcs-it-marker"), Some("1"));
    assert!(account.container_count >= 1);

    // a blank value removes the key
    h.object_storage()
        .update_account_metadata(&Metadata::new().with("rcs-it-marker", ""))
        .await?;
    let account = h.object_storage().get_account_headers().await?;
    assert!(!account.metadata.contains_key("rcs-it-marker"));
    Ok(())
}

async fn object_lifecycle(h: &TestHarness) -> Result<()> {
    let container = create_container(h).await?;
    let options = CreateObjectOptions {
        content_type: Some("text/plain".to_string()),
        metadata: Metadata::new().with("Author", "integration"),
        delete_after: None,
    };
    h.object_storage()
        .create_object(
            &container,
            "docs/guide.txt",
            Bytes::from_static(b"rackspace cloud files"),
            &options,
        )
        .await?;

    let content = h
        .object_storage()
        .get_object(&container, "docs/guide.txt")
        .await?;
    assert_eq!(&content.data[..], b"rackspace cloud files");
    assert_eq!(content.headers.content_length, 21);
    assert_eq!(content.headers.content_type.as_deref(), Some("text/plain"));
    assert!(content.headers.etag.is_some());
    assert!(
        content
            .headers
            .last_modified
            .is_some_and(|at| at <= Utc::now())
    );

    h.object_storage()
        .update_object_metadata(
            &container,
            "docs/guide.txt",
            &Metadata::new().with("reviewed", "yes"),
        )
        .await?;
    h.object_storage()
        .delete_object_metadata(&container, "docs/guide.txt", &["author".to_string()])
        .await?;
    let metadata = h
        .object_storage()
        .get_object_metadata(&container, "docs/guide.txt")
        .await?;
    assert_eq!(metadata.get("reviewed"), Some("yes"));
    assert!(!metadata.contains_key("author"));

    h.object_storage()
        .delete_object(&container, "docs/guide.txt")
        .await?;
    assert!(
        h.object_storage()
            .get_object(&container, "docs/guide.txt")
            .await
            .unwrap_err()
            .is_not_found()
    );
    Ok(())
}

async fn copy_and_move(h: &TestHarness) -> Result<()> {
    let source = create_container(h).await?;
    let target = create_container(h).await?;
    put(h, &source, "report.csv", b"a,b\n1,2\n").await?;

    h.object_storage()
        .copy_object(&source, "report.csv", &target, "copy.csv")
        .await?;
    let copy = h.object_storage().get_object(&target, "copy.csv").await?;
    assert_eq!(&copy.data[..], b"a,b\n1,2\n");

    h.object_storage()
        .move_object(&source, "report.csv", &target, "moved.csv")
        .await?;
    assert!(
        h.object_storage()
            .get_object_headers(&source, "report.csv")
            .await
            .unwrap_err()
            .is_not_found()
    );
    assert!(
        h.object_storage()
            .get_object_headers(&target, "moved.csv")
            .await
            .is_ok()
    );
    Ok(())
}

async fn prefix_listing_and_pagination(h: &TestHarness) -> Result<()> {
    let container = create_container(h).await?;
    for name in ["a.txt", "logs/2024-01.log", "logs/2024-02.log", "logs/archive/2023.log", "z.txt"] {
        put(h, &container, name, b"x").await?;
    }

    let logs = h
        .object_storage()
        .list_all_objects(&container, &ObjectListOptions::prefix("logs/"))
        .await?;
    assert_eq!(logs.len(), 3);

    let folded = h
        .object_storage()
        .list_all_objects(
            &container,
            &ObjectListOptions::prefix("logs/").with_delimiter('/'),
        )
        .await?;
    let names: Vec<&str> = folded.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, ["logs/2024-01.log", "logs/2024-02.log", "logs/archive/"]);
    assert!(folded[2].is_directory());

    let first = h
        .object_storage()
        .list_objects(
            &container,
            &ObjectListOptions::default(),
            PageRequest::first(Some(2)),
        )
        .await?;
    assert_eq!(first.len(), 2);
    let marker = first.next_marker().map(str::to_string).unwrap();
    let second = h
        .object_storage()
        .list_objects(
            &container,
            &ObjectListOptions::default(),
            PageRequest::first(Some(2)).after(marker),
        )
        .await?;
    assert_eq!(second.items()[0].name, "logs/2024-02.log");
    Ok(())
}

async fn segmented_upload(h: &TestHarness) -> Result<()> {
    let container = create_container(h).await?;
    let data = Bytes::from((0..2500u32).map(|i| u8::try_from(i % 251).unwrap()).collect::<Vec<u8>>());
    let options = CreateObjectOptions {
        content_type: Some("application/x-raw-disk-image".to_string()),
        metadata: Metadata::new().with("kind", "backup"),
        delete_after: Some(Duration::from_secs(3600)),
    };
    let segment_size = h.segment_size();
    let expected = data.len().div_ceil(segment_size);

    let segments = h
        .object_storage()
        .upload_segmented(&container, "backup.img", data.clone(), segment_size, &options)
        .await?;
    assert_eq!(segments, expected);

    let content = h
        .object_storage()
        .get_object(&container, "backup.img")
        .await?;
    assert_eq!(content.data, data);
    assert!(content.headers.object_manifest.is_some());
    assert_eq!(content.headers.metadata.get("kind"), Some("backup"));
    assert_eq!(
        content.headers.content_type.as_deref(),
        Some("application/x-raw-disk-image")
    );
    assert!(content.headers.delete_at.is_some());

    let parts = h
        .object_storage()
        .list_all_objects(&container, &ObjectListOptions::prefix("backup.img/"))
        .await?;
    assert_eq!(parts.len(), expected);

    // past the configured size, plain uploads switch to segments
    let written = h
        .services()
        .upload_object(&container, "auto.img", data.clone(), &CreateObjectOptions::default())
        .await?;
    assert_eq!(written, if data.len() > segment_size { expected } else { 0 });
    let auto = h.object_storage().get_object(&container, "auto.img").await?;
    assert_eq!(auto.data, data);

    assert!(
        h.object_storage()
            .upload_segmented(&container, "empty", Bytes::new(), 0, &options)
            .await
            .is_err()
    );
    Ok(())
}

async fn bulk_delete(h: &TestHarness) -> Result<()> {
    let container = create_container(h).await?;
    put(h, &container, "one", b"1").await?;
    put(h, &container, "two", b"2").await?;

    let paths = vec![
        format!("{container}/one"),
        format!("{container}/two"),
        format!("{container}/missing"),
    ];
    let result = h.object_storage().bulk_delete(&paths).await?;
    assert!(result.is_success());
    assert_eq!(result.deleted, 2);
    assert_eq!(result.not_found, 1);

    let result = h.object_storage().bulk_delete(&[container.clone()]).await?;
    assert_eq!(result.deleted, 1);
    Ok(())
}

async fn extract_archive(h: &TestHarness) -> Result<()> {
    let container = create_container(h).await?;
    let archive = tar_gz(&[("site/index.html", b"<h1>hi</h1>"), ("site/app.js", b"run()")]);

    let result = h
        .object_storage()
        .extract_archive(&container, ArchiveFormat::TarGz, Bytes::from(archive))
        .await?;
    assert_eq!(result.files_created, 2);
    assert!(result.errors.is_empty());

    let index = h
        .object_storage()
        .get_object(&container, "site/index.html")
        .await?;
    assert_eq!(&index.data[..], b"<h1>hi</h1>");
    Ok(())
}

async fn cdn_publishing(h: &TestHarness) -> Result<()> {
    let container = create_container(h).await?;
    put(h, &container, "logo.png", b"png").await?;

    let cdn = h.object_storage().enable_cdn(&container, 900).await?;
    assert!(cdn.cdn_enabled);
    assert_eq!(cdn.ttl, 900);
    assert!(cdn.cdn_uri.is_some());

    let listed = h.object_storage().list_all_cdn_containers().await?;
    assert!(listed.iter().any(|c| c.name == container && c.cdn_enabled));

    h.object_storage()
        .purge_cdn_object(&container, "logo.png", Some("ops@example.com"))
        .await?;

    h.object_storage().disable_cdn(&container).await?;
    assert!(
        !h.object_storage()
            .get_cdn_container(&container)
            .await?
            .cdn_enabled
    );
    Ok(())
}

async fn temp_url(h: &TestHarness) -> Result<()> {
    let container = create_container(h).await?;
    put(h, &container, "invoice.pdf", b"%PDF").await?;
    h.object_storage()
        .update_account_metadata(&Metadata::new().with("Temp-Url-Key", "integration-secret"))
        .await?;

    let url = h
        .object_storage()
        .create_temp_url(&TempUrlRequest::get(
            &container,
            "invoice.pdf",
            Duration::from_secs(300),
        ))
        .await?;
    assert!(url.contains(&format!("/{container}/invoice.pdf")));
    assert!(url.contains("temp_url_sig="));
    assert!(url.contains("temp_url_expires="));
    Ok(())
}

async fn expiring_object(h: &TestHarness) -> Result<()> {
    if h.is_live() {
        return Ok(());
    }
    let container = create_container(h).await?;
    let options = CreateObjectOptions {
        delete_after: Some(Duration::from_millis(20)),
        ..CreateObjectOptions::default()
    };
    h.object_storage()
        .create_object(&container, "short-lived", Bytes::from_static(b"tmp"), &options)
        .await?;
    assert!(
        h.object_storage()
            .get_object(&container, "short-lived")
            .await
            .is_ok()
    );

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert!(
        h.object_storage()
            .get_object(&container, "short-lived")
            .await
            .unwrap_err()
            .is_not_found()
    );
    Ok(())
}

rcs_integration::scenarios!(
    container_lifecycle,
    container_and_account_metadata,
    object_lifecycle,
    copy_and_move,
    prefix_listing_and_pagination,
    segmented_upload,
    bulk_delete,
    extract_archive,
    cdn_publishing,
    temp_url,
    expiring_object,
);
