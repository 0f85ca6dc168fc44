mod common;

use std::sync::atomic::Ordering;

use bytes::Bytes;

use mycloud_core::error::{ErrorKind, ValidationReason};
use mycloud_database::FileRepository;
use mycloud_service::UploadParams;

use common::{Harness, actor};

#[tokio::test]
async fn test_upload_into_own_folder() {
    let h = Harness::new().await;
    let user = actor();
    let folder = h.folders.create_folder(&user, "Test Folder", None).await.unwrap();

    let file = h
        .uploads
        .upload(
            &user,
            UploadParams {
                folder_id: Some(folder.id),
                file_name: "test.txt".into(),
                comment: Some("Test comment".into()),
                data: Bytes::from_static(b"Test file content"),
            },
        )
        .await
        .unwrap();

    assert_eq!(file.original_name, "test.txt");
    assert_eq!(file.size, 17);
    assert_eq!(file.owner_id, user.user_id);
    assert_eq!(file.folder_id, Some(folder.id));
    assert_eq!(file.comment.as_deref(), Some("Test comment"));
    assert!(file.last_download_date.is_none());
    assert!(file.public_link.is_none());
    assert_eq!(
        file.storage_path,
        format!("users/{}/{}.txt", user.user_id, file.id)
    );

    let stored = h.storage.root().join(&file.storage_path);
    assert_eq!(std::fs::read(stored).unwrap(), b"Test file content");
}

#[tokio::test]
async fn test_upload_to_root_scope() {
    let h = Harness::new().await;
    let user = actor();
    let file = h.upload(&user, None, "notes.TXT", "hi").await.unwrap();
    assert!(file.folder_id.is_none());
    assert!(file.storage_path.ends_with(".txt"));
}

#[tokio::test]
async fn test_invalid_extension_creates_nothing() {
    let h = Harness::new().await;
    let user = actor();

    let err = h.upload(&user, None, "test.invalid", "data").await.unwrap_err();

    assert!(err.is(ErrorKind::Validation));
    assert!(err.has_reason(ValidationReason::InvalidExtension));
    assert_eq!(err.field.as_deref(), Some("file"));
    assert_eq!(err.message, "Invalid file extension: .invalid");
    assert_eq!(h.catalog.file_count().await, 0);
    assert!(h.stored_files().is_empty());
}

#[tokio::test]
async fn test_name_without_extension_is_rejected() {
    let h = Harness::new().await;
    let err = h.upload(&actor(), None, "Makefile", "all:").await.unwrap_err();
    assert!(err.has_reason(ValidationReason::InvalidExtension));
    assert!(h.stored_files().is_empty());
}

#[tokio::test]
async fn test_empty_and_oversized_uploads_are_rejected() {
    let h = Harness::new().await;
    let user = actor();

    let err = h.upload(&user, None, "  ", "x").await.unwrap_err();
    assert!(err.has_reason(ValidationReason::EmptyName));

    let big = "x".repeat(1025);
    let err = h.upload(&user, None, "big.txt", &big).await.unwrap_err();
    assert!(err.has_reason(ValidationReason::TooLarge));
    assert_eq!(err.field.as_deref(), Some("file"));

    assert_eq!(h.catalog.file_count().await, 0);
    assert!(h.stored_files().is_empty());
}

#[tokio::test]
async fn test_path_like_names_are_rejected() {
    let h = Harness::new().await;
    let user = actor();

    for name in ["../../evil.txt", "a/b.txt", "dir\\b.txt", ".."] {
        let err = h.upload(&user, None, name, "data").await.unwrap_err();
        assert!(err.has_reason(ValidationReason::InvalidName), "{name}");
        assert_eq!(err.field.as_deref(), Some("file"));
    }

    assert_eq!(h.catalog.file_count().await, 0);
    assert!(h.stored_files().is_empty());
}

#[tokio::test]
async fn test_upload_into_foreign_folder_is_denied() {
    let h = Harness::new().await;
    let owner = actor();
    let intruder = actor();
    let folder = h.folders.create_folder(&owner, "Private", None).await.unwrap();

    let err = h
        .upload(&intruder, Some(folder.id), "test.txt", "data")
        .await
        .unwrap_err();

    assert!(err.is(ErrorKind::Authorization));
    assert_eq!(err.message, "You do not have access to this folder");
    assert_eq!(h.catalog.file_count().await, 0);
    assert!(h.stored_files().is_empty());
}

#[tokio::test]
async fn test_upload_into_unknown_folder_is_denied() {
    let h = Harness::new().await;
    let err = h
        .upload(&actor(), Some(uuid::Uuid::new_v4()), "test.txt", "data")
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::Authorization));
}

#[tokio::test]
async fn test_duplicate_name_in_same_folder() {
    let h = Harness::new().await;
    let user = actor();
    let folder = h.folders.create_folder(&user, "Docs", None).await.unwrap();

    h.upload(&user, Some(folder.id), "a.txt", "one").await.unwrap();
    let err = h
        .upload(&user, Some(folder.id), "a.txt", "two")
        .await
        .unwrap_err();

    assert!(err.has_reason(ValidationReason::DuplicateName));
    assert_eq!(err.field.as_deref(), Some("file"));
    assert_eq!(h.catalog.file_count().await, 1);
    assert_eq!(h.stored_files().len(), 1);

    // Same name elsewhere is fine.
    h.upload(&user, None, "a.txt", "root").await.unwrap();
    h.upload(&actor(), None, "a.txt", "other user").await.unwrap();
}

#[tokio::test]
async fn test_index_conflict_is_reported_as_duplicate_and_content_removed() {
    let h = Harness::new().await;
    let user = actor();
    h.upload(&user, None, "race.txt", "first").await.unwrap();

    h.flaky.hide_names.store(true, Ordering::SeqCst);
    let err = h.upload(&user, None, "race.txt", "second").await.unwrap_err();

    assert!(err.has_reason(ValidationReason::DuplicateName));
    assert_eq!(err.field.as_deref(), Some("file"));
    assert_eq!(h.catalog.file_count().await, 1);
    assert_eq!(h.stored_files().len(), 1);
}

#[tokio::test]
async fn test_failed_insert_removes_written_content() {
    let h = Harness::new().await;
    let user = actor();

    h.flaky.fail_create.store(true, Ordering::SeqCst);
    let err = h.upload(&user, None, "lost.txt", "data").await.unwrap_err();

    assert!(err.is(ErrorKind::Database));
    assert_eq!(h.catalog.file_count().await, 0);
    assert!(h.stored_files().is_empty());
}

#[tokio::test]
async fn test_failed_write_creates_no_record() {
    let h = Harness::new().await;
    let user = actor();

    h.storage.fail_write.store(true, Ordering::SeqCst);
    let err = h.upload(&user, None, "unsaved.txt", "data").await.unwrap_err();

    assert!(err.is(ErrorKind::Storage));
    assert_eq!(h.catalog.file_count().await, 0);
    assert!(h.stored_files().is_empty());

    h.storage.fail_write.store(false, Ordering::SeqCst);
    h.upload(&user, None, "unsaved.txt", "data").await.unwrap();
}

#[tokio::test]
async fn test_concurrent_duplicate_uploads_leave_one_file() {
    let h = Harness::new().await;
    let user = actor();

    let (a, b) = tokio::join!(
        h.upload(&user, None, "same.txt", "a"),
        h.upload(&user, None, "same.txt", "b"),
    );
    assert!(a.is_ok() ^ b.is_ok());

    let files = h.catalog.list_in_folder(user.user_id, None).await.unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(h.stored_files().len(), 1);
}
