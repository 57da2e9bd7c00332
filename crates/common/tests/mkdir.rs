//! Integration tests for mkdir

mod common;

use ::common::prelude::*;

#[tokio::test]
async fn test_mkdir() {
    let (fs, v0) = common::setup_test_env().await;
    let v1 = fs.mkdir(&v0, "/test_dir").await.unwrap();

    let items = fs.ls(&v1, "/").await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "test_dir");
    assert!(items[0].is_dir());
    assert_ne!(v0.cid(), v1.cid());
}

#[tokio::test]
async fn test_mkdir_nested() {
    let (fs, v0) = common::setup_test_env().await;
    let v1 = fs.mkdir(&v0, "a/b/c").await.unwrap();

    assert_eq!(common::names(&fs, &v1, "/").await, vec!["a"]);
    assert_eq!(common::names(&fs, &v1, "/a").await, vec!["b"]);
    assert_eq!(common::names(&fs, &v1, "/a/b").await, vec!["c"]);
    assert!(fs.ls(&v1, "/a/b/c").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_mkdir_existing_dir_is_noop() {
    let (fs, v0) = common::setup_test_env().await;
    let v1 = fs.mkdir(&v0, "/docs").await.unwrap();
    let v2 = fs.mkdir(&v1, "/docs").await.unwrap();

    assert_ne!(v1.cid(), v2.cid());
    assert_eq!(common::names(&fs, &v2, "/").await, vec!["docs"]);
}

#[tokio::test]
async fn test_mkdir_idempotent_from_equal_versions() {
    let (fs, v0) = common::setup_test_env().await;
    let copy: Version = v0.to_string().parse().unwrap();

    let a = fs.mkdir(&v0, "/x/y").await.unwrap();
    let b = fs.mkdir(&copy, "/x/y").await.unwrap();

    assert_eq!(common::names(&fs, &a, "/x").await, common::names(&fs, &b, "/x").await);
}

#[tokio::test]
async fn test_mkdir_over_file_fails() {
    let (fs, v0) = common::setup_test_env().await;
    let v1 = fs.write_file(&v0, "/test.txt", b"data").await.unwrap();

    let err = fs.mkdir(&v1, "/test.txt").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);

    let err = fs.mkdir(&v1, "/test.txt/inner").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotADirectory);
}

#[tokio::test]
async fn test_mkdir_root_is_noop() {
    let (fs, v0) = common::setup_test_env().await;
    let v1 = fs.mkdir(&v0, "/").await.unwrap();
    assert_ne!(v0.cid(), v1.cid());
    assert!(fs.ls(&v1, "/").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_mkdir_rejects_bad_paths() {
    let (fs, v0) = common::setup_test_env().await;
    for path in ["/a//b", "/a/../b", "./a"] {
        let err = fs.mkdir(&v0, path).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPath, "{}", path);
    }
}

#[tokio::test]
async fn test_old_version_is_unchanged() {
    let (fs, v0) = common::setup_test_env().await;
    let v1 = fs.mkdir(&v0, "/later").await.unwrap();

    assert!(fs.ls(&v0, "/").await.unwrap().is_empty());
    assert_eq!(common::names(&fs, &v1, "/").await, vec!["later"]);
}
