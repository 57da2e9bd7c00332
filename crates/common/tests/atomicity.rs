//! A mutation whose store writes fail part way leaves no trace in the
//! Version it started from

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use ::common::prelude::*;

/// A store that fails exactly one put, picked by position
#[derive(Debug)]
struct FlakyStore {
    inner: MemoryBlockStore,
    puts: AtomicUsize,
    fail_at: AtomicUsize,
}

impl FlakyStore {
    fn new() -> Self {
        Self {
            inner: MemoryBlockStore::new(),
            puts: AtomicUsize::new(0),
            fail_at: AtomicUsize::new(usize::MAX),
        }
    }

    /// Fail the `n`-th put from now (0 is the next one)
    fn fail_put(&self, n: usize) {
        self.fail_at
            .store(self.puts.load(Ordering::SeqCst) + n, Ordering::SeqCst);
    }
}

#[async_trait]
impl BlockStore for FlakyStore {
    async fn put(&self, data: Bytes, codec: Codec) -> Result<Cid, BlockStoreError> {
        let index = self.puts.fetch_add(1, Ordering::SeqCst);
        if index == self.fail_at.load(Ordering::SeqCst) {
            return Err(BlockStoreError::Io(std::io::Error::other("disk full")));
        }
        self.inner.put(data, codec).await
    }

    async fn get(&self, cid: &Cid) -> Result<Bytes, BlockStoreError> {
        self.inner.get(cid).await
    }
}

async fn setup() -> (PrivateFs<Arc<FlakyStore>>, Arc<FlakyStore>, Version) {
    let store = Arc::new(FlakyStore::new());
    let fs = PrivateFs::with_config(store.clone(), FsConfig::with_chunk_size(4));
    let v0 = fs.init(&[]).await.unwrap();
    let v1 = fs.write_file(&v0, "/keep/note.txt", b"stays put").await.unwrap();
    (fs, store, v1)
}

async fn assert_intact(fs: &PrivateFs<Arc<FlakyStore>>, version: &Version) {
    assert_eq!(common::names(fs, version, "/").await, vec!["keep"]);
    assert_eq!(common::names(fs, version, "/keep").await, vec!["note.txt"]);
    assert_eq!(
        fs.read_file(version, "/keep/note.txt").await.unwrap(),
        b"stays put"
    );
}

#[tokio::test]
async fn test_failed_mkdir_is_storage_error() {
    let (fs, store, v1) = setup().await;

    let mut failures = 0;
    for n in 0.. {
        store.fail_put(n);
        match fs.mkdir(&v1, "a/b/c").await {
            Err(err) => {
                assert_eq!(err.kind(), ErrorKind::Storage, "put {}: {}", n, err);
                assert!(err.is_retryable());
                assert_intact(&fs, &v1).await;
                failures += 1;
            }
            Ok(v2) => {
                assert_eq!(common::names(&fs, &v2, "/a/b").await, vec!["c"]);
                break;
            }
        }
    }
    // three new directories, the resealed root and the forest at least
    assert!(failures >= 5, "only {} puts failed", failures);
}

#[tokio::test]
async fn test_failed_write_is_storage_error() {
    let (fs, store, v1) = setup().await;

    let mut failures = 0;
    for n in 0.. {
        store.fail_put(n);
        match fs.write_file(&v1, "/keep/new.txt", b"three chunks!").await {
            Err(err) => {
                assert_eq!(err.kind(), ErrorKind::Storage, "put {}: {}", n, err);
                assert_intact(&fs, &v1).await;
                failures += 1;
            }
            Ok(v2) => {
                assert_eq!(
                    fs.read_file(&v2, "/keep/new.txt").await.unwrap(),
                    b"three chunks!"
                );
                break;
            }
        }
    }
    assert!(failures >= 4, "only {} puts failed", failures);
}

#[tokio::test]
async fn test_failed_overwrite_keeps_old_content() {
    let (fs, store, v1) = setup().await;

    store.fail_put(1);
    let err = fs
        .write_file(&v1, "/keep/note.txt", b"replacement")
        .await
        .unwrap_err();
    assert!(matches!(err, MountError::Store(BlockStoreError::Io(_))));
    assert_eq!(err.kind(), ErrorKind::Storage);
    assert_intact(&fs, &v1).await;
}
