//! Shared test utilities for protocol integration tests
#![allow(dead_code)]

use ::common::prelude::*;
use ::common::store::FileBlockStore;
use tempfile::TempDir;

/// The 32 zero byte key used by the reference scenario
pub const ZERO_KEY: [u8; 32] = [0u8; 32];

/// An engine over an in-memory store, plus the Version of a fresh tree
pub async fn setup_test_env() -> (PrivateFs<MemoryBlockStore>, Version) {
    let fs = PrivateFs::new(MemoryBlockStore::new());
    let version = fs.init(RootKey::generate().bytes()).await.unwrap();
    (fs, version)
}

/// Same as [`setup_test_env`] but with blocks on disk
pub async fn setup_file_env() -> (PrivateFs<FileBlockStore>, Version, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = FileBlockStore::open(temp_dir.path().join("blocks"))
        .await
        .unwrap();
    let fs = PrivateFs::new(store);
    let version = fs.init(&ZERO_KEY).await.unwrap();
    (fs, version, temp_dir)
}

/// Entry names of a directory listing, in listing order
pub async fn names<B: BlockStore>(fs: &PrivateFs<B>, version: &Version, path: &str) -> Vec<String> {
    fs.ls(version, path)
        .await
        .unwrap()
        .into_iter()
        .map(|entry| entry.name)
        .collect()
}
