//! End to end walk through a tree's life, on disk and in memory

mod common;

use ::common::prelude::*;

async fn walk<B: BlockStore>(fs: &PrivateFs<B>) {
    let v0 = fs.init(&common::ZERO_KEY).await.unwrap();
    let v1 = fs.mkdir(&v0, "docs").await.unwrap();
    let v2 = fs.write_file(&v1, "docs/note.txt", b"hello").await.unwrap();

    let entries = fs.ls(&v2, "docs").await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "note.txt");
    assert_eq!(fs.read_file(&v2, "docs/note.txt").await.unwrap(), b"hello");

    let v3 = fs.rm(&v2, "docs/note.txt").await.unwrap();
    assert!(fs.ls(&v3, "docs").await.unwrap().is_empty());

    let cids = [v0.cid(), v1.cid(), v2.cid(), v3.cid()];
    for (i, a) in cids.iter().enumerate() {
        for b in &cids[i + 1..] {
            assert_ne!(a, b);
        }
    }

    // every step is still readable, and the chain links them newest first
    assert_eq!(fs.read_file(&v2, "docs/note.txt").await.unwrap(), b"hello");
    let history = fs.history(&v3).await.unwrap();
    assert_eq!(&history[..4], &[*v3.cid(), *v2.cid(), *v1.cid(), *v0.cid()]);

    // the zero key finds the latest revision it is handed
    let reloaded = fs
        .load_with_key(&RootKey::from(common::ZERO_KEY), v3.cid())
        .await
        .unwrap();
    assert_eq!(reloaded, v3);
}

#[tokio::test]
async fn test_scenario_in_memory() {
    walk(&PrivateFs::new(MemoryBlockStore::new())).await;
}

#[tokio::test]
async fn test_scenario_on_disk() {
    let (fs, _, _temp) = common::setup_file_env().await;
    walk(&fs).await;
}

#[tokio::test]
async fn test_reopen_from_disk() {
    let temp = tempfile::TempDir::new().unwrap();
    let blocks = temp.path().join("blocks");

    let token = {
        let store = ::common::store::FileBlockStore::open(&blocks).await.unwrap();
        let fs = PrivateFs::new(store);
        let v0 = fs.init(&common::ZERO_KEY).await.unwrap();
        fs.write_file(&v0, "/kept.txt", b"survives").await.unwrap().to_string()
    };

    let store = ::common::store::FileBlockStore::open(&blocks).await.unwrap();
    let fs = PrivateFs::new(store);
    let version: Version = token.parse().unwrap();
    assert_eq!(fs.read_file(&version, "/kept.txt").await.unwrap(), b"survives");
}

#[tokio::test]
async fn test_scenario_through_iroh_blobs() {
    let fs = PrivateFs::new(::common::store::BlobsBlockStore::memory());
    walk(&fs).await;
}
