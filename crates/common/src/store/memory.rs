use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;

use super::{BlockStore, BlockStoreError, ByteCounters, StoreStats};
use crate::linked_data::{compute_cid, Cid, Codec};

#[derive(Debug, Clone)]
struct Block {
    codec: Codec,
    data: Bytes,
}

/// Block store held entirely in memory.
///  Clones share the same blocks.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlockStore {
    inner: Arc<RwLock<HashMap<Cid, Block>>>,
    counters: Arc<ByteCounters>,
}

impl MemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Codec recorded by the first put of a block
    pub fn codec(&self, cid: &Cid) -> Option<Codec> {
        self.inner.read().get(cid).map(|block| block.codec)
    }

    pub fn cids(&self) -> Vec<Cid> {
        self.inner.read().keys().copied().collect()
    }

    /// Drop a block. Blocks are otherwise never removed.
    pub fn evict(&self, cid: &Cid) -> bool {
        self.inner.write().remove(cid).is_some()
    }
}

#[async_trait]
impl BlockStore for MemoryBlockStore {
    async fn put(&self, data: Bytes, codec: Codec) -> Result<Cid, BlockStoreError> {
        let cid = compute_cid(&data);
        self.counters.record_put(data.len());
        tracing::trace!("MemoryBlockStore::put: {} ({} bytes, {})", cid, data.len(), codec);
        self.inner
            .write()
            .entry(cid)
            .or_insert(Block { codec, data });
        Ok(cid)
    }

    async fn get(&self, cid: &Cid) -> Result<Bytes, BlockStoreError> {
        let data = self
            .inner
            .read()
            .get(cid)
            .map(|block| block.data.clone())
            .ok_or(BlockStoreError::NotFound(*cid))?;
        self.counters.record_get(data.len());
        Ok(data)
    }

    async fn has(&self, cid: &Cid) -> Result<bool, BlockStoreError> {
        Ok(self.inner.read().contains_key(cid))
    }

    fn stats(&self) -> StoreStats {
        self.counters.snapshot()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_put_get() {
        let store = MemoryBlockStore::new();
        let cid = store
            .put(Bytes::from_static(b"hello"), Codec::RAW)
            .await
            .unwrap();
        assert_eq!(store.get(&cid).await.unwrap().as_ref(), b"hello");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_first_codec_is_kept() {
        let store = MemoryBlockStore::new();
        let a = store
            .put(Bytes::from_static(b"same"), Codec::DAG_CBOR)
            .await
            .unwrap();
        let b = store.put(Bytes::from_static(b"same"), Codec::RAW).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
        assert_eq!(store.codec(&a), Some(Codec::DAG_CBOR));
    }

    #[tokio::test]
    async fn test_missing_block() {
        let store = MemoryBlockStore::new();
        let cid = compute_cid(b"never stored");
        assert!(matches!(
            store.get(&cid).await,
            Err(BlockStoreError::NotFound(c)) if c == cid
        ));
        assert!(!store.has(&cid).await.unwrap());
    }

    #[tokio::test]
    async fn test_counters() {
        let store = MemoryBlockStore::new();
        let cid = store
            .put(Bytes::from_static(b"12345"), Codec::RAW)
            .await
            .unwrap();
        store.get(&cid).await.unwrap();
        store.get(&cid).await.unwrap();
        assert_eq!(
            store.stats(),
            StoreStats {
                bytes_put: 5,
                bytes_get: 10
            }
        );
    }

    #[tokio::test]
    async fn test_evict() {
        let store = MemoryBlockStore::new();
        let cid = store.put(Bytes::from_static(b"x"), Codec::RAW).await.unwrap();
        assert!(store.evict(&cid));
        assert!(store.is_empty());
        assert!(store.get(&cid).await.is_err());
    }
}
