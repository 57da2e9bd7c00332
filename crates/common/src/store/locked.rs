use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Mutex;

use super::{BlockStore, BlockStoreError, StoreStats};
use crate::linked_data::{Cid, Codec};

/// Runs every call against the inner store under one async mutex
#[derive(Debug)]
pub struct LockedBlockStore<S> {
    store: S,
    lock: Mutex<()>,
}

impl<S: BlockStore> LockedBlockStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}

#[async_trait]
impl<S: BlockStore> BlockStore for LockedBlockStore<S> {
    async fn put(&self, data: Bytes, codec: Codec) -> Result<Cid, BlockStoreError> {
        let _guard = self.lock.lock().await;
        self.store.put(data, codec).await
    }

    async fn get(&self, cid: &Cid) -> Result<Bytes, BlockStoreError> {
        let _guard = self.lock.lock().await;
        self.store.get(cid).await
    }

    async fn has(&self, cid: &Cid) -> Result<bool, BlockStoreError> {
        let _guard = self.lock.lock().await;
        self.store.has(cid).await
    }

    fn stats(&self) -> StoreStats {
        self.store.stats()
    }
}
