//! Content-addressed block storage
//!
//! [`BlockStore`] is the only storage contract the protocol depends on:
//! `put(bytes, codec) -> cid` and `get(cid) -> bytes`. Identical bytes always
//! yield the same CID, whatever the codec tag, so puts are idempotent and
//! commute. Stores know nothing about directories, files or keys.
//!
//! Serialization of store access is a policy, chosen per embedding through
//! [`StorePolicy`], rather than something baked into every store.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;

use crate::linked_data::{Cid, Codec, CodecError};

mod blobs;
mod file;
mod locked;
mod memory;
mod queued;

pub use blobs::BlobsBlockStore;
pub use file::FileBlockStore;
pub use locked::LockedBlockStore;
pub use memory::MemoryBlockStore;
pub use queued::QueuedBlockStore;

#[derive(Debug, thiserror::Error)]
pub enum BlockStoreError {
    #[error("block not found: {0}")]
    NotFound(Cid),
    #[error("block store i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("block store timed out after {0:?}")]
    Timeout(Duration),
    #[error("block store is closed")]
    Closed,
    #[error("blobs store error: {0}")]
    Blobs(String),
    #[error("invalid cid: {0}")]
    Cid(#[from] CodecError),
    #[error("block store error: {0}")]
    Default(#[from] anyhow::Error),
}

/// Bytes moved through a store since it was opened
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub bytes_put: u64,
    pub bytes_get: u64,
}

impl fmt::Display for StoreStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "put {} bytes, got {} bytes", self.bytes_put, self.bytes_get)
    }
}

#[derive(Debug, Default)]
pub(crate) struct ByteCounters {
    put: AtomicU64,
    get: AtomicU64,
}

impl ByteCounters {
    pub(crate) fn record_put(&self, n: usize) {
        self.put.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_get(&self, n: usize) {
        self.get.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> StoreStats {
        StoreStats {
            bytes_put: self.put.load(Ordering::Relaxed),
            bytes_get: self.get.load(Ordering::Relaxed),
        }
    }
}

#[async_trait]
pub trait BlockStore: Send + Sync + fmt::Debug {
    /// Persist a block and return its content identifier
    async fn put(&self, data: Bytes, codec: Codec) -> Result<Cid, BlockStoreError>;

    /// Fetch a block, failing with [`BlockStoreError::NotFound`] if it was never put
    async fn get(&self, cid: &Cid) -> Result<Bytes, BlockStoreError>;

    async fn has(&self, cid: &Cid) -> Result<bool, BlockStoreError> {
        match self.get(cid).await {
            Ok(_) => Ok(true),
            Err(BlockStoreError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn stats(&self) -> StoreStats {
        StoreStats::default()
    }
}

#[async_trait]
impl<T: BlockStore + ?Sized> BlockStore for Arc<T> {
    async fn put(&self, data: Bytes, codec: Codec) -> Result<Cid, BlockStoreError> {
        (**self).put(data, codec).await
    }

    async fn get(&self, cid: &Cid) -> Result<Bytes, BlockStoreError> {
        (**self).get(cid).await
    }

    async fn has(&self, cid: &Cid) -> Result<bool, BlockStoreError> {
        (**self).has(cid).await
    }

    fn stats(&self) -> StoreStats {
        (**self).stats()
    }
}

/// How calls reach an underlying store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorePolicy {
    /// Calls go straight to the store
    #[default]
    Direct,
    /// One call at a time, behind an async mutex
    Locked,
    /// One worker task drains a queue of calls; each call waits at most `timeout`
    Queued { timeout: Duration },
}

impl StorePolicy {
    /// Wrap `store` according to this policy.
    ///
    /// `Queued` spawns its worker, so it must be applied inside a tokio runtime.
    pub fn apply<S: BlockStore + 'static>(self, store: S) -> Arc<dyn BlockStore> {
        tracing::debug!("StorePolicy::apply: {:?}", self);
        match self {
            StorePolicy::Direct => Arc::new(store),
            StorePolicy::Locked => Arc::new(LockedBlockStore::new(store)),
            StorePolicy::Queued { timeout } => Arc::new(QueuedBlockStore::spawn(store, timeout)),
        }
    }
}
