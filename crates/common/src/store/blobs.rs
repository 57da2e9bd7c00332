use std::future::IntoFuture;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use iroh_blobs::{
    api::{
        blobs::{BlobStatus, Blobs},
        ExportBaoError, RequestError,
    },
    store::{fs::FsStore, mem::MemStore},
    BlobsProtocol, Hash,
};

use super::{BlockStore, BlockStoreError, ByteCounters, StoreStats};
use crate::linked_data::{cid_digest, cid_from_digest, Cid, Codec};

impl From<ExportBaoError> for BlockStoreError {
    fn from(err: ExportBaoError) -> Self {
        BlockStoreError::Blobs(err.to_string())
    }
}

impl From<RequestError> for BlockStoreError {
    fn from(err: RequestError) -> Self {
        BlockStoreError::Blobs(err.to_string())
    }
}

/// Block store over a local iroh-blobs store.
///
/// iroh-blobs addresses blobs by their BLAKE3 hash, which is exactly the
///  digest inside our CIDs, so this store hands out the same CIDs as every
///  other [`BlockStore`]. Codec tags are not recorded.
#[derive(Clone, Debug)]
pub struct BlobsBlockStore {
    inner: Arc<BlobsProtocol>,
    counters: Arc<ByteCounters>,
}

impl BlobsBlockStore {
    /// Load a persistent blobs store rooted at `path`
    pub async fn fs(path: &Path) -> Result<Self, BlockStoreError> {
        tracing::debug!("BlobsBlockStore::fs called with path: {:?}", path);
        let store = FsStore::load(path)
            .await
            .map_err(|e| BlockStoreError::Blobs(e.to_string()))?;
        tracing::debug!("BlobsBlockStore::fs completed loading FsStore");
        Ok(Self::from_protocol(BlobsProtocol::new(&store, None)))
    }

    /// Load a memory blobs store
    pub fn memory() -> Self {
        let store = MemStore::new();
        Self::from_protocol(BlobsProtocol::new(&store, None))
    }

    fn from_protocol(blobs: BlobsProtocol) -> Self {
        Self {
            inner: Arc::new(blobs),
            counters: Arc::default(),
        }
    }

    pub fn blobs(&self) -> &Blobs {
        self.inner.store().blobs()
    }

    fn hash(cid: &Cid) -> Result<Hash, BlockStoreError> {
        Ok(Hash::from_bytes(cid_digest(cid)?))
    }

    async fn is_complete(&self, hash: Hash) -> Result<bool, BlockStoreError> {
        let status = self
            .blobs()
            .status(hash)
            .await
            .map_err(|e| BlockStoreError::Blobs(e.to_string()))?;
        Ok(matches!(status, BlobStatus::Complete { .. }))
    }
}

#[async_trait]
impl BlockStore for BlobsBlockStore {
    async fn put(&self, data: Bytes, codec: Codec) -> Result<Cid, BlockStoreError> {
        let len = data.len();
        let hash = self
            .blobs()
            .add_bytes(data)
            .into_future()
            .await
            .map_err(|e| BlockStoreError::Blobs(e.to_string()))?
            .hash;
        self.counters.record_put(len);
        let cid = cid_from_digest(*hash.as_bytes());
        tracing::trace!("BlobsBlockStore::put: {} ({} bytes, {})", cid, len, codec);
        Ok(cid)
    }

    async fn get(&self, cid: &Cid) -> Result<Bytes, BlockStoreError> {
        let hash = Self::hash(cid)?;
        if !self.is_complete(hash).await? {
            return Err(BlockStoreError::NotFound(*cid));
        }
        let data = self.blobs().get_bytes(hash).await?;
        self.counters.record_get(data.len());
        Ok(data)
    }

    async fn has(&self, cid: &Cid) -> Result<bool, BlockStoreError> {
        self.is_complete(Self::hash(cid)?).await
    }

    fn stats(&self) -> StoreStats {
        self.counters.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linked_data::compute_cid;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_cids_match_other_stores() {
        let store = BlobsBlockStore::memory();
        let data = Bytes::from_static(b"Hello, BlobsStore!");
        let cid = store.put(data.clone(), Codec::RAW).await.unwrap();
        assert_eq!(cid, compute_cid(&data));
        assert_eq!(store.get(&cid).await.unwrap(), data);
    }

    #[tokio::test]
    async fn test_fs_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = BlobsBlockStore::fs(&temp_dir.path().join("blobs"))
            .await
            .unwrap();
        let data = Bytes::from(vec![42u8; 1024 * 1024]);
        let cid = store.put(data.clone(), Codec::RAW).await.unwrap();
        let retrieved = store.get(&cid).await.unwrap();
        assert_eq!(retrieved.len(), data.len());
        assert_eq!(retrieved, data);
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let store = BlobsBlockStore::memory();
        let cid = compute_cid(b"not here");
        assert!(matches!(
            store.get(&cid).await,
            Err(BlockStoreError::NotFound(_))
        ));
        assert!(!store.has(&cid).await.unwrap());
    }
}
