use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use super::{BlockStore, BlockStoreError, ByteCounters, StoreStats};
use crate::linked_data::{compute_cid, Cid, Codec};

/// Block store keeping one file per block in a directory.
///
/// Files are named by the CID string. A put writes a temporary file
///  first and renames it into place, so readers never see a partial block.
#[derive(Debug, Clone)]
pub struct FileBlockStore {
    dir: PathBuf,
    counters: Arc<ByteCounters>,
}

impl FileBlockStore {
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, BlockStoreError> {
        let dir = dir.as_ref().to_path_buf();
        tracing::debug!("FileBlockStore::open: {:?}", dir);
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            counters: Arc::default(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn block_path(&self, cid: &Cid) -> PathBuf {
        self.dir.join(cid.to_string())
    }

    fn temp_path(&self, cid: &Cid) -> Result<PathBuf, BlockStoreError> {
        let mut nonce = [0u8; 8];
        getrandom::getrandom(&mut nonce)
            .map_err(|e| anyhow::anyhow!("failed to generate temp name: {}", e))?;
        Ok(self
            .dir
            .join(format!(".{}.{}.tmp", cid, hex::encode(nonce))))
    }
}

#[async_trait]
impl BlockStore for FileBlockStore {
    async fn put(&self, data: Bytes, codec: Codec) -> Result<Cid, BlockStoreError> {
        let cid = compute_cid(&data);
        self.counters.record_put(data.len());
        let path = self.block_path(&cid);
        if tokio::fs::try_exists(&path).await? {
            tracing::trace!("FileBlockStore::put: {} already present", cid);
            return Ok(cid);
        }

        tracing::trace!("FileBlockStore::put: {} ({} bytes, {})", cid, data.len(), codec);
        let temp = self.temp_path(&cid)?;
        if let Err(e) = tokio::fs::write(&temp, &data).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }
        tokio::fs::rename(&temp, &path).await?;
        Ok(cid)
    }

    async fn get(&self, cid: &Cid) -> Result<Bytes, BlockStoreError> {
        let data = match tokio::fs::read(self.block_path(cid)).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(BlockStoreError::NotFound(*cid))
            }
            Err(e) => return Err(e.into()),
        };
        if compute_cid(&data) != *cid {
            tracing::warn!("FileBlockStore::get: block {} failed verification", cid);
            return Err(anyhow::anyhow!("block {} is corrupted on disk", cid).into());
        }
        self.counters.record_get(data.len());
        Ok(Bytes::from(data))
    }

    async fn has(&self, cid: &Cid) -> Result<bool, BlockStoreError> {
        Ok(tokio::fs::try_exists(self.block_path(cid)).await?)
    }

    fn stats(&self) -> StoreStats {
        self.counters.snapshot()
    }
}
