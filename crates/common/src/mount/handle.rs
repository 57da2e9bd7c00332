use std::path::Path;
use std::sync::Arc;

use tokio::io::AsyncRead;
use tokio::sync::Mutex;

use crate::crypto::RootKey;
use crate::forest::Version;
use crate::linked_data::Cid;
use crate::store::BlockStore;

use super::fs::{Entry, PrivateFs};
use super::MountError;

/// A private tree with a moving head.
///
/// `Mount` keeps the latest [`Version`] of one tree and lets one mutation run
///  at a time, each starting from the Version the previous one produced.
///  Clones share the head. Reads run against the head without blocking on
///  other reads, and never observe a half applied mutation.
#[derive(Debug)]
pub struct Mount<B> {
    fs: PrivateFs<B>,
    head: Arc<Mutex<Version>>,
}

impl<B: Clone> Clone for Mount<B> {
    fn clone(&self) -> Self {
        Self {
            fs: self.fs.clone(),
            head: self.head.clone(),
        }
    }
}

impl<B: BlockStore> Mount<B> {
    pub fn new(fs: PrivateFs<B>, version: Version) -> Self {
        Self {
            fs,
            head: Arc::new(Mutex::new(version)),
        }
    }

    pub async fn init(fs: PrivateFs<B>, key: &[u8]) -> Result<Self, MountError> {
        let version = fs.init(key).await?;
        Ok(Self::new(fs, version))
    }

    pub async fn load(fs: PrivateFs<B>, key: &RootKey, cid: &Cid) -> Result<Self, MountError> {
        let version = fs.load_with_key(key, cid).await?;
        Ok(Self::new(fs, version))
    }

    pub fn fs(&self) -> &PrivateFs<B> {
        &self.fs
    }

    /// The current head
    pub async fn version(&self) -> Version {
        self.head.lock().await.clone()
    }

    pub async fn mkdir(&self, path: &str) -> Result<Version, MountError> {
        let mut head = self.head.lock().await;
        let next = self.fs.mkdir(&head, path).await?;
        *head = next.clone();
        Ok(next)
    }

    pub async fn write_file(&self, path: &str, data: &[u8]) -> Result<Version, MountError> {
        let mut head = self.head.lock().await;
        let next = self.fs.write_file(&head, path, data).await?;
        *head = next.clone();
        Ok(next)
    }

    pub async fn write_file_stream<R>(&self, path: &str, reader: R) -> Result<Version, MountError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut head = self.head.lock().await;
        let next = self.fs.write_file_stream(&head, path, reader).await?;
        *head = next.clone();
        Ok(next)
    }

    pub async fn write_file_from_path(
        &self,
        path: &str,
        source: &Path,
    ) -> Result<Version, MountError> {
        let mut head = self.head.lock().await;
        let next = self.fs.write_file_from_path(&head, path, source).await?;
        *head = next.clone();
        Ok(next)
    }

    pub async fn rm(&self, path: &str) -> Result<Version, MountError> {
        let mut head = self.head.lock().await;
        let next = self.fs.rm(&head, path).await?;
        *head = next.clone();
        Ok(next)
    }

    pub async fn mv(&self, from: &str, to: &str) -> Result<Version, MountError> {
        let mut head = self.head.lock().await;
        let next = self.fs.mv(&head, from, to).await?;
        *head = next.clone();
        Ok(next)
    }

    pub async fn cp(&self, from: &str, to: &str) -> Result<Version, MountError> {
        let mut head = self.head.lock().await;
        let next = self.fs.cp(&head, from, to).await?;
        *head = next.clone();
        Ok(next)
    }

    pub async fn read_file(&self, path: &str) -> Result<Vec<u8>, MountError> {
        let version = self.version().await;
        self.fs.read_file(&version, path).await
    }

    pub async fn ls(&self, path: &str) -> Result<Vec<Entry>, MountError> {
        let version = self.version().await;
        self.fs.ls(&version, path).await
    }

    pub async fn stat(&self, path: &str) -> Result<Entry, MountError> {
        let version = self.version().await;
        self.fs.stat(&version, path).await
    }

    pub async fn history(&self) -> Result<Vec<Cid>, MountError> {
        let version = self.version().await;
        self.fs.history(&version).await
    }
}
