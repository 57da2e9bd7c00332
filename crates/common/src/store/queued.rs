//! Single worker serialization of store access.
//!
//! Every call becomes a [`Request`] on a bounded queue. One worker task owns
//! the inner store and answers requests strictly in arrival order, which
//! linearizes individual puts and gets (not whole filesystem operations).

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::{mpsc, oneshot};

use super::{BlockStore, BlockStoreError, StoreStats};
use crate::linked_data::{Cid, Codec};

const QUEUE_DEPTH: usize = 64;

type Reply<T> = oneshot::Sender<Result<T, BlockStoreError>>;

enum Request {
    Put {
        data: Bytes,
        codec: Codec,
        reply: Reply<Cid>,
    },
    Get {
        cid: Cid,
        reply: Reply<Bytes>,
    },
    Has {
        cid: Cid,
        reply: Reply<bool>,
    },
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Request::Put { data, codec, .. } => write!(f, "Put({} bytes, {})", data.len(), codec),
            Request::Get { cid, .. } => write!(f, "Get({})", cid),
            Request::Has { cid, .. } => write!(f, "Has({})", cid),
        }
    }
}

struct Worker<S> {
    store: Arc<S>,
    requests: mpsc::Receiver<Request>,
}

impl<S: BlockStore> Worker<S> {
    async fn run(mut self) {
        tracing::debug!("QueuedBlockStore worker started");
        while let Some(request) = self.requests.recv().await {
            tracing::trace!("QueuedBlockStore worker: {:?}", request);
            // a dropped reply means the caller timed out; nothing left to do
            match request {
                Request::Put { data, codec, reply } => {
                    let _ = reply.send(self.store.put(data, codec).await);
                }
                Request::Get { cid, reply } => {
                    let _ = reply.send(self.store.get(&cid).await);
                }
                Request::Has { cid, reply } => {
                    let _ = reply.send(self.store.has(&cid).await);
                }
            }
        }
        tracing::debug!("QueuedBlockStore worker stopped");
    }
}

/// A [`BlockStore`] whose calls are executed one at a time by a worker task.
///
/// Each call waits at most `timeout` (queueing included) and then fails with
/// [`BlockStoreError::Timeout`]. The worker exits once every handle is dropped.
pub struct QueuedBlockStore<S> {
    requests: mpsc::Sender<Request>,
    store: Arc<S>,
    timeout: Duration,
}

impl<S> Clone for QueuedBlockStore<S> {
    fn clone(&self) -> Self {
        Self {
            requests: self.requests.clone(),
            store: self.store.clone(),
            timeout: self.timeout,
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for QueuedBlockStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedBlockStore")
            .field("store", &self.store)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl<S: BlockStore + 'static> QueuedBlockStore<S> {
    /// Start the worker on the current tokio runtime
    pub fn spawn(store: S, timeout: Duration) -> Self {
        let store = Arc::new(store);
        let (requests, rx) = mpsc::channel(QUEUE_DEPTH);
        tokio::spawn(
            Worker {
                store: store.clone(),
                requests: rx,
            }
            .run(),
        );
        Self {
            requests,
            store,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn call<T>(
        &self,
        request: impl FnOnce(Reply<T>) -> Request,
    ) -> Result<T, BlockStoreError> {
        let (reply, response) = oneshot::channel();
        let exchange = async {
            self.requests
                .send(request(reply))
                .await
                .map_err(|_| BlockStoreError::Closed)?;
            response.await.map_err(|_| BlockStoreError::Closed)?
        };
        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("QueuedBlockStore: call timed out after {:?}", self.timeout);
                Err(BlockStoreError::Timeout(self.timeout))
            }
        }
    }
}

#[async_trait]
impl<S: BlockStore + 'static> BlockStore for QueuedBlockStore<S> {
    async fn put(&self, data: Bytes, codec: Codec) -> Result<Cid, BlockStoreError> {
        self.call(|reply| Request::Put { data, codec, reply }).await
    }

    async fn get(&self, cid: &Cid) -> Result<Bytes, BlockStoreError> {
        let cid = *cid;
        self.call(|reply| Request::Get { cid, reply }).await
    }

    async fn has(&self, cid: &Cid) -> Result<bool, BlockStoreError> {
        let cid = *cid;
        self.call(|reply| Request::Has { cid, reply }).await
    }

    fn stats(&self) -> StoreStats {
        self.store.stats()
    }
}
