//! The private forest
//!
//! A forest is the one unencrypted block tying private trees to a store:
//! a map from root labels to the current encrypted root node of each tree.
//! Every mutation of any tree writes a new forest revision pointing back at
//! the one it replaced, so a forest CID doubles as a position in history.
//!
//! ```text
//! Forest rev n ──previous──> Forest rev n-1 ──> ... ──> genesis
//!   │ label(k1) -> Root node (sealed with root secret of k1)
//!   │ label(k2) -> Root node (sealed with root secret of k2)
//! ```
//!
//! Labels are one-way derivations of root keys, so a forest reveals how many
//! trees it holds but nothing about their keys or contents.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::linked_data::{BlockEncoded, Cid, DagCborCodec, Link};
use crate::mount::MountError;
use crate::store::{BlockStore, BlockStoreError};

mod private_ref;
mod version;

pub use private_ref::PrivateRef;
pub use version::{TokenError, Version};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Forest {
    roots: BTreeMap<String, Link>,
    previous: Option<Cid>,
    height: u64,
}

impl BlockEncoded<DagCborCodec> for Forest {}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self, label: &str) -> Option<&Link> {
        self.roots.get(label)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.roots.contains_key(label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.roots.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn previous(&self) -> Option<&Cid> {
        self.previous.as_ref()
    }

    pub fn height(&self) -> u64 {
        self.height
    }

    /// The revision following the forest stored at `cid`, with `label` pointing at `root`
    pub fn next(&self, cid: Cid, label: &str, root: Link) -> Forest {
        let mut roots = self.roots.clone();
        roots.insert(label.to_string(), root);
        Forest {
            roots,
            previous: Some(cid),
            height: self.height + 1,
        }
    }

    pub async fn load<B: BlockStore + ?Sized>(store: &B, cid: &Cid) -> Result<Forest, MountError> {
        tracing::debug!("Forest::load: {}", cid);
        let data = match store.get(cid).await {
            Ok(data) => data,
            Err(BlockStoreError::NotFound(_)) => {
                tracing::debug!("Forest::load: no forest block at {}", cid);
                return Err(MountError::ForestNotFound(*cid));
            }
            Err(e) => return Err(e.into()),
        };
        Forest::decode(&data).map_err(|e| {
            tracing::debug!("Forest::load: block {} is not a forest: {}", cid, e);
            MountError::ForestNotFound(*cid)
        })
    }

    pub async fn store<B: BlockStore + ?Sized>(&self, store: &B) -> Result<Cid, MountError> {
        let data = self.encode()?;
        let cid = store.put(Bytes::from(data), self.codec()).await?;
        tracing::debug!(
            "Forest::store: revision {} with {} roots at {}",
            self.height,
            self.roots.len(),
            cid
        );
        Ok(cid)
    }
}
