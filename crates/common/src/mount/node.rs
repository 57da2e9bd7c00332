use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::Secret;
use crate::linked_data::{BlockEncoded, DagCborCodec, Link};

use super::maybe_mime::MaybeMime;

/**
 * Nodes
 * =====
 * A private tree is a DAG of encrypted directory nodes.
 *  A node is a map of names to links, and every link
 *  carries the secret needed to open what it points at:
 *  - Dir links point at another encrypted node
 *  - Data links describe a file: its encrypted chunks,
 *    its size and its MIME type
 * Nodes are DAG-CBOR encoded, then sealed with their own
 *  secret and stored as raw blocks. Holding the secret of
 *  a node grants read access to everything below it.
 */

/// Creation and modification times, in unix seconds (UTC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    created: i64,
    modified: i64,
}

impl Metadata {
    pub fn now() -> Self {
        Self::at(Utc::now().timestamp())
    }

    pub fn at(timestamp: i64) -> Self {
        Self {
            created: timestamp,
            modified: timestamp,
        }
    }

    pub fn created(&self) -> i64 {
        self.created
    }

    pub fn modified(&self) -> i64 {
        self.modified
    }

    /// Same creation time, modified at `now`
    pub fn touched(&self, now: &Metadata) -> Self {
        Self {
            created: self.created,
            modified: now.modified,
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created, 0)
    }

    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.modified, 0)
    }
}

// Describes a file: the ordered chunks holding
//  its encrypted content, and what we know about it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Data {
    chunks: Vec<Link>,
    size: u64,
    mime: MaybeMime,
    metadata: Metadata,
}

impl Data {
    pub fn new(chunks: Vec<Link>, size: u64, mime: MaybeMime, metadata: Metadata) -> Self {
        Self {
            chunks,
            size,
            mime,
            metadata,
        }
    }

    pub fn chunks(&self) -> &[Link] {
        &self.chunks
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn mime(&self) -> &MaybeMime {
        &self.mime
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeLink {
    Dir(Link, Secret, Metadata),
    Data(Secret, Data),
}

impl NodeLink {
    pub fn secret(&self) -> &Secret {
        match self {
            NodeLink::Dir(_, secret, _) => secret,
            NodeLink::Data(secret, _) => secret,
        }
    }

    pub fn metadata(&self) -> &Metadata {
        match self {
            NodeLink::Dir(_, _, metadata) => metadata,
            NodeLink::Data(_, data) => &data.metadata,
        }
    }

    pub fn data(&self) -> Option<&Data> {
        match self {
            NodeLink::Data(_, data) => Some(data),
            NodeLink::Dir(..) => None,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, NodeLink::Dir(..))
    }

    pub fn is_data(&self) -> bool {
        matches!(self, NodeLink::Data(..))
    }

    /// The same target under new timestamps
    pub fn restamped(&self, metadata: Metadata) -> Self {
        match self {
            NodeLink::Dir(link, secret, _) => NodeLink::Dir(*link, secret.clone(), metadata),
            NodeLink::Data(secret, data) => NodeLink::Data(
                secret.clone(),
                Data {
                    metadata,
                    ..data.clone()
                },
            ),
        }
    }
}

// And a node is just a map of names to links.
//  When traversing the DAG, path names are just
//  /-joined names of links in nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Node {
    links: BTreeMap<String, NodeLink>,
}

impl BlockEncoded<DagCborCodec> for Node {}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_link(&self, name: &str) -> Option<&NodeLink> {
        self.links.get(name)
    }

    pub fn insert(&mut self, name: String, link: NodeLink) -> Option<NodeLink> {
        self.links.insert(name, link)
    }

    pub fn get_links(&self) -> &BTreeMap<String, NodeLink> {
        &self.links
    }

    pub fn del(&mut self, name: &str) -> Option<NodeLink> {
        self.links.remove(name)
    }

    pub fn size(&self) -> usize {
        self.links.len()
    }
}
