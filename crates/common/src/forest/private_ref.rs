use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::TokenError;
use crate::crypto::Secret;
use crate::linked_data::{BlockEncoded, Cid, DagCborCodec};

/// Capability for one snapshot of one private tree.
///
/// Names the tree inside its forest (`label`), carries the secret sealing its
/// root node and the CID of that sealed node. It is never written to a store;
/// its string form is the lowercase hex of its DAG-CBOR encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateRef {
    label: String,
    secret: Secret,
    content: Cid,
}

impl BlockEncoded<DagCborCodec> for PrivateRef {}

impl PrivateRef {
    pub fn new(label: String, secret: Secret, content: Cid) -> Self {
        Self {
            label,
            secret,
            content,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn secret(&self) -> &Secret {
        &self.secret
    }

    pub fn content(&self) -> &Cid {
        &self.content
    }

    /// The same tree at another root node
    pub fn with_content(&self, content: Cid) -> Self {
        Self {
            content,
            ..self.clone()
        }
    }

    pub fn to_token(&self) -> String {
        // encoding a struct of a string, bytes and a cid cannot fail
        hex::encode(self.encode().unwrap_or_default())
    }

    pub fn from_token(token: &str) -> Result<Self, TokenError> {
        let bytes = hex::decode(token.trim())?;
        Ok(Self::decode(&bytes)?)
    }
}

impl fmt::Display for PrivateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_token())
    }
}

impl FromStr for PrivateRef {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s)
    }
}
