use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::PrivateRef;
use crate::linked_data::{Cid, CodecError};

const SEPARATOR: char = '.';

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("expected <cid>.<private ref>")]
    MissingSeparator,
    #[error("invalid cid: {0}")]
    Cid(#[from] cid::Error),
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("invalid private ref: {0}")]
    Decode(#[from] CodecError),
}

/// One immutable snapshot of one private tree: a forest revision plus the
///  reference to the tree's root node inside it.
///
/// Renders as the opaque token `<forest cid>.<private ref>`. The legacy two
///  string form is available through [`Version::from_parts`] and
///  [`Version::into_parts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    cid: Cid,
    private_ref: PrivateRef,
}

impl Version {
    pub fn new(cid: Cid, private_ref: PrivateRef) -> Self {
        Self { cid, private_ref }
    }

    pub fn cid(&self) -> &Cid {
        &self.cid
    }

    pub fn private_ref(&self) -> &PrivateRef {
        &self.private_ref
    }

    pub fn from_parts(cid: &str, private_ref: &str) -> Result<Self, TokenError> {
        Ok(Self {
            cid: Cid::try_from(cid.trim())?,
            private_ref: PrivateRef::from_token(private_ref)?,
        })
    }

    pub fn into_parts(self) -> (String, String) {
        (self.cid.to_string(), self.private_ref.to_token())
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.cid, SEPARATOR, self.private_ref)
    }
}

impl FromStr for Version {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (cid, private_ref) = s
            .trim()
            .split_once(SEPARATOR)
            .ok_or(TokenError::MissingSeparator)?;
        Self::from_parts(cid, private_ref)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        token.parse().map_err(serde::de::Error::custom)
    }
}
