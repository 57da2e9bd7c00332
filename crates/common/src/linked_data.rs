//! Content identifiers, codec tags and block encoding.
//!
//! Every block is addressed by a CIDv1 whose multihash is the BLAKE3 digest of
//! the stored bytes. The multicodec embedded in the CID is always `raw`: the
//! codec a caller passes to a store travels next to the CID (in a [`Link`]),
//! never inside it, so identical bytes always map to identical CIDs.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub use cid::Cid;

use cid::multihash::Multihash;

/// Multihash code for BLAKE3-256
pub const BLAKE3_MULTIHASH_CODE: u64 = 0x1e;
/// Multicodec for raw bytes
pub const LD_RAW_CODEC: u64 = 0x55;
/// Multicodec for DAG-CBOR
pub const LD_CBOR_CODEC: u64 = 0x71;
/// Size of a BLAKE3 digest in bytes
pub const DIGEST_SIZE: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("failed to encode block: {0}")]
    Encode(String),
    #[error("failed to decode block: {0}")]
    Decode(String),
    #[error("unsupported multihash in cid {0}")]
    UnsupportedHash(Cid),
}

/// Integer discriminator stored alongside a put, telling readers how to
///  interpret the block's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Codec(pub u64);

impl Codec {
    pub const RAW: Codec = Codec(LD_RAW_CODEC);
    pub const DAG_CBOR: Codec = Codec(LD_CBOR_CODEC);

    pub fn code(&self) -> u64 {
        self.0
    }
}

impl From<u64> for Codec {
    fn from(code: u64) -> Self {
        Codec(code)
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Codec::RAW => write!(f, "raw"),
            Codec::DAG_CBOR => write!(f, "dag-cbor"),
            Codec(code) => write!(f, "{:#x}", code),
        }
    }
}

/// Compute the content identifier for a block of bytes
pub fn compute_cid(data: &[u8]) -> Cid {
    cid_from_digest(*blake3::hash(data).as_bytes())
}

/// Build a CID from an already computed BLAKE3 digest
pub fn cid_from_digest(digest: [u8; DIGEST_SIZE]) -> Cid {
    let hash = Multihash::<64>::wrap(BLAKE3_MULTIHASH_CODE, &digest)
        .expect("a 32 byte digest always fits a 64 byte multihash");
    Cid::new_v1(LD_RAW_CODEC, hash)
}

/// Extract the BLAKE3 digest a CID was built from
pub fn cid_digest(cid: &Cid) -> Result<[u8; DIGEST_SIZE], CodecError> {
    let hash = cid.hash();
    if hash.code() != BLAKE3_MULTIHASH_CODE {
        return Err(CodecError::UnsupportedHash(*cid));
    }
    hash.digest()
        .try_into()
        .map_err(|_| CodecError::UnsupportedHash(*cid))
}

/// A typed pointer to a block: where it lives and how to read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    codec: Codec,
    cid: Cid,
}

impl Link {
    pub fn new(codec: Codec, cid: Cid) -> Self {
        Self { codec, cid }
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    pub fn cid(&self) -> &Cid {
        &self.cid
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.cid, self.codec)
    }
}

/// A serialization format for structured blocks
pub trait BlockCodec {
    const CODEC: Codec;

    fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError>;
    fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T, CodecError>;
}

#[derive(Debug, Clone, Copy)]
pub struct DagCborCodec;

impl BlockCodec for DagCborCodec {
    const CODEC: Codec = Codec::DAG_CBOR;

    fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
        serde_ipld_dagcbor::to_vec(value).map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T, CodecError> {
        serde_ipld_dagcbor::from_slice(data).map_err(|e| CodecError::Decode(e.to_string()))
    }
}

/// Types that are stored as whole blocks in a given codec
pub trait BlockEncoded<C: BlockCodec>: Serialize + DeserializeOwned {
    fn encode(&self) -> Result<Vec<u8>, CodecError> {
        C::encode(self)
    }

    fn decode(data: &[u8]) -> Result<Self, CodecError> {
        C::decode(data)
    }

    fn codec(&self) -> Codec {
        C::CODEC
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        link: Link,
    }

    impl BlockEncoded<DagCborCodec> for Sample {}

    #[test]
    fn test_cid_is_deterministic() {
        let a = compute_cid(b"hello world");
        let b = compute_cid(b"hello world");
        let c = compute_cid(b"hello world!");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.codec(), LD_RAW_CODEC);
    }

    #[test]
    fn test_cid_digest_matches_blake3() {
        let cid = compute_cid(b"data");
        let digest = cid_digest(&cid).unwrap();
        assert_eq!(&digest, blake3::hash(b"data").as_bytes());
        assert_eq!(cid_from_digest(digest), cid);
    }

    #[test]
    fn test_cid_digest_rejects_other_hashes() {
        let hash = Multihash::<64>::wrap(0x12, &[7u8; 32]).unwrap();
        let cid = Cid::new_v1(LD_RAW_CODEC, hash);
        assert!(matches!(
            cid_digest(&cid),
            Err(CodecError::UnsupportedHash(_))
        ));
    }

    #[test]
    fn test_cid_string_form() {
        let cid = compute_cid(b"some block");
        let parsed = Cid::try_from(cid.to_string().as_str()).unwrap();
        assert_eq!(parsed, cid);
    }

    #[test]
    fn test_block_encode_decode() {
        let sample = Sample {
            name: "sample".to_string(),
            link: Link::new(Codec::RAW, compute_cid(b"leaf")),
        };
        let encoded = sample.encode().unwrap();
        let decoded = Sample::decode(&encoded).unwrap();
        assert_eq!(sample, decoded);
        assert_eq!(sample.codec(), Codec::DAG_CBOR);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(matches!(
            Sample::decode(b"definitely not cbor"),
            Err(CodecError::Decode(_))
        ));
    }

    #[test]
    fn test_codec_display() {
        assert_eq!(Codec::RAW.to_string(), "raw");
        assert_eq!(Codec::DAG_CBOR.to_string(), "dag-cbor");
        assert_eq!(Codec(0x70).to_string(), "0x70");
    }
}
