use std::fmt;

use super::secret::{Secret, SECRET_SIZE};

/// Size of a root key in bytes
pub const ROOT_KEY_SIZE: usize = 32;

const LABEL_CONTEXT: &str = "pforest 2024-05 private root label";
const SECRET_CONTEXT: &str = "pforest 2024-05 private root secret";

#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("invalid key length, expected 32 bytes, got {0}")]
    InvalidLength(usize),
    #[error("invalid key encoding: {0}")]
    Encoding(#[from] hex::FromHexError),
}

/// The symmetric key a private tree is derived from.
///
/// The key itself is never written anywhere. Two values are derived from it:
/// a public [`label`](RootKey::label) naming the tree inside a forest, and the
/// [`root_secret`](RootKey::root_secret) encrypting its root directory node.
#[derive(Clone, PartialEq, Eq)]
pub struct RootKey([u8; ROOT_KEY_SIZE]);

impl fmt::Debug for RootKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RootKey({})", self.label())
    }
}

impl From<[u8; ROOT_KEY_SIZE]> for RootKey {
    fn from(bytes: [u8; ROOT_KEY_SIZE]) -> Self {
        RootKey(bytes)
    }
}

impl TryFrom<&[u8]> for RootKey {
    type Error = KeyError;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let buff: [u8; ROOT_KEY_SIZE] = bytes
            .try_into()
            .map_err(|_| KeyError::InvalidLength(bytes.len()))?;
        Ok(buff.into())
    }
}

impl RootKey {
    pub fn generate() -> Self {
        Self(*Secret::generate())
    }

    /// Key material as supplied at `init`: empty means "make one up".
    pub fn from_init_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.is_empty() {
            return Ok(Self::generate());
        }
        Self::try_from(bytes)
    }

    pub fn from_hex(hex: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex.trim())?;
        Self::try_from(bytes.as_slice())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lowercase hex label under which this tree's root is filed in a forest
    pub fn label(&self) -> String {
        hex::encode(blake3::derive_key(LABEL_CONTEXT, &self.0))
    }

    pub fn root_secret(&self) -> Secret {
        let derived: [u8; SECRET_SIZE] = blake3::derive_key(SECRET_CONTEXT, &self.0);
        Secret::from(derived)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_key_length_is_enforced() {
        assert!(matches!(
            RootKey::try_from([0u8; 16].as_slice()),
            Err(KeyError::InvalidLength(16))
        ));
        assert!(RootKey::try_from([0u8; 33].as_slice()).is_err());
        assert!(RootKey::try_from([0u8; 32].as_slice()).is_ok());
    }

    #[test]
    fn test_empty_init_key_is_random() {
        let a = RootKey::from_init_bytes(&[]).unwrap();
        let b = RootKey::from_init_bytes(&[]).unwrap();
        assert_ne!(a, b);
        assert!(RootKey::from_init_bytes(&[1u8; 5]).is_err());
    }

    #[test]
    fn test_derivations_are_stable_and_distinct() {
        let key = RootKey::from([7u8; ROOT_KEY_SIZE]);
        let again = RootKey::from([7u8; ROOT_KEY_SIZE]);
        let other = RootKey::from([8u8; ROOT_KEY_SIZE]);

        assert_eq!(key.label(), again.label());
        assert_eq!(key.root_secret(), again.root_secret());
        assert_ne!(key.label(), other.label());
        assert_ne!(key.label(), hex::encode(key.root_secret().bytes()));
        assert_ne!(key.label(), key.to_hex());
    }

    #[test]
    fn test_hex_round_trip() {
        let key = RootKey::generate();
        assert_eq!(RootKey::from_hex(&key.to_hex()).unwrap(), key);
        assert!(matches!(
            RootKey::from_hex("zz"),
            Err(KeyError::Encoding(_))
        ));
    }
}
