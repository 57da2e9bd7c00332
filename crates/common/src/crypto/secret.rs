//! Symmetric encryption of tree nodes and file chunks.
//!
//! Every directory node and every file owns its own [`Secret`]. Rewriting a
//! node always draws a fresh one, so two snapshots of the same tree never
//! share key material for content that changed between them.

use std::fmt;
use std::ops::Deref;

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use serde::{Deserialize, Serialize};

/// Size of ChaCha20-Poly1305 nonce in bytes
pub const NONCE_SIZE: usize = 12;
/// Size of ChaCha20-Poly1305 key in bytes (256 bits)
pub const SECRET_SIZE: usize = 32;
/// Size of BLAKE3 hash in bytes (256 bits)
pub const BLAKE3_HASH_SIZE: usize = 32;
/// Size of the Poly1305 authentication tag
pub const TAG_SIZE: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    /// Authentication failed: wrong key or tampered ciphertext
    #[error("decryption failed")]
    Decrypt,
    /// Ciphertext authenticated but its plaintext header is inconsistent
    #[error("integrity check failed: {0}")]
    Integrity(&'static str),
    #[error("invalid secret size, expected 32 bytes, got {0}")]
    Size(usize),
    #[error("secret error: {0}")]
    Default(#[from] anyhow::Error),
}

/// A 256-bit ChaCha20-Poly1305 key.
///
/// Ciphertext layout: `nonce (12) || seal(blake3(plaintext) (32) || plaintext) || tag (16)`.
/// A random nonce is drawn for every call to [`Secret::encrypt`], so encrypting
/// the same plaintext twice yields different blocks.
#[derive(PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Secret([u8; SECRET_SIZE]);

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret({}..)", hex::encode(&self.0[..4]))
    }
}

impl Deref for Secret {
    type Target = [u8; SECRET_SIZE];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<[u8; SECRET_SIZE]> for Secret {
    fn from(bytes: [u8; SECRET_SIZE]) -> Self {
        Secret(bytes)
    }
}

impl Secret {
    /// Generate a new random secret
    pub fn generate() -> Self {
        let mut buff = [0; SECRET_SIZE];
        getrandom::getrandom(&mut buff).expect("failed to generate random bytes");
        Self(buff)
    }

    pub fn from_slice(data: &[u8]) -> Result<Self, SecretError> {
        let buff: [u8; SECRET_SIZE] = data.try_into().map_err(|_| SecretError::Size(data.len()))?;
        Ok(buff.into())
    }

    pub fn bytes(&self) -> &[u8] {
        self.0.as_ref()
    }

    fn cipher(&self) -> ChaCha20Poly1305 {
        ChaCha20Poly1305::new(Key::from_slice(self.bytes()))
    }

    pub fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, SecretError> {
        let plaintext_hash = blake3::hash(data);

        let mut sealed = Vec::with_capacity(BLAKE3_HASH_SIZE + data.len());
        sealed.extend_from_slice(plaintext_hash.as_bytes());
        sealed.extend_from_slice(data);

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        getrandom::getrandom(&mut nonce_bytes)
            .map_err(|e| anyhow::anyhow!("failed to generate nonce: {}", e))?;
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher()
            .encrypt(nonce, sealed.as_ref())
            .map_err(|_| anyhow::anyhow!("encrypt error"))?;

        let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        out.extend_from_slice(nonce.as_ref());
        out.extend_from_slice(ciphertext.as_ref());
        Ok(out)
    }

    /// Open a sealed block, returning the plaintext with its hash header removed
    /// and verified.
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, SecretError> {
        let mut opened = self.open(data)?;
        let plaintext = opened.split_off(BLAKE3_HASH_SIZE);
        if opened.as_slice() != blake3::hash(&plaintext).as_bytes() {
            return Err(SecretError::Integrity("plaintext hash mismatch"));
        }
        Ok(plaintext)
    }

    /// Recover the BLAKE3 hash of the plaintext recorded inside a sealed block
    pub fn plaintext_hash(&self, data: &[u8]) -> Result<[u8; BLAKE3_HASH_SIZE], SecretError> {
        let opened = self.open(data)?;
        let mut hash = [0u8; BLAKE3_HASH_SIZE];
        hash.copy_from_slice(&opened[..BLAKE3_HASH_SIZE]);
        Ok(hash)
    }

    fn open(&self, data: &[u8]) -> Result<Vec<u8>, SecretError> {
        if data.len() < NONCE_SIZE + TAG_SIZE {
            return Err(SecretError::Integrity("ciphertext too short"));
        }
        let (nonce, ciphertext) = data.split_at(NONCE_SIZE);
        let opened = self
            .cipher()
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| SecretError::Decrypt)?;
        if opened.len() < BLAKE3_HASH_SIZE {
            return Err(SecretError::Integrity("missing hash header"));
        }
        Ok(opened)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_secret_encrypt_decrypt() {
        let secret = Secret::generate();
        let data = b"hello world, this is a test message for encryption";

        let encrypted = secret.encrypt(data).unwrap();
        let decrypted = secret.decrypt(&encrypted).unwrap();

        assert_eq!(data.as_slice(), decrypted.as_slice());
    }

    #[test]
    fn test_nonce_is_fresh_per_call() {
        let secret = Secret::generate();
        let a = secret.encrypt(b"same").unwrap();
        let b = secret.encrypt(b"same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_wrong_secret_is_decrypt_error() {
        let encrypted = Secret::generate().encrypt(b"private").unwrap();
        let result = Secret::generate().decrypt(&encrypted);
        assert!(matches!(result, Err(SecretError::Decrypt)));
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let secret = Secret::generate();
        let mut encrypted = secret.encrypt(b"test data for integrity check").unwrap();
        encrypted[NONCE_SIZE + 10] ^= 0xFF;
        assert!(matches!(
            secret.decrypt(&encrypted),
            Err(SecretError::Decrypt)
        ));
    }

    #[test]
    fn test_truncated_ciphertext_fails() {
        let secret = Secret::generate();
        assert!(matches!(
            secret.decrypt(&[0u8; 8]),
            Err(SecretError::Integrity(_))
        ));
    }

    #[test]
    fn test_secret_size_validation() {
        assert!(matches!(
            Secret::from_slice(&[1u8; 16]),
            Err(SecretError::Size(16))
        ));
        assert!(Secret::from_slice(&[1u8; 64]).is_err());
        assert!(Secret::from_slice(&[1u8; SECRET_SIZE]).is_ok());
    }

    #[test]
    fn test_plaintext_hash() {
        let secret = Secret::generate();
        let data = b"test data for hash extraction";
        let encrypted = secret.encrypt(data).unwrap();
        let hash = secret.plaintext_hash(&encrypted).unwrap();
        assert_eq!(hash, *blake3::hash(data).as_bytes());
    }

    #[test]
    fn test_empty_data_encryption() {
        let secret = Secret::generate();
        let encrypted = secret.encrypt(b"").unwrap();
        assert_eq!(encrypted.len(), NONCE_SIZE + BLAKE3_HASH_SIZE + TAG_SIZE);
        assert!(secret.decrypt(&encrypted).unwrap().is_empty());
    }

    #[test]
    fn test_debug_does_not_print_whole_key() {
        let secret = Secret::from([0xab; SECRET_SIZE]);
        let rendered = format!("{:?}", secret);
        assert_eq!(rendered, "Secret(abababab..)");
    }
}
