//! Cryptographic primitives for private trees
//!
//! - **Content encryption**: every node and every file has its own
//!   ChaCha20-Poly1305 [`Secret`]. Blocks carry a BLAKE3 hash of their
//!   plaintext inside the sealed payload, checked on every decrypt.
//! - **Root keys**: a caller supplied 32 byte [`RootKey`] derives both the
//!   public label of a tree in its forest and the secret of its root node.
//!   Knowing a forest CID without the key reveals neither.

mod keys;
mod secret;

pub use keys::{KeyError, RootKey, ROOT_KEY_SIZE};
pub use secret::{Secret, SecretError, BLAKE3_HASH_SIZE, SECRET_SIZE};
