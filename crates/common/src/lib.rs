/**
 * Cryptographic types and operations.
 *  - Per-node content secrets
 *  - Root key derivation for private trees
 */
pub mod crypto;
/**
 * The private forest: the unencrypted index of
 *  every private root sharing a block store, and
 *  the Version / PrivateRef pair that names one
 *  snapshot of one tree inside it.
 */
pub mod forest;
/**
 * Internal wrapper around IPLD, renamed to
 *  something a little more down-to-earth.
 * Handles CIDs, codec tags and DAG-CBOR
 *  encoding of our blocks.
 */
pub mod linked_data;
/**
 * The operation protocol over a private tree.
 *  Every call consumes a Version and returns
 *  either the next Version or a payload.
 */
pub mod mount;
/**
 * Boundary types for embedding applications:
 *  result envelopes, the legacy listing encoding
 *  and a blocking bridge.
 */
pub mod protocol;
/**
 * Content-addressed block storage.
 *  The only storage primitive the protocol needs,
 *  plus serialization policies around it.
 */
pub mod store;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::crypto::{RootKey, Secret};
    pub use crate::forest::{Forest, PrivateRef, Version};
    pub use crate::linked_data::{Cid, Codec, Link};
    pub use crate::mount::{Entry, EntryKind, ErrorKind, FsConfig, Mount, MountError, PrivateFs};
    pub use crate::protocol::{Bridge, Config, Outcome};
    pub use crate::store::{BlockStore, BlockStoreError, MemoryBlockStore, StorePolicy};
    pub use crate::version::build_info;
}
