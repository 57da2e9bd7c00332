//! The operation protocol over private trees
//!
//! - **[`PrivateFs`]**: the stateless engine. Every operation takes a
//!   [`Version`](crate::forest::Version) and a path, and returns either the
//!   next Version (mutations) or a payload (reads)
//! - **[`Mount`]**: a handle keeping the head Version of one tree and
//!   running its mutations one at a time
//! - **[`Node`]**: the encrypted directory nodes trees are built from
//! - **[`MountError`]** / **[`ErrorKind`]**: the failure taxonomy
//!
//! # Layout
//!
//! ```text
//! Forest (unencrypted) --label--> Root Node (sealed with the root secret)
//!                                     |
//!                  +------------------+------------------+
//!                  |                  |                  |
//!                File1            Dir Node             File2
//!            (sealed chunks)      (sealed)         (sealed chunks)
//! ```
//!
//! Secrets live in the parent's link, so opening the root with the secret
//! from a private reference opens the whole tree. Mutations never modify a
//! block: they reseal the touched path up to the root under fresh secrets
//! and write a new forest revision, leaving every earlier Version readable.

mod error;
mod fs;
mod handle;
mod maybe_mime;
mod node;
mod path;

pub use error::{ErrorKind, MountError};
pub use fs::{Entry, EntryKind, FsConfig, PrivateFs, DEFAULT_CHUNK_SIZE};
pub use handle::Mount;
pub use maybe_mime::MaybeMime;
pub use node::{Data, Metadata, Node, NodeLink};
pub use path::TreePath;
