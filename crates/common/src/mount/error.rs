use std::fmt;

use serde::{Deserialize, Serialize};

use crate::crypto::{KeyError, SecretError};
use crate::forest::TokenError;
use crate::linked_data::{Cid, CodecError};
use crate::store::BlockStoreError;

/// Coarse classification of every failure the protocol can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    NotADirectory,
    NotAFile,
    AlreadyExists,
    AccessDenied,
    KeyDerivation,
    Storage,
    Malformed,
    InvalidPath,
    Timeout,
}

impl ErrorKind {
    /// Whether repeating the same call against the same Version may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Storage | ErrorKind::Timeout)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not found",
            ErrorKind::NotADirectory => "not a directory",
            ErrorKind::NotAFile => "not a file",
            ErrorKind::AlreadyExists => "already exists",
            ErrorKind::AccessDenied => "access denied",
            ErrorKind::KeyDerivation => "key derivation error",
            ErrorKind::Storage => "storage error",
            ErrorKind::Malformed => "malformed",
            ErrorKind::InvalidPath => "invalid path",
            ErrorKind::Timeout => "timeout",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MountError {
    #[error("path not found: {0}")]
    PathNotFound(String),
    #[error("not a directory: {0}")]
    NotADirectory(String),
    #[error("not a file: {0}")]
    NotAFile(String),
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: &'static str },
    #[error("no forest found at {0}")]
    ForestNotFound(Cid),
    #[error("block missing from store: {0}")]
    MissingBlock(Cid),
    #[error("access denied: {0}")]
    AccessDenied(&'static str),
    #[error("key derivation failed: {0}")]
    Key(#[from] KeyError),
    #[error("malformed tree: {0}")]
    Malformed(String),
    #[error("block store error: {0}")]
    Store(#[from] BlockStoreError),
    #[error("secret error: {0}")]
    Secret(#[from] SecretError),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("invalid version token: {0}")]
    Token(#[from] TokenError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("mount error: {0}")]
    Default(#[from] anyhow::Error),
}

impl MountError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MountError::PathNotFound(_) | MountError::ForestNotFound(_) => ErrorKind::NotFound,
            MountError::NotADirectory(_) => ErrorKind::NotADirectory,
            MountError::NotAFile(_) => ErrorKind::NotAFile,
            MountError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            MountError::InvalidPath { .. } => ErrorKind::InvalidPath,
            MountError::AccessDenied(_) => ErrorKind::AccessDenied,
            MountError::Key(_) => ErrorKind::KeyDerivation,
            MountError::Store(BlockStoreError::Timeout(_)) => ErrorKind::Timeout,
            MountError::MissingBlock(_)
            | MountError::Store(_)
            | MountError::Io(_)
            | MountError::Default(_) => ErrorKind::Storage,
            MountError::Malformed(_)
            | MountError::Secret(_)
            | MountError::Codec(_)
            | MountError::Token(_) => ErrorKind::Malformed,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}
