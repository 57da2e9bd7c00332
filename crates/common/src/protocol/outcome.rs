use serde::{Deserialize, Serialize};

use crate::mount::{ErrorKind, MountError};

/// A failed [`Outcome`], as an error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {reason}")]
pub struct Failure {
    pub kind: ErrorKind,
    pub reason: String,
}

impl From<MountError> for Failure {
    fn from(err: MountError) -> Self {
        Failure {
            kind: err.kind(),
            reason: err.to_string(),
        }
    }
}

/// Result envelope handed across the embedding boundary.
///
/// Exactly one of payload or reason is present. Serializes as
///  `{"status":"ok","result":...}` or
///  `{"status":"err","kind":"not_found","reason":"..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome<T> {
    Ok { result: T },
    Err { kind: ErrorKind, reason: String },
}

impl<T> Outcome<T> {
    pub fn success(result: T) -> Self {
        Outcome::Ok { result }
    }

    pub fn failure(kind: ErrorKind, reason: impl Into<String>) -> Self {
        Outcome::Err {
            kind,
            reason: reason.into(),
        }
    }

    pub fn ok(&self) -> bool {
        matches!(self, Outcome::Ok { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Outcome::Ok { .. } => None,
            Outcome::Err { reason, .. } => Some(reason),
        }
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Outcome::Ok { .. } => None,
            Outcome::Err { kind, .. } => Some(*kind),
        }
    }

    pub fn result(&self) -> Option<&T> {
        match self {
            Outcome::Ok { result } => Some(result),
            Outcome::Err { .. } => None,
        }
    }

    pub fn into_result(self) -> Result<T, Failure> {
        match self {
            Outcome::Ok { result } => Ok(result),
            Outcome::Err { kind, reason } => Err(Failure { kind, reason }),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Ok { result } => Outcome::Ok { result: f(result) },
            Outcome::Err { kind, reason } => Outcome::Err { kind, reason },
        }
    }
}

impl<T> From<Result<T, MountError>> for Outcome<T> {
    fn from(result: Result<T, MountError>) -> Self {
        match result {
            Ok(result) => Outcome::Ok { result },
            Err(err) => {
                tracing::debug!("operation failed ({}): {}", err.kind(), err);
                Outcome::Err {
                    kind: err.kind(),
                    reason: err.to_string(),
                }
            }
        }
    }
}
