use std::fmt;
use std::str::FromStr;

use super::MountError;
use crate::protocol::listing_conflict;

/// A parsed path inside a private tree.
///
/// Paths are slash separated and always relative to the tree root. Whitespace
/// around the path and any leading or trailing slashes are ignored, so `""`,
/// `"/"` and `" / "` all name the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TreePath {
    segments: Vec<String>,
}

impl TreePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn parse(path: &str) -> Result<Self, MountError> {
        let trimmed = path.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }

        let invalid = |reason| MountError::InvalidPath {
            path: path.to_string(),
            reason,
        };
        let mut segments = Vec::new();
        for segment in trimmed.split('/') {
            match segment {
                "" => return Err(invalid("empty path segment")),
                "." | ".." => return Err(invalid("relative path segment")),
                _ => segments.push(segment.to_string()),
            }
        }
        Ok(Self { segments })
    }

    /// Parse a path that a mutation is about to create. Every segment must
    ///  be a name a directory listing can carry.
    pub fn parse_target(path: &str) -> Result<Self, MountError> {
        let parsed = Self::parse(path)?;
        for segment in &parsed.segments {
            if let Some(reason) = listing_conflict(segment) {
                return Err(MountError::InvalidPath {
                    path: path.to_string(),
                    reason,
                });
            }
        }
        Ok(parsed)
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment, `None` for the root
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn parent(&self) -> Option<TreePath> {
        let (_, parent) = self.segments.split_last()?;
        Some(Self {
            segments: parent.to_vec(),
        })
    }

    /// Split into parent directory and leaf name, `None` for the root
    pub fn split(&self) -> Option<(TreePath, &str)> {
        let (name, parent) = self.segments.split_last()?;
        Some((
            Self {
                segments: parent.to_vec(),
            },
            name.as_str(),
        ))
    }

    pub fn join(&self, name: &str) -> TreePath {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self { segments }
    }

    /// True if `self` is `other` or lies below it
    pub fn starts_with(&self, other: &TreePath) -> bool {
        self.segments.starts_with(&other.segments)
    }
}

impl FromStr for TreePath {
    type Err = MountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}
