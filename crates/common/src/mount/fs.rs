use std::fmt;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::crypto::{RootKey, Secret, SecretError};
use crate::forest::{Forest, PrivateRef, Version};
use crate::linked_data::{BlockEncoded, Cid, Codec, Link};
use crate::store::{BlockStore, BlockStoreError, StoreStats};

use super::maybe_mime::MaybeMime;
use super::node::{Data, Metadata, Node, NodeLink};
use super::path::TreePath;
use super::MountError;

/// Default size of a file chunk before encryption
pub const DEFAULT_CHUNK_SIZE: usize = 256 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FsConfig {
    /// Plaintext bytes per stored file chunk
    pub chunk_size: usize,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl FsConfig {
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::File => f.write_str("file"),
            EntryKind::Directory => f.write_str("dir"),
        }
    }
}

/// One row of a directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub kind: EntryKind,
    /// Unix seconds
    pub created: i64,
    /// Unix seconds
    pub modified: i64,
    /// Content length for files, zero for directories
    pub size: u64,
    pub mime: Option<String>,
}

impl Entry {
    fn from_link(name: &str, link: &NodeLink) -> Self {
        let metadata = link.metadata();
        let (kind, size, mime) = match link.data() {
            Some(data) => (
                EntryKind::File,
                data.size(),
                data.mime().as_str().map(str::to_string),
            ),
            None => (EntryKind::Directory, 0, None),
        };
        Self {
            name: name.to_string(),
            kind,
            created: metadata.created(),
            modified: metadata.modified(),
            size,
            mime,
        }
    }

    // the root is not linked from anywhere, so it has no recorded times
    fn root() -> Self {
        Self {
            name: String::new(),
            kind: EntryKind::Directory,
            created: 0,
            modified: 0,
            size: 0,
            mime: None,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// A resolved Version: the forest revision it names and its opened root node
struct Snapshot {
    cid: Cid,
    forest: Forest,
    private_ref: PrivateRef,
    root: Node,
}

/// The operation protocol over private trees in one block store.
///
/// `PrivateFs` holds no tree state. Every call takes the [`Version`] to act
///  on, and mutations return the next one; the input Version stays readable.
///  New nodes are always written bottom-up and the forest revision last, so a
///  failed call never yields a Version naming a partially written tree.
#[derive(Debug, Clone)]
pub struct PrivateFs<B> {
    store: B,
    config: FsConfig,
}

impl<B: BlockStore> PrivateFs<B> {
    pub fn new(store: B) -> Self {
        Self::with_config(store, FsConfig::default())
    }

    pub fn with_config(store: B, config: FsConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &B {
        &self.store
    }

    pub fn config(&self) -> &FsConfig {
        &self.config
    }

    pub fn stats(&self) -> StoreStats {
        self.store.stats()
    }

    /* Bootstrap */

    /// Persist an empty forest and return its CID
    pub async fn create_private_forest(&self) -> Result<Cid, MountError> {
        Forest::new().store(&self.store).await
    }

    /// Create a new forest holding a single empty tree derived from `key`.
    ///  An empty `key` derives the tree from a random one, reachable only
    ///  through the returned Version.
    pub async fn init(&self, key: &[u8]) -> Result<Version, MountError> {
        let key = RootKey::from_init_bytes(key)?;
        let cid = self.create_private_forest().await?;
        self.create_root_dir(&cid, &key).await
    }

    /// Add an empty tree derived from `key` to the forest at `cid`
    pub async fn create_root_dir(&self, cid: &Cid, key: &RootKey) -> Result<Version, MountError> {
        let forest = Forest::load(&self.store, cid).await?;
        let label = key.label();
        if forest.contains(&label) {
            return Err(MountError::AlreadyExists(format!("private root {}", label)));
        }

        let secret = key.root_secret();
        let root = self.put_node(&Node::default(), &secret).await?;
        let next = forest.next(*cid, &label, root);
        let next_cid = next.store(&self.store).await?;
        tracing::debug!("create_root_dir: root {} in forest {}", root.cid(), next_cid);
        Ok(Version::new(
            next_cid,
            PrivateRef::new(label, secret, *root.cid()),
        ))
    }

    /// Re-derive the Version of the tree owned by `key` in the forest at `cid`
    pub async fn load_with_key(&self, key: &RootKey, cid: &Cid) -> Result<Version, MountError> {
        let forest = Forest::load(&self.store, cid).await?;
        let label = key.label();
        let root = forest
            .root(&label)
            .ok_or(MountError::AccessDenied("key does not match any tree in this forest"))?;
        let secret = key.root_secret();
        self.open_root(root.cid(), &secret).await?;
        Ok(Version::new(
            *cid,
            PrivateRef::new(label, secret, *root.cid()),
        ))
    }

    pub async fn get_private_ref(&self, key: &RootKey, cid: &Cid) -> Result<PrivateRef, MountError> {
        let version = self.load_with_key(key, cid).await?;
        Ok(version.private_ref().clone())
    }

    /* Mutations */

    /// Create a directory and any missing parents. Existing directories are
    ///  left as they are; a file in the way is an error.
    pub async fn mkdir(&self, version: &Version, path: &str) -> Result<Version, MountError> {
        let path = TreePath::parse_target(path)?;
        let snapshot = self.open(version).await?;
        tracing::debug!("mkdir: {}", path);

        let Some((parent, name)) = path.split() else {
            return self.commit(&snapshot, &snapshot.root).await;
        };
        let now = Metadata::now();
        let empty = self.new_dir(now).await?;
        let (root, ()) = self
            .edit_dir(&snapshot.root, &parent, true, now, |dir| {
                match dir.get_link(name) {
                    Some(NodeLink::Dir(..)) => Ok(()),
                    Some(NodeLink::Data(..)) => Err(MountError::AlreadyExists(path.to_string())),
                    None => {
                        dir.insert(name.to_string(), empty);
                        Ok(())
                    }
                }
            })
            .await?;
        self.commit(&snapshot, &root).await
    }

    pub async fn write_file(
        &self,
        version: &Version,
        path: &str,
        data: &[u8],
    ) -> Result<Version, MountError> {
        self.write_file_stream(version, path, data).await
    }

    /// Write a file from a reader, one chunk in memory at a time.
    ///  Missing parents are created; overwriting a file keeps its creation time.
    pub async fn write_file_stream<R>(
        &self,
        version: &Version,
        path: &str,
        reader: R,
    ) -> Result<Version, MountError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let path = TreePath::parse_target(path)?;
        let snapshot = self.open(version).await?;
        let (parent, name) = path
            .split()
            .ok_or_else(|| MountError::NotAFile(path.to_string()))?;

        let now = Metadata::now();
        let metadata = match self.get_link(&snapshot.root, &path).await {
            Ok(NodeLink::Dir(..)) => return Err(MountError::NotAFile(path.to_string())),
            Ok(NodeLink::Data(_, data)) => data.metadata().touched(&now),
            Err(MountError::PathNotFound(_)) => now,
            Err(e) => return Err(e),
        };

        let link = self.store_content(reader, name, metadata).await?;
        tracing::debug!(
            "write_file: {} ({} bytes)",
            path,
            link.data().map(Data::size).unwrap_or_default()
        );
        let (root, ()) = self
            .edit_dir(&snapshot.root, &parent, true, now, |dir| {
                dir.insert(name.to_string(), link);
                Ok(())
            })
            .await?;
        self.commit(&snapshot, &root).await
    }

    pub async fn write_file_from_path(
        &self,
        version: &Version,
        path: &str,
        source: &Path,
    ) -> Result<Version, MountError> {
        let data = tokio::fs::read(source).await?;
        self.write_file(version, path, &data).await
    }

    pub async fn write_file_stream_from_path(
        &self,
        version: &Version,
        path: &str,
        source: &Path,
    ) -> Result<Version, MountError> {
        let file = tokio::fs::File::open(source).await?;
        self.write_file_stream(version, path, tokio::io::BufReader::new(file))
            .await
    }

    /// Remove a file or a whole directory
    pub async fn rm(&self, version: &Version, path: &str) -> Result<Version, MountError> {
        let path = TreePath::parse(path)?;
        let (parent, name) = path.split().ok_or_else(|| MountError::InvalidPath {
            path: path.to_string(),
            reason: "cannot remove the root",
        })?;
        let snapshot = self.open(version).await?;
        tracing::debug!("rm: {}", path);

        let (root, _) = self
            .edit_dir(&snapshot.root, &parent, false, Metadata::now(), |dir| {
                dir.del(name)
                    .ok_or_else(|| MountError::PathNotFound(path.to_string()))
            })
            .await?;
        self.commit(&snapshot, &root).await
    }

    /// Move an entry, keeping its timestamps. The target must not exist.
    pub async fn mv(&self, version: &Version, from: &str, to: &str) -> Result<Version, MountError> {
        let from = TreePath::parse(from)?;
        let to = TreePath::parse_target(to)?;
        let (Some((from_parent, from_name)), Some((to_parent, to_name))) = (from.split(), to.split())
        else {
            return Err(MountError::InvalidPath {
                path: format!("{} -> {}", from, to),
                reason: "cannot move the root",
            });
        };

        let snapshot = self.open(version).await?;
        self.get_link(&snapshot.root, &from).await?;
        if from == to {
            return Err(MountError::AlreadyExists(to.to_string()));
        }
        if to.starts_with(&from) {
            return Err(MountError::InvalidPath {
                path: format!("{} -> {}", from, to),
                reason: "cannot move a path inside itself",
            });
        }
        self.ensure_vacant(&snapshot.root, &to).await?;
        tracing::debug!("mv: {} -> {}", from, to);

        let now = Metadata::now();
        let (root, moved) = self
            .edit_dir(&snapshot.root, &from_parent, false, now, |dir| {
                dir.del(from_name)
                    .ok_or_else(|| MountError::PathNotFound(from.to_string()))
            })
            .await?;
        let (root, ()) = self
            .edit_dir(&root, &to_parent, true, now, |dir| {
                dir.insert(to_name.to_string(), moved);
                Ok(())
            })
            .await?;
        self.commit(&snapshot, &root).await
    }

    /// Copy an entry. The copy shares the source's immutable blocks and gets
    ///  fresh timestamps; the source is untouched.
    pub async fn cp(&self, version: &Version, from: &str, to: &str) -> Result<Version, MountError> {
        let from = TreePath::parse(from)?;
        let to = TreePath::parse_target(to)?;
        let (to_parent, to_name) = to
            .split()
            .ok_or_else(|| MountError::AlreadyExists(to.to_string()))?;

        let snapshot = self.open(version).await?;
        let now = Metadata::now();
        let copy = if from.is_root() {
            // the root has no link of its own; seal a copy under a new secret
            let secret = Secret::generate();
            let link = self.put_node(&snapshot.root, &secret).await?;
            NodeLink::Dir(link, secret, now)
        } else {
            self.get_link(&snapshot.root, &from).await?.restamped(now)
        };
        self.ensure_vacant(&snapshot.root, &to).await?;
        tracing::debug!("cp: {} -> {}", from, to);

        let (root, ()) = self
            .edit_dir(&snapshot.root, &to_parent, true, now, |dir| {
                dir.insert(to_name.to_string(), copy);
                Ok(())
            })
            .await?;
        self.commit(&snapshot, &root).await
    }

    /* Reads */

    pub async fn read_file(&self, version: &Version, path: &str) -> Result<Vec<u8>, MountError> {
        let mut out = Vec::new();
        self.read_file_stream(version, path, &mut out).await?;
        Ok(out)
    }

    /// Decrypt a file into `writer` chunk by chunk, returning the bytes written
    pub async fn read_file_stream<W>(
        &self,
        version: &Version,
        path: &str,
        writer: &mut W,
    ) -> Result<u64, MountError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let path = TreePath::parse(path)?;
        let (secret, data) = self.resolve_file(version, &path).await?;
        self.write_chunks(&path, &secret, &data, writer).await
    }

    async fn resolve_file(
        &self,
        version: &Version,
        path: &TreePath,
    ) -> Result<(Secret, Data), MountError> {
        let snapshot = self.open(version).await?;
        let (secret, data) = self.get_file(&snapshot.root, path).await?;
        tracing::debug!("read_file: {} ({} chunks)", path, data.chunks().len());
        Ok((secret, data))
    }

    async fn write_chunks<W>(
        &self,
        path: &TreePath,
        secret: &Secret,
        data: &Data,
        writer: &mut W,
    ) -> Result<u64, MountError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let mut written = 0u64;
        for chunk in data.chunks() {
            let sealed = self.get_block(chunk.cid()).await?;
            let plain = secret.decrypt(&sealed).map_err(|e| {
                MountError::Malformed(format!("chunk {} of {}: {}", chunk.cid(), path, e))
            })?;
            writer.write_all(&plain).await?;
            written += plain.len() as u64;
        }
        writer.flush().await?;

        if written != data.size() {
            return Err(MountError::Malformed(format!(
                "{} holds {} bytes, expected {}",
                path,
                written,
                data.size()
            )));
        }
        Ok(written)
    }

    pub async fn read_file_to_path(
        &self,
        version: &Version,
        path: &str,
        destination: &Path,
    ) -> Result<u64, MountError> {
        let data = self.read_file(version, path).await?;
        tokio::fs::write(destination, &data).await?;
        Ok(data.len() as u64)
    }

    pub async fn read_file_stream_to_path(
        &self,
        version: &Version,
        path: &str,
        destination: &Path,
    ) -> Result<u64, MountError> {
        let path = TreePath::parse(path)?;
        let (secret, data) = self.resolve_file(version, &path).await?;

        // the destination is only replaced once every chunk decrypted
        let partial = partial_path(destination)?;
        let result = async {
            let mut file = tokio::fs::File::create(&partial).await?;
            let written = self.write_chunks(&path, &secret, &data, &mut file).await?;
            file.sync_all().await?;
            Ok::<_, MountError>(written)
        }
        .await;
        match result {
            Ok(written) => {
                tokio::fs::rename(&partial, destination).await?;
                Ok(written)
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&partial).await;
                Err(e)
            }
        }
    }

    /// List a directory, sorted by name
    pub async fn ls(&self, version: &Version, path: &str) -> Result<Vec<Entry>, MountError> {
        let path = TreePath::parse(path)?;
        let snapshot = self.open(version).await?;
        let dir = self.get_dir(&snapshot.root, &path).await?;
        Ok(dir
            .get_links()
            .iter()
            .map(|(name, link)| Entry::from_link(name, link))
            .collect())
    }

    pub async fn stat(&self, version: &Version, path: &str) -> Result<Entry, MountError> {
        let path = TreePath::parse(path)?;
        let snapshot = self.open(version).await?;
        match path.name() {
            None => Ok(Entry::root()),
            Some(name) => {
                let link = self.get_link(&snapshot.root, &path).await?;
                Ok(Entry::from_link(name, &link))
            }
        }
    }

    /// Forest revisions from `version` back to the genesis forest, newest first
    pub async fn history(&self, version: &Version) -> Result<Vec<Cid>, MountError> {
        let mut cids = vec![*version.cid()];
        let mut forest = Forest::load(&self.store, version.cid()).await?;
        while let Some(previous) = forest.previous().copied() {
            cids.push(previous);
            forest = Forest::load(&self.store, &previous).await?;
        }
        Ok(cids)
    }

    /* Internals */

    async fn open(&self, version: &Version) -> Result<Snapshot, MountError> {
        let forest = Forest::load(&self.store, version.cid()).await?;
        let private_ref = version.private_ref();
        let root = forest
            .root(private_ref.label())
            .ok_or(MountError::AccessDenied("forest holds no tree for this reference"))?;
        if root.cid() != private_ref.content() {
            return Err(MountError::Malformed(format!(
                "forest {} points at root {}, reference names {}",
                version.cid(),
                root.cid(),
                private_ref.content()
            )));
        }
        let root = self.open_root(root.cid(), private_ref.secret()).await?;
        Ok(Snapshot {
            cid: *version.cid(),
            forest,
            private_ref: private_ref.clone(),
            root,
        })
    }

    async fn open_root(&self, cid: &Cid, secret: &Secret) -> Result<Node, MountError> {
        let sealed = self.get_block(cid).await?;
        let data = match secret.decrypt(&sealed) {
            Ok(data) => data,
            Err(SecretError::Decrypt) => {
                return Err(MountError::AccessDenied("reference does not open this tree"))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Node::decode(&data)?)
    }

    /// Seal `root` under the tree's root secret and write the next forest revision
    async fn commit(&self, snapshot: &Snapshot, root: &Node) -> Result<Version, MountError> {
        let private_ref = &snapshot.private_ref;
        let root_link = self.put_node(root, private_ref.secret()).await?;
        let forest = snapshot
            .forest
            .next(snapshot.cid, private_ref.label(), root_link);
        let cid = forest.store(&self.store).await?;
        tracing::debug!(
            "commit: forest {} -> {} (height {})",
            snapshot.cid,
            cid,
            forest.height()
        );
        Ok(Version::new(cid, private_ref.with_content(*root_link.cid())))
    }

    async fn get_block(&self, cid: &Cid) -> Result<Bytes, MountError> {
        match self.store.get(cid).await {
            Ok(data) => Ok(data),
            Err(BlockStoreError::NotFound(cid)) => {
                tracing::error!("_get_block: block {} NOT FOUND in store", cid);
                Err(MountError::MissingBlock(cid))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_node(&self, link: &Link, secret: &Secret) -> Result<Node, MountError> {
        let cid = link.cid();
        tracing::trace!("_get_node: {}", cid);
        let sealed = self.get_block(cid).await?;
        let data = secret
            .decrypt(&sealed)
            .map_err(|e| MountError::Malformed(format!("node {}: {}", cid, e)))?;
        Node::decode(&data).map_err(|e| MountError::Malformed(format!("node {}: {}", cid, e)))
    }

    async fn put_node(&self, node: &Node, secret: &Secret) -> Result<Link, MountError> {
        let data = secret.encrypt(&node.encode()?)?;
        // sealed nodes are opaque bytes to the store
        let cid = self.store.put(Bytes::from(data), Codec::RAW).await?;
        Ok(Link::new(Codec::RAW, cid))
    }

    async fn new_dir(&self, metadata: Metadata) -> Result<NodeLink, MountError> {
        let secret = Secret::generate();
        let link = self.put_node(&Node::default(), &secret).await?;
        Ok(NodeLink::Dir(link, secret, metadata))
    }

    async fn store_content<R>(
        &self,
        mut reader: R,
        name: &str,
        metadata: Metadata,
    ) -> Result<NodeLink, MountError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let secret = Secret::generate();
        let mut chunks = Vec::new();
        let mut size = 0u64;
        let mut buffer = vec![0u8; self.config.chunk_size];
        loop {
            let filled = read_chunk(&mut reader, &mut buffer).await?;
            if filled == 0 {
                break;
            }
            let sealed = secret.encrypt(&buffer[..filled])?;
            let cid = self.store.put(Bytes::from(sealed), Codec::RAW).await?;
            chunks.push(Link::new(Codec::RAW, cid));
            size += filled as u64;
            if filled < buffer.len() {
                break;
            }
        }
        let mime = MaybeMime::from_path(Path::new(name));
        Ok(NodeLink::Data(secret, Data::new(chunks, size, mime, metadata)))
    }

    async fn get_dir(&self, root: &Node, path: &TreePath) -> Result<Node, MountError> {
        let mut current = root.clone();
        let mut consumed = TreePath::root();
        for segment in path.segments() {
            consumed = consumed.join(segment);
            let next = match current.get_link(segment) {
                Some(NodeLink::Dir(link, secret, _)) => self.get_node(link, secret).await?,
                Some(NodeLink::Data(..)) => {
                    return Err(MountError::NotADirectory(consumed.to_string()))
                }
                None => return Err(MountError::PathNotFound(consumed.to_string())),
            };
            current = next;
        }
        Ok(current)
    }

    async fn get_link(&self, root: &Node, path: &TreePath) -> Result<NodeLink, MountError> {
        let (parent, name) = path.split().ok_or_else(|| MountError::InvalidPath {
            path: path.to_string(),
            reason: "the root has no entry",
        })?;
        let dir = self.get_dir(root, &parent).await?;
        dir.get_link(name)
            .cloned()
            .ok_or_else(|| MountError::PathNotFound(path.to_string()))
    }

    async fn get_file(&self, root: &Node, path: &TreePath) -> Result<(Secret, Data), MountError> {
        if path.is_root() {
            return Err(MountError::NotAFile(path.to_string()));
        }
        match self.get_link(root, path).await? {
            NodeLink::Data(secret, data) => Ok((secret, data)),
            NodeLink::Dir(..) => Err(MountError::NotAFile(path.to_string())),
        }
    }

    async fn ensure_vacant(&self, root: &Node, path: &TreePath) -> Result<(), MountError> {
        match self.get_link(root, path).await {
            Ok(_) => Err(MountError::AlreadyExists(path.to_string())),
            Err(MountError::PathNotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Apply `edit` to the directory at `dir` and reseal every ancestor up to
    ///  the root, each under a fresh secret. Returns the new (unsealed) root.
    ///
    /// With `create`, missing directories on the way are created. The edited
    ///  directory, and every directory that gained a new child, is stamped as
    ///  modified at `now`.
    async fn edit_dir<T, F>(
        &self,
        root: &Node,
        dir: &TreePath,
        create: bool,
        now: Metadata,
        edit: F,
    ) -> Result<(Node, T), MountError>
    where
        F: FnOnce(&mut Node) -> Result<T, MountError>,
    {
        // (parent, child name, child metadata, child created here)
        let mut visited: Vec<(Node, String, Metadata, bool)> = Vec::new();
        let mut current = root.clone();
        let mut consumed = TreePath::root();

        for segment in dir.segments() {
            consumed = consumed.join(segment);
            let (next, metadata, created) = match current.get_link(segment) {
                Some(NodeLink::Dir(link, secret, metadata)) => {
                    (self.get_node(link, secret).await?, *metadata, false)
                }
                Some(NodeLink::Data(..)) => {
                    return Err(MountError::NotADirectory(consumed.to_string()))
                }
                None if create => (Node::default(), now, true),
                None => return Err(MountError::PathNotFound(consumed.to_string())),
            };
            let parent = std::mem::replace(&mut current, next);
            visited.push((parent, segment.clone(), metadata, created));
        }

        let out = edit(&mut current)?;

        let mut dirty = true;
        while let Some((mut parent, name, metadata, created)) = visited.pop() {
            let metadata = if dirty {
                metadata.touched(&now)
            } else {
                metadata
            };
            let secret = Secret::generate();
            let link = self.put_node(&current, &secret).await?;
            parent.insert(name, NodeLink::Dir(link, secret, metadata));
            current = parent;
            dirty = created;
        }
        Ok((current, out))
    }
}

/// Sibling of `destination` that a streamed read is written to first
fn partial_path(destination: &Path) -> Result<PathBuf, MountError> {
    let name = destination
        .file_name()
        .ok_or_else(|| MountError::InvalidPath {
            path: destination.display().to_string(),
            reason: "destination has no file name",
        })?
        .to_string_lossy();
    let mut nonce = [0u8; 8];
    getrandom::getrandom(&mut nonce)
        .map_err(|e| std::io::Error::other(format!("failed to generate temp name: {}", e)))?;
    Ok(destination.with_file_name(format!(".{}.{}.part", name, hex::encode(nonce))))
}

async fn read_chunk<R: AsyncRead + Unpin>(
    reader: &mut R,
    buffer: &mut [u8],
) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        let n = reader.read(&mut buffer[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::store::MemoryBlockStore;

    fn setup_fs(chunk_size: usize) -> PrivateFs<MemoryBlockStore> {
        PrivateFs::with_config(MemoryBlockStore::new(), FsConfig::with_chunk_size(chunk_size))
    }

    #[tokio::test]
    async fn test_chunking() {
        let fs = setup_fs(4);
        let v0 = fs.init(&[0u8; 32]).await.unwrap();
        let data = b"0123456789";
        let v1 = fs.write_file(&v0, "ten.bin", data).await.unwrap();

        let snapshot = fs.open(&v1).await.unwrap();
        let (_, file) = fs
            .get_file(&snapshot.root, &"ten.bin".parse().unwrap())
            .await
            .unwrap();
        assert_eq!(file.chunks().len(), 3);
        assert_eq!(file.size(), 10);
        assert_eq!(fs.read_file(&v1, "ten.bin").await.unwrap(), data);
    }

    #[tokio::test]
    async fn test_exact_chunk_multiple() {
        let fs = setup_fs(4);
        let v0 = fs.init(&[0u8; 32]).await.unwrap();
        let v1 = fs.write_file(&v0, "eight", b"abcdefgh").await.unwrap();
        let snapshot = fs.open(&v1).await.unwrap();
        let (_, file) = fs
            .get_file(&snapshot.root, &"eight".parse().unwrap())
            .await
            .unwrap();
        assert_eq!(file.chunks().len(), 2);
        assert_eq!(fs.read_file(&v1, "eight").await.unwrap(), b"abcdefgh");
    }

    #[tokio::test]
    async fn test_chunks_are_sealed() {
        let fs = setup_fs(DEFAULT_CHUNK_SIZE);
        let v0 = fs.init(&[0u8; 32]).await.unwrap();
        let plaintext = b"a fairly recognisable plaintext";
        let v1 = fs.write_file(&v0, "secret.txt", plaintext).await.unwrap();

        let snapshot = fs.open(&v1).await.unwrap();
        let (_, file) = fs
            .get_file(&snapshot.root, &"secret.txt".parse().unwrap())
            .await
            .unwrap();
        let stored = fs.store().get(file.chunks()[0].cid()).await.unwrap();
        assert!(!stored
            .windows(plaintext.len())
            .any(|window| window == plaintext));
    }

    #[tokio::test]
    async fn test_every_commit_advances_the_forest() {
        let fs = setup_fs(DEFAULT_CHUNK_SIZE);
        let v0 = fs.init(&[0u8; 32]).await.unwrap();
        let v1 = fs.mkdir(&v0, "/").await.unwrap();
        assert_ne!(v0.cid(), v1.cid());

        let forest = Forest::load(fs.store(), v1.cid()).await.unwrap();
        assert_eq!(forest.previous(), Some(v0.cid()));
        assert_eq!(forest.height(), 2);
    }

    #[tokio::test]
    async fn test_touches_only_changed_directories() {
        let fs = setup_fs(DEFAULT_CHUNK_SIZE);
        let v0 = fs.init(&[0u8; 32]).await.unwrap();
        let v1 = fs.mkdir(&v0, "a/b").await.unwrap();
        let snapshot = fs.open(&v1).await.unwrap();

        let old = Metadata::at(10);
        let (root, ()) = fs
            .edit_dir(&snapshot.root, &"a/b".parse().unwrap(), false, old, |_| Ok(()))
            .await
            .unwrap();
        let a = root.get_link("a").unwrap();
        assert_ne!(a.metadata().modified(), 10);
        let a_node = match a {
            NodeLink::Dir(link, secret, _) => fs.get_node(link, secret).await.unwrap(),
            _ => panic!("expected a directory"),
        };
        assert_eq!(a_node.get_link("b").unwrap().metadata().modified(), 10);
    }
}
