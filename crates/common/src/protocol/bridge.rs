use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::runtime::Runtime;

use crate::crypto::RootKey;
use crate::forest::{TokenError, Version};
use crate::linked_data::Cid;
use crate::mount::{Entry, FsConfig, MountError, PrivateFs};
use crate::store::{BlockStore, StorePolicy, StoreStats};

use super::listing::encode_listing;
use super::Outcome;

/// The two strings an embedder keeps between calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub cid: String,
    pub private_ref: String,
}

impl Config {
    /// Single-string form, `<cid>.<private ref>`
    pub fn token(&self) -> String {
        format!("{}.{}", self.cid, self.private_ref)
    }

    pub fn to_version(&self) -> Result<Version, TokenError> {
        Version::from_parts(&self.cid, &self.private_ref)
    }
}

impl From<Version> for Config {
    fn from(version: Version) -> Self {
        let (cid, private_ref) = version.into_parts();
        Config { cid, private_ref }
    }
}

/// A Version as handed in by an embedder, either as one token or as the
///  two halves of a [`Config`].
#[derive(Debug, Clone, Copy)]
pub enum Handle<'a> {
    Token(&'a str),
    Parts { cid: &'a str, private_ref: &'a str },
}

impl Handle<'_> {
    pub fn resolve(&self) -> Result<Version, MountError> {
        let version = match self {
            Handle::Token(token) => token.parse::<Version>()?,
            Handle::Parts { cid, private_ref } => Version::from_parts(cid, private_ref)?,
        };
        Ok(version)
    }
}

impl<'a> From<&'a str> for Handle<'a> {
    fn from(token: &'a str) -> Self {
        Handle::Token(token)
    }
}

impl<'a> From<(&'a str, &'a str)> for Handle<'a> {
    fn from((cid, private_ref): (&'a str, &'a str)) -> Self {
        Handle::Parts { cid, private_ref }
    }
}

impl<'a> From<&'a Config> for Handle<'a> {
    fn from(config: &'a Config) -> Self {
        Handle::Parts {
            cid: &config.cid,
            private_ref: &config.private_ref,
        }
    }
}

fn parse_cid(cid: &str) -> Result<Cid, MountError> {
    Cid::try_from(cid).map_err(|e| MountError::Token(TokenError::Cid(e)))
}

/// Blocking entry point for hosts without an async runtime.
///
/// Owns a runtime and a [`PrivateFs`]. Every method blocks until the
///  operation finishes and reports through an [`Outcome`]; nothing panics
///  or raises across this boundary. Versions go in and come out as strings.
///
/// Must not be called from inside another tokio runtime.
pub struct Bridge<B> {
    runtime: Runtime,
    fs: PrivateFs<B>,
}

impl<B> std::fmt::Debug for Bridge<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge").finish_non_exhaustive()
    }
}

fn build_runtime() -> std::io::Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

impl Bridge<Arc<dyn BlockStore>> {
    /// Wrap `store` in `policy` on the bridge's own runtime
    pub fn with_policy<S: BlockStore + 'static>(
        store: S,
        policy: StorePolicy,
        config: FsConfig,
    ) -> std::io::Result<Self> {
        let runtime = build_runtime()?;
        let store = {
            let _guard = runtime.enter();
            policy.apply(store)
        };
        Ok(Self {
            runtime,
            fs: PrivateFs::with_config(store, config),
        })
    }
}

impl<B: BlockStore> Bridge<B> {
    pub fn new(store: B) -> std::io::Result<Self> {
        Self::with_config(store, FsConfig::default())
    }

    pub fn with_config(store: B, config: FsConfig) -> std::io::Result<Self> {
        Ok(Self {
            runtime: build_runtime()?,
            fs: PrivateFs::with_config(store, config),
        })
    }

    pub fn fs(&self) -> &PrivateFs<B> {
        &self.fs
    }

    pub fn stats(&self) -> StoreStats {
        self.fs.stats()
    }

    fn run<T, F>(&self, operation: F) -> Outcome<T>
    where
        F: Future<Output = Result<T, MountError>>,
    {
        self.runtime.block_on(operation).into()
    }

    /* Bootstrap */

    pub fn create_private_forest(&self) -> Outcome<String> {
        self.run(async { Ok(self.fs.create_private_forest().await?.to_string()) })
    }

    pub fn get_private_ref(&self, key: &[u8], cid: &str) -> Outcome<String> {
        self.run(async {
            let key = RootKey::try_from(key)?;
            let cid = parse_cid(cid)?;
            Ok(self.fs.get_private_ref(&key, &cid).await?.to_token())
        })
    }

    /// Fresh forest plus an empty tree; an empty key draws a random one
    pub fn init(&self, key: &[u8]) -> Outcome<Config> {
        self.run(async { self.fs.init(key).await.map(Config::from) })
    }

    pub fn create_root_dir(&self, cid: &str, key: &[u8]) -> Outcome<Config> {
        self.run(async {
            let key = RootKey::try_from(key)?;
            let cid = parse_cid(cid)?;
            self.fs.create_root_dir(&cid, &key).await.map(Config::from)
        })
    }

    pub fn load_with_key(&self, key: &[u8], cid: &str) -> Outcome<Config> {
        self.run(async {
            let key = RootKey::try_from(key)?;
            let cid = parse_cid(cid)?;
            self.fs.load_with_key(&key, &cid).await.map(Config::from)
        })
    }

    /* Mutations */

    pub fn mkdir<'a>(&self, handle: impl Into<Handle<'a>>, path: &str) -> Outcome<Config> {
        let handle = handle.into();
        self.run(async {
            let version = handle.resolve()?;
            self.fs.mkdir(&version, path).await.map(Config::from)
        })
    }

    pub fn write_file<'a>(
        &self,
        handle: impl Into<Handle<'a>>,
        path: &str,
        data: &[u8],
    ) -> Outcome<Config> {
        let handle = handle.into();
        self.run(async {
            let version = handle.resolve()?;
            self.fs.write_file(&version, path, data).await.map(Config::from)
        })
    }

    pub fn write_file_from_path<'a>(
        &self,
        handle: impl Into<Handle<'a>>,
        path: &str,
        source: &str,
    ) -> Outcome<Config> {
        let handle = handle.into();
        self.run(async {
            let version = handle.resolve()?;
            self.fs
                .write_file_from_path(&version, path, Path::new(source))
                .await
                .map(Config::from)
        })
    }

    pub fn write_file_stream_from_path<'a>(
        &self,
        handle: impl Into<Handle<'a>>,
        path: &str,
        source: &str,
    ) -> Outcome<Config> {
        let handle = handle.into();
        self.run(async {
            let version = handle.resolve()?;
            self.fs
                .write_file_stream_from_path(&version, path, Path::new(source))
                .await
                .map(Config::from)
        })
    }

    pub fn rm<'a>(&self, handle: impl Into<Handle<'a>>, path: &str) -> Outcome<Config> {
        let handle = handle.into();
        self.run(async {
            let version = handle.resolve()?;
            self.fs.rm(&version, path).await.map(Config::from)
        })
    }

    pub fn mv<'a>(&self, handle: impl Into<Handle<'a>>, from: &str, to: &str) -> Outcome<Config> {
        let handle = handle.into();
        self.run(async {
            let version = handle.resolve()?;
            self.fs.mv(&version, from, to).await.map(Config::from)
        })
    }

    pub fn cp<'a>(&self, handle: impl Into<Handle<'a>>, from: &str, to: &str) -> Outcome<Config> {
        let handle = handle.into();
        self.run(async {
            let version = handle.resolve()?;
            self.fs.cp(&version, from, to).await.map(Config::from)
        })
    }

    /* Reads */

    pub fn read_file<'a>(&self, handle: impl Into<Handle<'a>>, path: &str) -> Outcome<Vec<u8>> {
        let handle = handle.into();
        self.run(async {
            let version = handle.resolve()?;
            self.fs.read_file(&version, path).await
        })
    }

    /// Write the file's plaintext to `destination`, returning that path
    pub fn read_file_to_path<'a>(
        &self,
        handle: impl Into<Handle<'a>>,
        path: &str,
        destination: &str,
    ) -> Outcome<String> {
        let handle = handle.into();
        self.run(async {
            let version = handle.resolve()?;
            self.fs
                .read_file_to_path(&version, path, Path::new(destination))
                .await?;
            Ok(destination.to_string())
        })
    }

    pub fn read_filestream_to_path<'a>(
        &self,
        handle: impl Into<Handle<'a>>,
        path: &str,
        destination: &str,
    ) -> Outcome<String> {
        let handle = handle.into();
        self.run(async {
            let version = handle.resolve()?;
            self.fs
                .read_file_stream_to_path(&version, path, Path::new(destination))
                .await?;
            Ok(destination.to_string())
        })
    }

    /// Directory listing in the `!!!` / `???` byte encoding
    pub fn ls<'a>(&self, handle: impl Into<Handle<'a>>, path: &str) -> Outcome<Vec<u8>> {
        let handle = handle.into();
        self.run(async {
            let version = handle.resolve()?;
            let entries = self.fs.ls(&version, path).await?;
            encode_listing(&entries)
        })
    }

    pub fn ls_entries<'a>(&self, handle: impl Into<Handle<'a>>, path: &str) -> Outcome<Vec<Entry>> {
        let handle = handle.into();
        self.run(async {
            let version = handle.resolve()?;
            self.fs.ls(&version, path).await
        })
    }
}
