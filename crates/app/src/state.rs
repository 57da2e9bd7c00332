use std::sync::Arc;
use std::time::Duration;
use std::{fs, path::PathBuf};

use common::forest::TokenError;
use common::mount::DEFAULT_CHUNK_SIZE;
use common::prelude::{BlockStore, BlockStoreError, FsConfig, StorePolicy, Version};
use common::store::{BlobsBlockStore, FileBlockStore};
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "pforest";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const BLOCKS_DIR_NAME: &str = "blocks";
pub const HEAD_FILE_NAME: &str = "HEAD";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default log level, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Plaintext bytes per stored file chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default)]
    pub store: StoreConfig,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            chunk_size: default_chunk_size(),
            store: StoreConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn fs_config(&self) -> FsConfig {
        FsConfig::with_chunk_size(self.chunk_size)
    }
}

/// Where blocks live
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// One file per block
    #[default]
    Files,
    /// An iroh-blobs store
    Iroh,
}

/// How calls reach the block store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    #[default]
    Direct,
    Locked,
    Queued,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: Backend,
    #[serde(default)]
    pub policy: Policy,
    /// Per call bound for the queued policy
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            policy: Policy::default(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl StoreConfig {
    pub fn policy(&self) -> StorePolicy {
        match self.policy {
            Policy::Direct => StorePolicy::Direct,
            Policy::Locked => StorePolicy::Locked,
            Policy::Queued => StorePolicy::Queued {
                timeout: Duration::from_millis(self.timeout_ms),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the pforest directory (~/.pforest)
    pub dir: PathBuf,
    /// Path to the block directory
    pub blocks_path: PathBuf,
    /// Path to the file holding the current Version token
    pub head_path: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the state directory path (custom or default ~/.pforest)
    pub fn dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new state directory
    pub fn init(custom_path: Option<PathBuf>, config: Option<AppConfig>) -> Result<Self, StateError> {
        let dir = Self::dir(custom_path)?;
        if dir.join(CONFIG_FILE_NAME).exists() {
            return Err(StateError::AlreadyInitialized);
        }
        fs::create_dir_all(&dir)?;

        let blocks_path = dir.join(BLOCKS_DIR_NAME);
        fs::create_dir_all(&blocks_path)?;

        let config = config.unwrap_or_default();
        let config_path = dir.join(CONFIG_FILE_NAME);
        fs::write(&config_path, toml::to_string_pretty(&config)?)?;

        Ok(Self {
            head_path: dir.join(HEAD_FILE_NAME),
            dir,
            blocks_path,
            config_path,
            config,
        })
    }

    /// Load existing state from the state directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let dir = Self::dir(custom_path)?;
        if !dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let blocks_path = dir.join(BLOCKS_DIR_NAME);
        let config_path = dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }
        if !blocks_path.exists() {
            return Err(StateError::MissingFile(format!("{}/", BLOCKS_DIR_NAME)));
        }

        let config: AppConfig = toml::from_str(&fs::read_to_string(&config_path)?)?;

        Ok(Self {
            head_path: dir.join(HEAD_FILE_NAME),
            dir,
            blocks_path,
            config_path,
            config,
        })
    }

    /// Open the configured block store, wrapped in the configured policy
    pub async fn store(&self) -> Result<Arc<dyn BlockStore>, StateError> {
        let policy = self.config.store.policy();
        tracing::debug!(
            "opening {:?} store at {:?} ({:?})",
            self.config.store.backend,
            self.blocks_path,
            policy
        );
        let store = match self.config.store.backend {
            Backend::Files => policy.apply(FileBlockStore::open(&self.blocks_path).await?),
            Backend::Iroh => policy.apply(BlobsBlockStore::fs(&self.blocks_path).await?),
        };
        Ok(store)
    }

    /// The current Version, if a tree was ever created or loaded here
    pub fn read_head(&self) -> Result<Option<Version>, StateError> {
        if !self.head_path.exists() {
            return Ok(None);
        }
        let token = fs::read_to_string(&self.head_path)?;
        Ok(Some(token.trim().parse::<Version>()?))
    }

    pub fn write_head(&self, version: &Version) -> Result<(), StateError> {
        fs::write(&self.head_path, format!("{}\n", version))?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("pforest directory not initialized. Run 'pforest init' first")]
    NotInitialized,

    #[error("pforest directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("HEAD is not a valid version: {0}")]
    InvalidHead(#[from] TokenError),

    #[error("block store error: {0}")]
    Store(#[from] BlockStoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
