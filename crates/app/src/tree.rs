use std::sync::Arc;

use common::forest::TokenError;
use common::prelude::{BlockStore, MountError, PrivateFs, Version};

use crate::op::OpContext;
use crate::state::{AppState, StateError};

#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("invalid version token: {0}")]
    Token(#[from] TokenError),
    #[error("{} ({})", .0, .0.kind())]
    Mount(#[from] MountError),
    #[error("no tree yet. Run 'pforest new' or 'pforest load' first")]
    NoHead,
    #[error("invalid key: {0}")]
    Key(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// The engine over the configured store, without a Version
pub async fn open_fs(state: &AppState) -> Result<PrivateFs<Arc<dyn BlockStore>>, TreeError> {
    let store = state.store().await?;
    Ok(PrivateFs::with_config(store, state.config.fs_config()))
}

/// One tree at the Version picked by `--at`, or HEAD
pub struct Tree {
    pub state: AppState,
    pub fs: PrivateFs<Arc<dyn BlockStore>>,
    pub version: Version,
}

impl Tree {
    pub async fn open(ctx: &OpContext) -> Result<Self, TreeError> {
        let state = ctx.state()?;
        let version = match &ctx.at {
            Some(token) => token.parse::<Version>()?,
            None => state.read_head()?.ok_or(TreeError::NoHead)?,
        };
        let fs = open_fs(&state).await?;
        tracing::debug!("opened tree at {}", version.cid());
        Ok(Self { state, fs, version })
    }

    /// Make `next` the new HEAD and render it for output
    pub fn advance(&self, next: &Version) -> Result<String, TreeError> {
        self.state.write_head(next)?;
        tracing::info!("HEAD -> {}", next.cid());
        Ok(next.to_string())
    }
}
