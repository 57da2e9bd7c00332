use clap::Args;

use crate::state::{AppConfig, AppState, Backend, Policy, StoreConfig};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Block store backend
    #[arg(long, value_enum, default_value_t = Backend::Files)]
    pub backend: Backend,

    /// How calls reach the block store
    #[arg(long, value_enum, default_value_t = Policy::Direct)]
    pub policy: Policy,

    /// Plaintext bytes per stored file chunk (default: 256 KiB)
    #[arg(long)]
    pub chunk_size: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] crate::state::StateError),
}

#[async_trait::async_trait]
impl crate::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            chunk_size: self.chunk_size.unwrap_or(defaults.chunk_size),
            store: StoreConfig {
                backend: self.backend,
                policy: self.policy,
                ..StoreConfig::default()
            },
            ..defaults
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        let output = format!(
            "Initialized pforest directory at: {}\n\
             - Blocks: {}\n\
             - Config: {}\n\
             - Backend: {:?} ({:?})\n\
             - Chunk size: {} bytes",
            state.dir.display(),
            state.blocks_path.display(),
            state.config_path.display(),
            state.config.store.backend,
            state.config.store.policy,
            state.config.chunk_size,
        );

        Ok(output)
    }
}
