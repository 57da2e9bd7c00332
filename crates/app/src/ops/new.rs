use clap::Args;

use common::prelude::{Cid, RootKey};

use crate::tree::{open_fs, TreeError};

/// Create a tree and make it HEAD
#[derive(Args, Debug, Clone)]
pub struct New {
    /// Hex encoded 32 byte root key (generated and printed if omitted)
    #[arg(long)]
    pub key: Option<String>,

    /// Add the tree to this existing forest instead of a fresh one
    #[arg(long)]
    pub forest: Option<String>,
}

pub(crate) fn parse_key(hex: &str) -> Result<RootKey, TreeError> {
    RootKey::from_hex(hex).map_err(|e| TreeError::Key(e.to_string()))
}

pub(crate) fn parse_cid(cid: &str) -> Result<Cid, TreeError> {
    Cid::try_from(cid).map_err(|e| TreeError::Token(e.into()))
}

#[async_trait::async_trait]
impl crate::op::Op for New {
    type Error = TreeError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let fs = open_fs(&state).await?;

        let (key, generated) = match &self.key {
            Some(hex) => (parse_key(hex)?, false),
            None => (RootKey::generate(), true),
        };
        let version = match &self.forest {
            Some(cid) => fs.create_root_dir(&parse_cid(cid)?, &key).await?,
            None => fs.init(key.bytes()).await?,
        };
        state.write_head(&version)?;
        tracing::info!("new tree {} in forest {}", key.label(), version.cid());

        if generated {
            Ok(format!("{}\nroot key (keep it safe): {}", version, key.to_hex()))
        } else {
            Ok(version.to_string())
        }
    }
}
