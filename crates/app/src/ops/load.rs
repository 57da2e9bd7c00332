use clap::Args;

use super::new::{parse_cid, parse_key};
use crate::tree::{open_fs, TreeError};

/// Re-derive the Version of a tree from its key and a forest CID
#[derive(Args, Debug, Clone)]
pub struct Load {
    /// Hex encoded 32 byte root key
    #[arg(long)]
    pub key: String,

    /// Forest CID to load from
    #[arg(long)]
    pub cid: String,
}

#[async_trait::async_trait]
impl crate::op::Op for Load {
    type Error = TreeError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let fs = open_fs(&state).await?;
        let version = fs
            .load_with_key(&parse_key(&self.key)?, &parse_cid(&self.cid)?)
            .await?;
        state.write_head(&version)?;
        Ok(version.to_string())
    }
}
