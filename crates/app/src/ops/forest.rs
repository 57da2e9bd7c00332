use clap::Args;

use crate::tree::{open_fs, TreeError};

/// Store an empty forest and print its CID
#[derive(Args, Debug, Clone)]
pub struct Forest;

#[async_trait::async_trait]
impl crate::op::Op for Forest {
    type Error = TreeError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let fs = open_fs(&state).await?;
        Ok(fs.create_private_forest().await?.to_string())
    }
}
