use clap::Args;

use crate::tree::{Tree, TreeError};

/// Print the Version token commands act on
#[derive(Args, Debug, Clone)]
pub struct Head;

#[async_trait::async_trait]
impl crate::op::Op for Head {
    type Error = TreeError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let tree = Tree::open(ctx).await?;
        Ok(tree.version.to_string())
    }
}
