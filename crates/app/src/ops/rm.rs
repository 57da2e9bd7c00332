use clap::Args;

use crate::tree::{Tree, TreeError};

/// Remove a file or directory
#[derive(Args, Debug, Clone)]
pub struct Rm {
    pub path: String,
}

#[async_trait::async_trait]
impl crate::op::Op for Rm {
    type Error = TreeError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let tree = Tree::open(ctx).await?;
        let next = tree.fs.rm(&tree.version, &self.path).await?;
        tree.advance(&next)
    }
}
