use clap::Args;

use crate::tree::{Tree, TreeError};

/// Create a directory and any missing parents
#[derive(Args, Debug, Clone)]
pub struct Mkdir {
    pub path: String,
}

#[async_trait::async_trait]
impl crate::op::Op for Mkdir {
    type Error = TreeError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let tree = Tree::open(ctx).await?;
        let next = tree.fs.mkdir(&tree.version, &self.path).await?;
        tree.advance(&next)
    }
}
