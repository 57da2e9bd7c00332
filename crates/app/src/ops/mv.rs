use clap::Args;

use crate::tree::{Tree, TreeError};

/// Move an entry; the target must not exist
#[derive(Args, Debug, Clone)]
pub struct Mv {
    pub from: String,
    pub to: String,
}

#[async_trait::async_trait]
impl crate::op::Op for Mv {
    type Error = TreeError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let tree = Tree::open(ctx).await?;
        let next = tree.fs.mv(&tree.version, &self.from, &self.to).await?;
        tree.advance(&next)
    }
}
