use clap::Args;

use crate::tree::{Tree, TreeError};

/// Forest revisions behind the current Version, newest first
#[derive(Args, Debug, Clone)]
pub struct History;

#[async_trait::async_trait]
impl crate::op::Op for History {
    type Error = TreeError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let tree = Tree::open(ctx).await?;
        let cids = tree.fs.history(&tree.version).await?;
        let height = cids.len();
        Ok(cids
            .iter()
            .enumerate()
            .map(|(i, cid)| format!("{:>4}  {}", height - 1 - i, cid))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
