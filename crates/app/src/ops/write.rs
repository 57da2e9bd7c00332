use std::path::PathBuf;

use clap::Args;

use crate::tree::{Tree, TreeError};

/// Write a local file into the tree, creating missing parents
#[derive(Args, Debug, Clone)]
pub struct Write {
    /// Destination path in the tree
    pub path: String,

    /// Local file to read
    pub source: PathBuf,

    /// Read the source one chunk at a time
    #[arg(long)]
    pub stream: bool,
}

#[async_trait::async_trait]
impl crate::op::Op for Write {
    type Error = TreeError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let tree = Tree::open(ctx).await?;
        let next = if self.stream {
            tree.fs
                .write_file_stream_from_path(&tree.version, &self.path, &self.source)
                .await?
        } else {
            tree.fs
                .write_file_from_path(&tree.version, &self.path, &self.source)
                .await?
        };
        tree.advance(&next)
    }
}
