use std::path::PathBuf;

use clap::Args;

use crate::tree::{Tree, TreeError};

/// Print a file, or save it with --out
#[derive(Args, Debug, Clone)]
pub struct Cat {
    pub path: String,

    /// Write the file here instead of printing it
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Write one chunk at a time (with --out)
    #[arg(long)]
    pub stream: bool,
}

#[async_trait::async_trait]
impl crate::op::Op for Cat {
    type Error = TreeError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let tree = Tree::open(ctx).await?;
        let Some(out) = &self.out else {
            let data = tree.fs.read_file(&tree.version, &self.path).await?;
            return Ok(String::from_utf8_lossy(&data).into_owned());
        };

        let written = if self.stream {
            tree.fs
                .read_file_stream_to_path(&tree.version, &self.path, out)
                .await?
        } else {
            tree.fs
                .read_file_to_path(&tree.version, &self.path, out)
                .await?
        };
        Ok(format!("wrote {} bytes to {}", written, out.display()))
    }
}
