use clap::Args;

use common::protocol::{encode_listing, format_timestamp};

use crate::tree::{Tree, TreeError};

/// List a directory
#[derive(Args, Debug, Clone)]
pub struct Ls {
    #[arg(default_value = "/")]
    pub path: String,

    /// Print the delimited listing encoding handed to embedders
    #[arg(long)]
    pub raw: bool,
}

#[async_trait::async_trait]
impl crate::op::Op for Ls {
    type Error = TreeError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let tree = Tree::open(ctx).await?;
        let entries = tree.fs.ls(&tree.version, &self.path).await?;

        if self.raw {
            let bytes = encode_listing(&entries)?;
            return Ok(String::from_utf8_lossy(&bytes).into_owned());
        }

        let output = entries
            .iter()
            .map(|entry| {
                format!(
                    "{:<4} {:>10}  {}  {}",
                    entry.kind,
                    entry.size,
                    format_timestamp(entry.modified),
                    entry.name
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        Ok(output)
    }
}
