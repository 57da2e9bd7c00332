use clap::Args;

use common::prelude::EntryKind;

use crate::tree::{Tree, TreeError};

/// Summarize the tree at the current Version
#[derive(Args, Debug, Clone)]
pub struct Stats;

#[async_trait::async_trait]
impl crate::op::Op for Stats {
    type Error = TreeError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let tree = Tree::open(ctx).await?;

        let (mut files, mut dirs, mut bytes) = (0u64, 0u64, 0u64);
        let mut pending = vec![String::from("/")];
        while let Some(dir) = pending.pop() {
            for entry in tree.fs.ls(&tree.version, &dir).await? {
                match entry.kind {
                    EntryKind::File => {
                        files += 1;
                        bytes += entry.size;
                    }
                    EntryKind::Directory => {
                        dirs += 1;
                        pending.push(format!("{}/{}", dir.trim_end_matches('/'), entry.name));
                    }
                }
            }
        }
        let revisions = tree.fs.history(&tree.version).await?.len();

        Ok(format!(
            "files: {}\ndirectories: {}\nbytes: {}\nrevisions: {}\nstore: {}",
            files,
            dirs,
            bytes,
            revisions,
            tree.fs.stats()
        ))
    }
}
