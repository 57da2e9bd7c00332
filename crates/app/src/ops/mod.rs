pub mod cat;
pub mod cp;
pub mod forest;
pub mod head;
pub mod history;
pub mod init;
pub mod load;
pub mod ls;
pub mod mkdir;
pub mod mv;
pub mod new;
pub mod rm;
pub mod stats;
pub mod version;
pub mod write;

pub use cat::Cat;
pub use cp::Cp;
pub use forest::Forest;
pub use head::Head;
pub use history::History;
pub use init::Init;
pub use load::Load;
pub use ls::Ls;
pub use mkdir::Mkdir;
pub use mv::Mv;
pub use new::New;
pub use rm::Rm;
pub use stats::Stats;
pub use version::Version;
pub use write::Write;

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::op::{Op, OpContext};
    use crate::state::{Backend, Policy};

    async fn setup(backend: Backend, policy: Policy) -> (OpContext, TempDir) {
        let temp = TempDir::new().unwrap();
        let ctx = OpContext::new(Some(temp.path().join("state")), None);
        Init {
            backend,
            policy,
            chunk_size: Some(16),
        }
        .execute(&ctx)
        .await
        .unwrap();
        New {
            key: Some(hex::encode([0u8; 32])),
            forest: None,
        }
        .execute(&ctx)
        .await
        .unwrap();
        (ctx, temp)
    }

    fn cat(path: &str) -> Cat {
        Cat {
            path: path.to_string(),
            out: None,
            stream: false,
        }
    }

    #[tokio::test]
    async fn test_tree_commands() {
        let (ctx, temp) = setup(Backend::Files, Policy::Direct).await;
        let source = temp.path().join("note.txt");
        std::fs::write(&source, "hello from disk, spanning chunks").unwrap();

        Mkdir {
            path: "/docs".into(),
        }
        .execute(&ctx)
        .await
        .unwrap();
        Write {
            path: "/docs/note.txt".into(),
            source: source.clone(),
            stream: true,
        }
        .execute(&ctx)
        .await
        .unwrap();

        let text = cat("/docs/note.txt").execute(&ctx).await.unwrap();
        assert_eq!(text, "hello from disk, spanning chunks");

        let listing = Ls {
            path: "/docs".into(),
            raw: false,
        }
        .execute(&ctx)
        .await
        .unwrap();
        assert!(listing.contains("note.txt"));

        Cp {
            from: "/docs/note.txt".into(),
            to: "/copy.txt".into(),
        }
        .execute(&ctx)
        .await
        .unwrap();
        Mv {
            from: "/copy.txt".into(),
            to: "/moved.txt".into(),
        }
        .execute(&ctx)
        .await
        .unwrap();
        Rm {
            path: "/docs".into(),
        }
        .execute(&ctx)
        .await
        .unwrap();

        let listing = Ls {
            path: "/".into(),
            raw: true,
        }
        .execute(&ctx)
        .await
        .unwrap();
        assert!(listing.starts_with("moved.txt???"));

        let history = History.execute(&ctx).await.unwrap();
        // genesis, the new root, then five mutations
        assert_eq!(history.lines().count(), 7);
    }

    #[tokio::test]
    async fn test_at_reads_an_older_version() {
        let (ctx, _temp) = setup(Backend::Files, Policy::Locked).await;
        let before = Head.execute(&ctx).await.unwrap();
        Mkdir {
            path: "/later".into(),
        }
        .execute(&ctx)
        .await
        .unwrap();

        let old = OpContext::new(ctx.config_path.clone(), Some(before));
        let listing = Ls {
            path: "/".into(),
            raw: false,
        }
        .execute(&old)
        .await
        .unwrap();
        assert!(listing.is_empty());

        let listing = Ls {
            path: "/".into(),
            raw: false,
        }
        .execute(&ctx)
        .await
        .unwrap();
        assert!(listing.contains("later"));
    }

    #[tokio::test]
    async fn test_load_reopens_tree() {
        let (ctx, temp) = setup(Backend::Files, Policy::Queued).await;
        let source = temp.path().join("f");
        std::fs::write(&source, "kept").unwrap();
        Write {
            path: "/f".into(),
            source,
            stream: false,
        }
        .execute(&ctx)
        .await
        .unwrap();
        let head = Head.execute(&ctx).await.unwrap();
        let cid = head.split_once('.').unwrap().0.to_string();

        let loaded = Load {
            key: hex::encode([0u8; 32]),
            cid: cid.clone(),
        }
        .execute(&ctx)
        .await
        .unwrap();
        assert_eq!(loaded, head);

        let denied = Load {
            key: hex::encode([1u8; 32]),
            cid,
        }
        .execute(&ctx)
        .await;
        assert!(denied.is_err());
    }

    #[tokio::test]
    async fn test_missing_head() {
        let temp = TempDir::new().unwrap();
        let ctx = OpContext::new(Some(temp.path().to_path_buf()), None);
        Init {
            backend: Backend::Files,
            policy: Policy::Direct,
            chunk_size: None,
        }
        .execute(&ctx)
        .await
        .unwrap();
        let err = cat("/x").execute(&ctx).await.unwrap_err();
        assert!(matches!(err, crate::tree::TreeError::NoHead));
    }
}
