pub use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pforest")]
#[command(about = "Versioned private filesystems over a content-addressed block store")]
pub struct Args {
    /// Path to the pforest state directory (defaults to ~/.pforest)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// Operate on this Version token instead of HEAD
    #[arg(long, global = true)]
    pub at: Option<String>,

    #[command(subcommand)]
    pub command: crate::Command,
}
