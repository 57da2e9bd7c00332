mod args;
mod logging;
mod op;
mod ops;
mod state;
mod tree;

use args::Args;
use clap::{Parser, Subcommand};
use op::Op;
use ops::{Cat, Cp, Forest, Head, History, Init, Load, Ls, Mkdir, Mv, New, Rm, Stats, Version, Write};

command_enum! {
    (Init, Init),
    (Forest, Forest),
    (New, New),
    (Load, Load),
    (Mkdir, Mkdir),
    (Write, Write),
    (Cat, Cat),
    (Ls, Ls),
    (Rm, Rm),
    (Mv, Mv),
    (Cp, Cp),
    (History, History),
    (Head, Head),
    (Stats, Stats),
    (Version, Version),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let log_level = state::AppState::load(args.config_path.clone())
        .map(|state| state.config.log_level)
        .unwrap_or_else(|_| "warn".to_string());
    let guard = logging::init_logging(&log_level);

    let ctx = op::OpContext::new(args.config_path, args.at);

    match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            tracing::debug!("command failed: {:?}", e);
            eprintln!("Error: {}", e);
            drop(guard);
            std::process::exit(1);
        }
    }
}
