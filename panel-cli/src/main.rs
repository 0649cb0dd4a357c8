mod commands;
mod config;
mod output;

use crate::commands::{execute, PromptCommands};
use crate::config::get_storage;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use panel_core::store::PromptStore;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version,
display_name = "panel",
bin_name = "panel",
about="A personal prompt panel",
long_about="Keep, tag, search, reorder, export and import your prompts", )]
struct Args {
    #[arg(short = 'p', long)]
    storage_path: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    #[command(flatten)]
    Prompts(PromptCommands),
    /// Print shell completions
    Completions {
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.cmd {
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Args::command(), "panel", &mut std::io::stdout());
        }
        Commands::Prompts(cmd) => {
            let mut store = PromptStore::new(get_storage(args.storage_path));
            let mut input = std::io::stdin().lock();
            let mut out = std::io::stdout().lock();
            execute(cmd, &mut store, &mut input, &mut out).await?;
        }
    }

    Ok(())
}
