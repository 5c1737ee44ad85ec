use anyhow::Result;
use clap::Parser;
use fintrack::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.init_tracing();

    match cli.command {
        Commands::Serve(args) => fintrack::cli::serve::cmd_serve(args).await,
    }
}
