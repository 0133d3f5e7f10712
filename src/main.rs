use clap::Parser;
use clinidoc::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Extract(args) => cli::extract::run(args).await,
    }
}
