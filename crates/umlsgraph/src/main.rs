use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Load { meta, db } => commands::load(&meta, &db).await,
        Commands::Export { db, out, scope } => {
            commands::export(&db, &out, scope.as_deref()).await
        }
        Commands::Run { meta, db, out, scope } => {
            commands::run(&meta, &db, &out, scope.as_deref()).await
        }
    }
}
