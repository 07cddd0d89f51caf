use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "umg",
    about = "Build a property graph from a UMLS release",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load a UMLS release directory into a staging database
    Load {
        /// Directory containing the release files (META)
        #[arg(long)]
        meta: PathBuf,
        /// Staging database to create (replaced if it exists)
        #[arg(long)]
        db: PathBuf,
    },
    /// Extract node/edge CSV files from a staging database
    Export {
        /// Staging database created by `load`
        #[arg(long)]
        db: PathBuf,
        /// Output directory for the CSV files
        #[arg(long)]
        out: PathBuf,
        /// Extraction scope as a JSON file (defaults used if omitted)
        #[arg(long)]
        scope: Option<PathBuf>,
    },
    /// Load a release and extract the graph in one run
    Run {
        /// Directory containing the release files (META)
        #[arg(long)]
        meta: PathBuf,
        /// Staging database to create (replaced if it exists)
        #[arg(long)]
        db: PathBuf,
        /// Output directory for the CSV files
        #[arg(long)]
        out: PathBuf,
        /// Extraction scope as a JSON file (defaults used if omitted)
        #[arg(long)]
        scope: Option<PathBuf>,
    },
}
