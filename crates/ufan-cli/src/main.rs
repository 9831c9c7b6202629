//! `ufan` entry point.

use clap::Parser;

use ufan_cli::{Cli, exit_code_for, run};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{e}");
        std::process::exit(exit_code_for(&e));
    }
}
