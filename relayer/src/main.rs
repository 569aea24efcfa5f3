mod config;
mod digest;
mod run;

use clap::Parser;
use std::process;

use crate::config::{Cli, Command};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Some(Command::Digest(args)) => digest::print(&args),
        None => run::run(cli.serve).await,
    };
    if let Err(e) = result {
        eprintln!("{e}");
        process::exit(1)
    }
}
