//! Main entry point for the skelanim CLI

mod cli;
mod commands;
mod utils;

use anyhow::Result;
use clap::CommandFactory;
use clap::Parser;
use clap_complete::{Generator, generate};
use std::io;

use crate::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logger; RUST_LOG still wins over the flags
    let default_filter = match (cli.verbose, cli.quiet) {
        (0, true) => "error",
        (0, false) => "warn",
        (1, _) => "info",
        (2, _) => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let options = commands::LoadOptions {
        max_bones: cli.max_bones,
    };

    // Execute command
    match cli.command {
        Commands::Info { file, detailed } => commands::info::execute(&file, detailed, &options),
        Commands::Tree {
            file,
            depth,
            no_color,
            all,
            compact,
        } => commands::tree::execute(&file, depth, no_color, all, compact, &options),
        Commands::Pose(args) => commands::pose::execute(&args, &options),
        Commands::Completions { shell } => {
            print_completions(shell, &mut Cli::command());
            Ok(())
        }
    }
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    generate(
        generator,
        cmd,
        cmd.get_name().to_string(),
        &mut io::stdout(),
    );
}
