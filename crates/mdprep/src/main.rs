//! mdprep CLI - Markdown preprocessor and typesetting templates.
//!
//! Provides commands for:
//! - `convert`: Preprocess extended markdown into normalized markdown
//! - `template list|validate|analyze|health|render`: Manage typesetting templates

mod commands;
mod error;
mod options;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ConvertArgs, TemplateArgs};
use output::Output;

/// mdprep - Markdown preprocessor.
#[derive(Parser)]
#[command(name = "mdprep", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Preprocess markdown files.
    Convert(ConvertArgs),
    /// Typesetting template commands.
    Template(TemplateArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = match &cli.command {
        Commands::Convert(args) => args.verbose,
        Commands::Template(args) => args.verbose,
    };

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Convert(args) => args.execute(),
        Commands::Template(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
