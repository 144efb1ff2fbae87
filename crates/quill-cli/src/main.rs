//! Quill CLI - README generation from the command line
//!
//! Scans a project tree into a bounded digest and asks Gemini to
//! write a README for it.

use clap::Parser;
use colored::Colorize;
use quill_gen::Language;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "quill")]
#[command(version)]
#[command(about = "Generate a README from your project tree", long_about = None)]
struct Cli {
    /// Path to the project to analyze (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Output README filename; a bare file name is written into the
    /// target directory
    #[arg(short, long, default_value = "README.md")]
    output: PathBuf,

    /// Maximum number of files to process
    #[arg(long)]
    max_files: Option<usize>,

    /// Additional files or directories to ignore (e.g., -i temp.txt -i logs/)
    #[arg(short = 'i', long = "ignore", value_name = "PATTERN")]
    ignore: Vec<String>,

    /// Output language: en, ar, or fr
    #[arg(long, default_value = "en")]
    lang: Language,

    /// Follow symbolic links while scanning
    #[arg(long)]
    follow_symlinks: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let result = commands::generate(
        &cli.path,
        &cli.output,
        cli.ignore,
        cli.max_files,
        cli.lang,
        cli.follow_symlinks,
    )
    .await;

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
