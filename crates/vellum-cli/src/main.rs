//! Main application entry point.

mod commands;

use clap::{Parser, Subcommand};
use commands::{ExportArgs, InfoArgs, NewArgs, RecognizeArgs};

/// Vellum - freehand notes on an infinite canvas or A4 pages
#[derive(Parser, Debug)]
#[command(name = "vellum")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize a document
    Info(InfoArgs),

    /// Export a document as SVG pages
    ExportSvg(ExportArgs),

    /// Run shape recognition over freehand strokes
    Recognize(RecognizeArgs),

    /// Create an empty document
    New(NewArgs),
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();
    log::debug!("Starting Vellum CLI");

    let result = match cli.command {
        Command::Info(args) => commands::info(args),
        Command::ExportSvg(args) => commands::export_svg(args),
        Command::Recognize(args) => commands::recognize(args),
        Command::New(args) => commands::new_document(args),
    };

    if let Err(err) = result {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
