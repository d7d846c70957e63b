//! Command-line interface for connect-document
//!
//! # Usage Examples
//!
//! ```bash
//! # Schema-carrying records to JSON documents
//! connect-document convert --mode record --input records.jsonl --output docs.jsonl
//!
//! # JSON trees from stdin to extended JSON, stopping at the first bad line
//! connect-document convert --mode json --format extjson --fail-fast < events.jsonl
//!
//! # Mode and format from the environment
//! CONNECT_DOCUMENT_MODE=dynamic connect-document convert --input maps.jsonl
//! ```
//!
//! Set `RUST_LOG=debug` to see per-line progress; logs go to stderr.

use clap::{Parser, Subcommand};
use connect_document::{open_input, open_output, run_convert, ConvertOpts};

#[derive(Parser)]
#[command(name = "connect-document")]
#[command(about = "Convert connector records, JSON trees and dynamic maps into documents")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert JSON Lines input into one document per line
    Convert {
        #[command(flatten)]
        opts: ConvertOpts,
    },
}

fn main() -> anyhow::Result<()> {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert { opts } => {
            let reader = open_input(opts.input.as_deref())?;
            let writer = open_output(opts.output.as_deref())?;
            let summary = run_convert(&opts, reader, writer)?;
            if summary.failed > 0 {
                tracing::warn!(
                    "{} of {} lines failed to convert",
                    summary.failed,
                    summary.converted + summary.failed
                );
            }
        }
    }

    Ok(())
}
