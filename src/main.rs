use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use grin::config::GrinConfig;
use grin::Compressor;

/// Huffman file compressor using the grin format.
#[derive(Parser, Debug)]
#[command(name = "grin", version, about, long_about = None)]
struct Cli {
    /// JSON configuration file.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log more (-v info, -vv debug). Overrides RUST_LOG.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress INFILE into the grin file OUTFILE.
    Encode { infile: PathBuf, outfile: PathBuf },
    /// Decompress the grin file INFILE into OUTFILE.
    Decode { infile: PathBuf, outfile: PathBuf },
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => GrinConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => GrinConfig::default(),
    };
    let compressor = Compressor::new(config);

    match cli.command {
        Command::Encode { infile, outfile } => {
            compressor
                .encode_file(&infile, &outfile)
                .with_context(|| format!("failed to encode {}", infile.display()))?;
        }
        Command::Decode { infile, outfile } => {
            compressor
                .decode_file(&infile, &outfile)
                .with_context(|| format!("failed to decode {}", infile.display()))?;
        }
    }

    Ok(())
}
