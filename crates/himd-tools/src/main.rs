use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod tif;
use tif::{fragments, info, read_tif_as_vec, string, tracks};

/// himd command line tools
#[derive(Parser)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log decoder diagnostics (repeat for more detail; RUST_LOG overrides)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Fragments a chain walk may visit before it is reported as looping
    #[arg(
        long = "max-fragment-steps",
        global = true,
        default_value_t = himd::tif::DEFAULT_FRAGMENT_STEP_LIMIT
    )]
    max_fragment_steps: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Show summary info for a track index image (accepts raw or gzipped; use '-' for stdin)
    Info {
        /// Input file to read (use '-' for stdin)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// List every track slot with its metadata
    Tracks {
        /// Input file to read (use '-' for stdin)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Decode one string record
    #[command(name = "string")]
    Text {
        /// Input file to read (use '-' for stdin)
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// String chunk index of the head (1-4095)
        #[arg(value_name = "INDEX")]
        index: u16,
        /// Dump the raw chain bytes instead of decoding them
        #[arg(long)]
        raw: bool,
    },
    /// Show the fragment chain of one track record
    Fragments {
        /// Input file to read (use '-' for stdin)
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Track record index (1-2345)
        #[arg(value_name = "TRACK")]
        track: u16,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "himd=debug,warn",
        _ => "himd=trace,debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let limit = cli.max_fragment_steps;

    match cli.command {
        Commands::Info { file } => {
            let bytes = read_tif_as_vec(&file)?;
            info(&file, bytes, limit)?;
        }
        Commands::Tracks { file } => {
            let bytes = read_tif_as_vec(&file)?;
            tracks(&file, bytes, limit)?;
        }
        Commands::Text { file, index, raw } => {
            let bytes = read_tif_as_vec(&file)?;
            string(&file, bytes, index, raw)?;
        }
        Commands::Fragments { file, track } => {
            let bytes = read_tif_as_vec(&file)?;
            fragments(&file, bytes, track, limit)?;
        }
    }

    Ok(())
}
