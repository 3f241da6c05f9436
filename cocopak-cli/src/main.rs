//! cocopak CLI - DEFLATE packer for game assets
//!
//! Produces raw RFC 1951 streams with the built-in encoder or through an
//! external gzip, and unpacks raw streams or `.gz` files.

mod commands;
mod utils;

use clap::{Parser, Subcommand};
use commands::{cmd_gzip, cmd_info, cmd_unzip, cmd_zip};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cocopak")]
#[command(author, version, about = "DEFLATE packer for game assets")]
#[command(long_about = "
cocopak compresses asset files into raw DEFLATE (RFC 1951) streams.

Examples:
  cocopak zip level1.map level1.map.deflate
  cocopak gzip atlas.png atlas.png.deflate
  cocopak unzip level1.map.deflate level1.map
  cocopak unzip atlas.png.gz atlas.png
  cocopak info level1.map.deflate --json
")]
struct Cli {
    /// Log debug statistics to stderr (RUST_LOG also applies)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file with the built-in encoder
    #[command(alias = "z")]
    Zip {
        /// File to compress
        input: PathBuf,

        /// Raw DEFLATE output file
        output: PathBuf,
    },

    /// Compress a file through an external gzip and strip the container
    #[command(alias = "g")]
    Gzip {
        /// File to compress
        input: PathBuf,

        /// Raw DEFLATE output file
        output: PathBuf,

        /// gzip-compatible program to run (invoked as `<program> -9 -c`)
        #[arg(long, default_value = "gzip")]
        gzip_program: String,
    },

    /// Decompress a raw DEFLATE stream or a .gz file
    #[command(alias = "u")]
    Unzip {
        /// Compressed file (.gz files have their container checked)
        input: PathBuf,

        /// Decompressed output file
        output: PathBuf,
    },

    /// Show the blocks of a raw DEFLATE stream or a .gz file
    #[command(alias = "i")]
    Info {
        /// Compressed file
        input: PathBuf,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if cli.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    let result = match cli.command {
        Commands::Zip { input, output } => cmd_zip(&input, &output),
        Commands::Gzip {
            input,
            output,
            gzip_program,
        } => cmd_gzip(&input, &output, &gzip_program),
        Commands::Unzip { input, output } => cmd_unzip(&input, &output),
        Commands::Info { input, json } => cmd_info(&input, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
