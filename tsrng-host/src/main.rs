use clap::{Parser, Subcommand};
use std::error::Error;

mod commands;

use commands::*;

#[derive(Parser)]
#[command(name = "tsrng-host")]
#[command(about = "Time-sandwich randomness protocol: commit/beacon/finalize/verify CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Commit a round: bind a Merkle root over submitted entropy leaves.
    Commit {
        /// Opaque caller-supplied tag for this round.
        #[arg(short, long, default_value = "")]
        label: String,
        /// Path to a JSON file shaped like the logical CommitRequest
        /// (stream name -> base64 leaves). Overrides --demo.
        #[arg(long)]
        request: Option<String>,
        /// Self-seeded demo streams as `name=count` pairs, filled with
        /// OS-random leaves (ignored if --request is given).
        #[arg(long = "demo")]
        demo_streams: Vec<String>,
        /// Leaf size in bytes for --demo streams.
        #[arg(long, default_value_t = 64)]
        leaf_size: usize,
    },
    /// Mix in the post-commit seed and run the VDF delay.
    Beacon {
        round_id: String,
        /// Externally supplied seed string (hex, base64, or beacon JSON).
        seed: String,
        #[arg(long)]
        vdf_t: Option<u64>,
        #[arg(long)]
        modulus_bits: Option<u32>,
    },
    /// Select leaves, extract output bits, and seal the artifact.
    Finalize {
        round_id: String,
        #[arg(long)]
        output_bits: Option<u64>,
        /// JSON object of per-stream weights, e.g. {"a":0.25,"b":0.75}.
        #[arg(long)]
        quotas: Option<String>,
        /// Also render output_bits.txt alongside output.bin.
        #[arg(long)]
        export_bits: bool,
    },
    /// Show a round's current stage and manifest.
    Status { round_id: String },
    /// Re-verify a finalized round's artifact directory from scratch.
    Verify {
        /// Path to the round's artifact directory (its package layout).
        package_dir: String,
    },
    /// Draw deterministic distinct integers from a finalized round.
    RandomRange {
        round_id: String,
        start: i64,
        end: i64,
        count: usize,
        #[arg(long)]
        domain: Option<String>,
        #[arg(long)]
        context: Option<String>,
        #[arg(long)]
        salt_hex: Option<String>,
    },
    /// List rounds, or show one round's full transparency record.
    List {
        #[arg(long)]
        round: Option<String>,
    },
    /// Render a finalized round's output as an MSB-first bit string file.
    ExportBits { round_id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Commit {
            label,
            request,
            demo_streams,
            leaf_size,
        } => {
            tokio::task::spawn_blocking(move || handle_commit(label, request, demo_streams, leaf_size))
                .await??
        }
        Commands::Beacon {
            round_id,
            seed,
            vdf_t,
            modulus_bits,
        } => {
            tokio::task::spawn_blocking(move || handle_beacon(round_id, seed, vdf_t, modulus_bits))
                .await??
        }
        Commands::Finalize {
            round_id,
            output_bits,
            quotas,
            export_bits,
        } => {
            tokio::task::spawn_blocking(move || {
                handle_finalize(round_id, output_bits, quotas, export_bits)
            })
            .await??
        }
        Commands::Status { round_id } => handle_status(round_id)?,
        Commands::Verify { package_dir } => {
            tokio::task::spawn_blocking(move || handle_verify(package_dir)).await??
        }
        Commands::RandomRange {
            round_id,
            start,
            end,
            count,
            domain,
            context,
            salt_hex,
        } => {
            tokio::task::spawn_blocking(move || {
                handle_random_range(round_id, start, end, count, domain, context, salt_hex)
            })
            .await??
        }
        Commands::List { round } => handle_list(round)?,
        Commands::ExportBits { round_id } => handle_export_bits(round_id)?,
    }

    Ok(())
}
