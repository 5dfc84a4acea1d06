//! Fortuna CLI
//!
//! Command-line front end for the Fortuna CSPRNG. Every invocation loads
//! the seed file, runs one command, and rewrites the seed file on a clean
//! exit.

use clap::{Parser, Subcommand};
use fortuna_rng::{
    seed_file::SeedFileStore, Accumulator, ConfigError, FortunaConfig, FortunaError, PoolCursor,
    NUM_POOLS,
};
use rand_core::{OsRng, RngCore};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// Source identifier for operating-system randomness.
const SOURCE_OS: u8 = 0;
/// Source identifier for timing jitter.
const SOURCE_TIMESTAMP: u8 = 1;

#[derive(Debug, Parser)]
#[command(name = "fortuna", version, about = "Fortuna cryptographically secure PRNG")]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed file path (overrides the configuration).
    #[arg(short, long)]
    seed_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print random bytes as hex.
    Random {
        /// Number of bytes to generate.
        #[arg(default_value_t = 32)]
        bytes: usize,
    },
    /// Feed entropy events from the OS and timing jitter, then reseed.
    Gather {
        /// Events per source.
        #[arg(short, long, default_value_t = 64)]
        events: usize,
    },
    /// Print generator and pool state.
    Status,
}

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Fortuna(#[from] FortunaError),
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let config = match &cli.config {
        Some(path) => FortunaConfig::from_file(path)?,
        None => FortunaConfig::default(),
    };
    let seed_path = cli.seed_file.unwrap_or(config.seed_file.path);

    info!("Fortuna v{}", fortuna_rng::VERSION);

    let stream = SeedFileStore::open(&seed_path)
        .map_err(FortunaError::from)?
        .into_inner();
    let mut fortuna = Accumulator::new()
        .with_policy(config.reseed)
        .with_seed_file(stream)?;

    let result = match cli.command {
        Command::Random { bytes } => fortuna.random_data(bytes).map(|out| {
            println!("{}", hex::encode(out));
        }),
        Command::Gather { events } => {
            gather(&mut fortuna, events);
            Ok(())
        }
        Command::Status => {
            print_status(&fortuna);
            Ok(())
        }
    };

    if let Err(FortunaError::NotSeeded) = &result {
        warn!("Generator not seeded yet; run `fortuna gather` first");
    }

    match fortuna.write_seed_file() {
        Ok(()) => info!(path = %seed_path.display(), "Seed file written"),
        Err(FortunaError::NotSeeded) => info!("Not writing seed file since not seeded"),
        Err(e) => return Err(e.into()),
    }

    result.map_err(AppError::from)
}

fn gather(fortuna: &mut Accumulator, events: usize) {
    let mut os_cursor = PoolCursor::new();
    let mut timestamp_cursor = PoolCursor::new();
    let epoch = Instant::now();
    let mut buf = [0u8; 32];

    for _ in 0..events {
        OsRng.fill_bytes(&mut buf);
        if let Err(e) = fortuna.add_random_event(SOURCE_OS, os_cursor.next_pool(), &buf) {
            warn!("Dropped OS event: {}", e);
        }

        let nanos = epoch.elapsed().subsec_nanos().to_le_bytes();
        if let Err(e) =
            fortuna.add_random_event(SOURCE_TIMESTAMP, timestamp_cursor.next_pool(), &nanos)
        {
            warn!("Dropped timestamp event: {}", e);
        }
    }

    if fortuna.reseed_if_due() {
        info!(reseed_count = fortuna.reseed_count(), "Reseeded from gathered entropy");
    } else {
        warn!(
            pool0_bytes = fortuna.pool_len(0).unwrap_or(0),
            min_pool_size = fortuna.policy().min_pool_size,
            "Not enough entropy in pool 0 to reseed"
        );
    }
}

fn print_status(fortuna: &Accumulator) {
    println!("seeded:       {}", fortuna.is_seeded());
    println!("reseed count: {}", fortuna.reseed_count());
    println!("counter:      {}", fortuna.generator().counter());
    for pool in 0..NUM_POOLS {
        println!("pool {:>2}:      {} bytes", pool, fortuna.pool_len(pool).unwrap_or(0));
    }
}
