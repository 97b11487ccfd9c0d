//! TILES command line runner.
//!
//! Reads a tab-separated edge stream, maintains evolving communities and
//! writes one set of snapshot files per observation window.
//!
//! ## Configuration
//!
//! Every flag has an environment fallback:
//! - `TILES_OBS`: observation window in days (default: 7)
//! - `TILES_TTL`: edge time-to-live in days (default: infinite)
//! - `TILES_PATH`: output directory (default: current directory)
//! - `TILES_MODE`: `ttl` or `explicit` (default: ttl)
//! - `RUST_LOG`: log level filter (default: info)
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" for humans (default: pretty)
//!
//! ## Usage
//!
//! ```bash
//! tiles edges.tsv --obs 7 --ttl 30 --path out/
//! tiles actions.tsv --mode explicit --path out/
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tiles_kernel::{
    strategy_for, EdgeEventReader, FileSnapshotSink, KernelConfig, KernelError, RemovalMode,
    StreamProcessor,
};

/// Evolving community discovery over an edge stream.
#[derive(Debug, Parser)]
#[command(name = "tiles", version, about)]
struct Cli {
    /// Input edge stream.
    filename: PathBuf,

    /// Observation window in days.
    #[arg(short, long, env = "TILES_OBS", default_value_t = tiles_kernel::DEFAULT_OBS_DAYS)]
    obs: u32,

    /// Edge time-to-live in days (infinite when omitted).
    #[arg(short, long, env = "TILES_TTL")]
    ttl: Option<u32>,

    /// Output directory.
    #[arg(short, long, env = "TILES_PATH", default_value = ".")]
    path: PathBuf,

    /// Removal mode: "ttl" or "explicit".
    #[arg(short, long, env = "TILES_MODE", default_value = "ttl")]
    mode: RemovalMode,
}

impl Cli {
    fn into_config(self) -> (PathBuf, KernelConfig) {
        let mut config = KernelConfig::default()
            .with_obs(self.obs)
            .with_output_dir(self.path)
            .with_mode(self.mode);
        config.ttl_days = self.ttl;
        (self.filename, config)
    }
}

/// Initialize the tracing subscriber with JSON or pretty format
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tiles=info,tiles_kernel=info".into());

    if log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).flatten_event(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false))
            .init();
    }
}

fn run(input: PathBuf, config: KernelConfig) -> Result<(), KernelError> {
    let file = File::open(&input).map_err(|source| KernelError::OpenInput {
        path: input.clone(),
        source,
    })?;
    let events = EdgeEventReader::new(BufReader::new(file), config.mode);

    let sink = FileSnapshotSink::create(&config)?;
    let strategy = strategy_for(&config);
    let processor = StreamProcessor::new(config, strategy, sink)?;

    let (summary, sink) = processor.run(events)?;
    info!(
        events = summary.events,
        self_loops = summary.self_loops,
        slices = summary.slices,
        communities = summary.communities,
        edges = summary.edges,
        nodes = summary.nodes,
        output = %sink.dir().display(),
        "done"
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let (input, config) = Cli::parse().into_config();
    info!(
        version = env!("CARGO_PKG_VERSION"),
        input = %input.display(),
        "Starting TILES"
    );

    if let Err(e) = run(input, config) {
        error!(error = %e, "run aborted");
        return Err(e.into());
    }
    Ok(())
}
