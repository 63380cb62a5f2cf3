use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "circ")]
#[command(about = "Monetary circuit of capital simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> overlays)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Load and validate a scenario, print its entity counts
    Validate {
        /// Layered config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        /// Treat keys the scenario does not read as an error.
        #[arg(long, default_value_t = false)]
        fail_on_unused_keys: bool,
    },

    /// Simulate a scenario for a number of periods
    Run {
        /// Layered config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        /// Periods to run
        #[arg(long, default_value_t = 1)]
        periods: u32,

        /// Write manifest + per-period CSVs under <exports>/<run_id>/
        #[arg(long)]
        exports: Option<String>,

        /// Treat keys the scenario does not read as an error.
        #[arg(long, default_value_t = false)]
        fail_on_unused_keys: bool,
    },
}

fn init_tracing() {
    // stdout carries the key=value results; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.cmd {
        Commands::ConfigHash { paths } => {
            let refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = circ_config::load_layered_yaml(&refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::Validate {
            config_paths,
            fail_on_unused_keys,
        } => commands::validate::validate(&config_paths, fail_on_unused_keys)?,

        Commands::Run {
            config_paths,
            periods,
            exports,
            fail_on_unused_keys,
        } => commands::run::run(commands::run::RunArgs {
            config_paths: &config_paths,
            periods,
            exports: exports.as_deref(),
            fail_on_unused_keys,
        })?,
    }

    Ok(())
}
