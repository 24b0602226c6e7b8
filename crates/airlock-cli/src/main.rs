mod script;
mod simulator;
mod world;

use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use simulator::Simulator;
use world::SimulatorConfig;

#[derive(Parser)]
#[command(
    name = "airlock",
    about = "Run the airlock automation against a simulated structure",
    version
)]
struct Cli {
    /// Log per-tick detail
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a simulator script
    Run {
        /// Simulator config (JSON); defaults match a freshly built airlock
        #[arg(long, env = "AIRLOCK_CONFIG")]
        config: Option<PathBuf>,

        /// Script file (default: stdin)
        #[arg(long)]
        script: Option<PathBuf>,
    },

    /// Print the default simulator config
    DefaultConfig,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let result = match cli.command {
        Commands::Run { config, script } => run(config, script),
        Commands::DefaultConfig => default_config(),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(config: Option<PathBuf>, script: Option<PathBuf>) -> Result<()> {
    let config = match config {
        Some(path) => SimulatorConfig::load(&path)?,
        None => SimulatorConfig::default(),
    };

    let text = match script {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("reading script from stdin")?;
            text
        }
    };
    let lines = script::parse_script(&text)?;

    let mut simulator = Simulator::new(config)?;
    let mut out = io::stdout().lock();
    simulator.run_script(&lines, &mut out)?;
    out.flush()?;
    tracing::info!("Script finished in {}", simulator.airlock().state());
    Ok(())
}

fn default_config() -> Result<()> {
    let json = serde_json::to_string_pretty(&SimulatorConfig::default())?;
    println!("{json}");
    Ok(())
}
