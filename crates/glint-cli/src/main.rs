//! Glint CLI - Run the page effects headless and inspect what they do

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{config, page, simulate, splash};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "glint")]
#[command(about = "Headless driver for glitch-styled page effects", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the particle field and print draw statistics
    Simulate {
        /// Frames to simulate at 60 Hz
        #[arg(long, default_value = "600")]
        frames: usize,

        /// Viewport width in CSS pixels
        #[arg(long, default_value = "1280")]
        width: f32,

        /// Viewport height in CSS pixels
        #[arg(long, default_value = "800")]
        height: f32,

        /// Device pixel ratio
        #[arg(long, default_value = "1")]
        dpr: f32,

        /// Simulate with the reduced-motion preference set
        #[arg(long)]
        reduced_motion: bool,

        /// Random seed
        #[arg(long, default_value = "1")]
        seed: u32,

        /// Effect configuration file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Step the splash screen and print every phase change
    Splash {
        /// Page time at which the load event arrives
        #[arg(long, conflicts_with = "stall")]
        load_at: Option<f64>,

        /// Never load and disable the fallback, leaving only the safety timeout
        #[arg(long)]
        stall: bool,

        /// Run with the reduced-motion preference set
        #[arg(long)]
        reduced_motion: bool,

        /// Effect configuration file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Effect configuration file (TOML); defaults are printed without one
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Run every effect against a demo page with scripted input
    Page {
        /// Frames to run at 60 Hz
        #[arg(long, default_value = "600")]
        frames: usize,

        /// Logo clicks to deliver after the splash is gone
        #[arg(long, default_value = "0")]
        clicks: u32,

        /// Sections on the demo page
        #[arg(long, default_value = "4")]
        sections: usize,

        /// JSON file of `{ "at": secs, "type": ..., ... }` events to replay
        #[arg(long)]
        events: Option<PathBuf>,

        /// Run with the reduced-motion preference set
        #[arg(long)]
        reduced_motion: bool,

        /// Random seed
        #[arg(long, default_value = "1")]
        seed: u32,

        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = parse_format)]
        format: String,

        /// Effect configuration file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn parse_format(s: &str) -> Result<String, String> {
    match s {
        "text" | "json" => Ok(s.to_string()),
        _ => Err(format!("unknown format '{}'; valid values: text, json", s)),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "glint=debug" } else { "glint=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Simulate {
            frames,
            width,
            height,
            dpr,
            reduced_motion,
            seed,
            config,
        } => simulate::run(simulate::SimulateArgs {
            frames,
            width,
            height,
            dpr,
            reduced_motion,
            seed,
            config,
        }),
        Commands::Splash {
            load_at,
            stall,
            reduced_motion,
            config,
        } => splash::run(splash::SplashArgs {
            load_at,
            stall,
            reduced_motion,
            config,
        }),
        Commands::Config { config } => config::run(config.as_deref()),
        Commands::Page {
            frames,
            clicks,
            sections,
            events,
            reduced_motion,
            seed,
            format,
            config,
        } => page::run(page::PageArgs {
            frames,
            clicks,
            sections,
            events,
            reduced_motion,
            seed,
            format,
            config,
        }),
    }
}
