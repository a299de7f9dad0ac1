// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Marquee - scheduling daemon for an LED marquee sign.
//!
//! This is the binary entry point.

mod check;
mod serve;

use clap::{Parser, Subcommand};
use marquee_config::MarqueeConfig;

/// Marquee - scheduling daemon for an LED marquee sign.
#[derive(Parser, Debug)]
#[command(name = "marquee", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Drive the sign and accept messages over HTTP (default).
    Serve,
    /// Print the effective configuration as TOML.
    Config,
    /// Inspect the persisted rotation and ad templates without serving.
    Check {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match marquee_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            marquee_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            init_tracing(&config.sign.log_level);
            serve::run_serve(config).await
        }
        Commands::Config => print_config(&config),
        Commands::Check { json } => check::run_check(&config, json),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn print_config(config: &MarqueeConfig) -> Result<(), marquee_core::MarqueeError> {
    let text = toml::to_string_pretty(config)
        .map_err(|e| marquee_core::MarqueeError::Config(e.to_string()))?;
    print!("{text}");
    Ok(())
}

/// Crates whose logs follow the configured level; everything else is `warn`.
const LOG_TARGETS: &[&str] = &[
    "marquee",
    "marquee_config",
    "marquee_engine",
    "marquee_gateway",
    "marquee_serial",
    "marquee_storage",
    "tower_http",
];

fn default_filter(log_level: &str) -> String {
    let mut directives: Vec<String> = LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={log_level}"))
        .collect();
    directives.push("warn".to_string());
    directives.join(",")
}

/// Initialize the tracing subscriber. `RUST_LOG` overrides the config level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .init();
}
