// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # psys-ctl
//!
//! Command-line interface for the PSYS process-group runtime.
//!
//! ## Usage
//! ```bash
//! # Run a simulated pipeline for 10 frames
//! psys-ctl run --manifest pipeline.json --frames 10
//!
//! # Inspect a manifest: programs, terminals, computed sizes
//! psys-ctl inspect --manifest pipeline.json
//!
//! # Validate a runtime configuration
//! psys-ctl validate --config psys.toml
//! ```

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "psys-ctl",
    about = "Process-group execution runtime for IPU-style pipelines",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a pipeline manifest against the cell simulator.
    Run {
        /// Path to the pipeline manifest (JSON).
        #[arg(short, long)]
        manifest: std::path::PathBuf,

        /// Path to a TOML runtime configuration file.
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,

        /// Number of frames to execute.
        #[arg(short, long, default_value_t = 1)]
        frames: u32,

        /// Fragments per frame (overrides the config default).
        #[arg(long)]
        fragments: Option<u16>,
    },

    /// Inspect a manifest: print programs, terminals, and sizes.
    Inspect {
        /// Path to the pipeline manifest (JSON).
        #[arg(short, long)]
        manifest: std::path::PathBuf,
    },

    /// Validate a runtime configuration file.
    Validate {
        /// Path to a TOML runtime configuration file.
        #[arg(short, long)]
        config: std::path::PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            manifest,
            config,
            frames,
            fragments,
        } => commands::run::execute(manifest, config, frames, fragments).await,
        Commands::Inspect { manifest } => commands::inspect::execute(manifest).await,
        Commands::Validate { config } => commands::validate::execute(config).await,
    }
}
