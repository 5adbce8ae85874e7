// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `psys-ctl validate` command: check a runtime configuration file.

use anyhow::Context;
use psys_runtime::PsysConfig;
use std::path::PathBuf;

pub async fn execute(config_path: PathBuf) -> anyhow::Result<()> {
    let config = PsysConfig::from_file(&config_path)
        .with_context(|| format!("failed to load config '{}'", config_path.display()))?;

    println!("  Config '{}' is valid:", config_path.display());
    println!("   Dedicated PPG queues:   {}", config.num_ppg_queues);
    println!("   Queue depth:            {}", config.queue_depth);
    println!("   Compute cells:          {}", config.num_cells);
    println!("   Default fragment count: {}", config.default_fragment_count);
    Ok(())
}
