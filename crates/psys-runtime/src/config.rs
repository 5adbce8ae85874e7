// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runtime configuration loaded from TOML files or constructed
//! programmatically.
//!
//! # TOML Format
//! ```toml
//! num_ppg_queues = 4
//! queue_depth = 32
//! num_cells = 4
//! default_fragment_count = 1
//! ```

use crate::PsysError;
use psys_transport::TransportConfig;
use resource_model::N_CELL_ID;
use std::path::Path;

/// Configuration for the process-group runtime.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PsysConfig {
    /// Number of dedicated persistent-process-group command queues.
    #[serde(default = "default_ppg_queues")]
    pub num_ppg_queues: u8,
    /// Depth of every command queue and the event queue.
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,
    /// Number of compute cells available to bind.
    #[serde(default = "default_cells")]
    pub num_cells: u8,
    /// Fragment count used when a caller does not override it.
    #[serde(default = "default_fragment_count")]
    pub default_fragment_count: u16,
}

fn default_ppg_queues() -> u8 {
    4
}

fn default_queue_depth() -> usize {
    32
}

fn default_cells() -> u8 {
    4
}

fn default_fragment_count() -> u16 {
    1
}

impl Default for PsysConfig {
    fn default() -> Self {
        Self {
            num_ppg_queues: default_ppg_queues(),
            queue_depth: default_queue_depth(),
            num_cells: default_cells(),
            default_fragment_count: default_fragment_count(),
        }
    }
}

impl PsysConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, PsysError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, PsysError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates bounds on every field.
    pub fn validate(&self) -> Result<(), PsysError> {
        if self.queue_depth == 0 {
            return Err(PsysError::InvalidConfig(
                "queue_depth must be at least 1".into(),
            ));
        }
        if self.num_cells == 0 {
            return Err(PsysError::InvalidConfig(
                "num_cells must be at least 1".into(),
            ));
        }
        if self.num_cells > N_CELL_ID {
            return Err(PsysError::InvalidConfig(format!(
                "num_cells {} exceeds the cell id space ({})",
                self.num_cells, N_CELL_ID,
            )));
        }
        if self.default_fragment_count == 0 {
            return Err(PsysError::InvalidConfig(
                "default_fragment_count must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The transport queue-set shape this configuration describes.
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            num_ppg_queues: self.num_ppg_queues,
            depth: self.queue_depth,
        }
    }
}
