// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Program manifests: one accelerator stage within a program group.

/// One program entry in a [`crate::ProgramGroupManifest`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ProgramManifest {
    /// Unique program id within the group.
    pub id: u8,
    /// Preferred compute cell for this program, if the topology pins one.
    #[serde(default)]
    pub preferred_cell: Option<u8>,
    /// Ids of programs this program depends on (must complete first).
    #[serde(default)]
    pub program_dependencies: Vec<u8>,
    /// Ids of terminals this program reads or writes.
    #[serde(default)]
    pub terminal_dependencies: Vec<u8>,
}

impl ProgramManifest {
    /// Number of program dependencies.
    pub fn program_dependency_count(&self) -> usize {
        self.program_dependencies.len()
    }

    /// Number of terminal dependencies.
    pub fn terminal_dependency_count(&self) -> usize {
        self.terminal_dependencies.len()
    }
}
