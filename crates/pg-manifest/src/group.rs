// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The program group manifest: the immutable topology descriptor.
//!
//! # Format
//! ```json
//! {
//!   "id": 17,
//!   "name": "isa_to_psa_still",
//!   "programs": [
//!     { "id": 0, "preferred_cell": 2, "terminal_dependencies": [0, 1] }
//!   ],
//!   "terminals": [
//!     {
//!       "id": 0,
//!       "terminal_type": "data_in",
//!       "attributes": {
//!         "category": "load", "direction": "in",
//!         "rate": "per_frame", "buffer_type": "image"
//!       },
//!       "frame_format": { "width": 1920, "height": 1080, "bits_per_element": 10 }
//!     },
//!     ...
//!   ]
//! }
//! ```

use crate::{ManifestError, ProgramManifest, TerminalManifest, TerminalType};
use std::path::Path;

// Descriptor sizes of the runtime layout derived from a manifest. The
// sizing contract only needs these to be stable, not firmware-exact.
const MANIFEST_HEADER_BYTES: usize = 32;
const PROGRAM_DESC_BYTES: usize = 16;
const TERMINAL_DESC_BYTES: usize = 24;
const SECTION_DESC_BYTES: usize = 8;
const DEPENDENCY_ENTRY_BYTES: usize = 2;

/// The immutable, per-pipeline-topology descriptor.
///
/// Created once at pipeline-definition time and read-only thereafter;
/// every runtime instantiation (see [`crate::ProgramGroupParam`]) refers
/// back to one manifest.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ProgramGroupManifest {
    /// Program group id (topology identifier).
    pub id: u32,
    /// Human-readable topology name.
    pub name: String,
    /// Program entries, one per accelerator stage.
    pub programs: Vec<ProgramManifest>,
    /// Terminal entries, fixed at definition time.
    pub terminals: Vec<TerminalManifest>,
}

impl ProgramGroupManifest {
    /// Loads a manifest from a JSON file path.
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parses a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        let manifest: Self = serde_json::from_str(json)?;
        Ok(manifest)
    }

    /// Validates that the manifest is internally consistent.
    ///
    /// Checks:
    /// - At least one program and one terminal.
    /// - No duplicate program or terminal ids.
    /// - Associated-terminal references resolve.
    /// - Dependency lists reference existing programs/terminals.
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.programs.is_empty() {
            return Err(ManifestError::InvalidManifest(
                "manifest contains no programs".into(),
            ));
        }
        if self.terminals.is_empty() {
            return Err(ManifestError::InvalidManifest(
                "manifest contains no terminals".into(),
            ));
        }

        let mut program_ids = std::collections::HashSet::new();
        for p in &self.programs {
            if !program_ids.insert(p.id) {
                return Err(ManifestError::InvalidProgram {
                    program: p.id,
                    detail: "duplicate program id".into(),
                });
            }
        }

        let mut terminal_ids = std::collections::HashSet::new();
        for t in &self.terminals {
            if !terminal_ids.insert(t.id) {
                return Err(ManifestError::InvalidTerminal {
                    terminal: t.id,
                    detail: "duplicate terminal id".into(),
                });
            }
        }

        for t in &self.terminals {
            if let Some(assoc) = t.associated_terminal {
                if !terminal_ids.contains(&assoc) {
                    return Err(ManifestError::InvalidTerminal {
                        terminal: t.id,
                        detail: format!("associated terminal {assoc} does not exist"),
                    });
                }
            }
        }

        for p in &self.programs {
            for &dep in &p.program_dependencies {
                if !program_ids.contains(&dep) {
                    return Err(ManifestError::InvalidProgram {
                        program: p.id,
                        detail: format!("program dependency {dep} does not exist"),
                    });
                }
                if dep == p.id {
                    return Err(ManifestError::InvalidProgram {
                        program: p.id,
                        detail: "program depends on itself".into(),
                    });
                }
            }
            for &dep in &p.terminal_dependencies {
                if !terminal_ids.contains(&dep) {
                    return Err(ManifestError::InvalidProgram {
                        program: p.id,
                        detail: format!("terminal dependency {dep} does not exist"),
                    });
                }
            }
        }

        if !self.terminals.iter().any(|t| t.terminal_type.is_data()) {
            tracing::warn!(
                "manifest '{}' has no data terminals; group will not move frames",
                self.name,
            );
        }

        Ok(())
    }

    /// Returns the number of programs.
    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    /// Returns the number of terminals.
    pub fn terminal_count(&self) -> usize {
        self.terminals.len()
    }

    /// Looks up a terminal by id.
    pub fn terminal(&self, id: u8) -> Option<&TerminalManifest> {
        self.terminals.iter().find(|t| t.id == id)
    }

    /// Returns an iterator over the terminals of a given type.
    pub fn terminals_of_type(
        &self,
        terminal_type: TerminalType,
    ) -> impl Iterator<Item = &TerminalManifest> {
        self.terminals
            .iter()
            .filter(move |t| t.terminal_type == terminal_type)
    }

    /// Returns an iterator over the frame-carrying terminals.
    pub fn data_terminals(&self) -> impl Iterator<Item = &TerminalManifest> {
        self.terminals.iter().filter(|t| t.terminal_type.is_data())
    }

    /// Computes the byte size of the runtime descriptor block this
    /// manifest describes: a fixed header, one descriptor per program
    /// (plus its dependency entries), and one descriptor per terminal
    /// (plus its parameter-section descriptors).
    pub fn size_of(&self) -> usize {
        let program_bytes: usize = self
            .programs
            .iter()
            .map(|p| {
                PROGRAM_DESC_BYTES
                    + (p.program_dependency_count() + p.terminal_dependency_count())
                        * DEPENDENCY_ENTRY_BYTES
            })
            .sum();
        let terminal_bytes: usize = self
            .terminals
            .iter()
            .map(|t| TERMINAL_DESC_BYTES + t.total_sections() * SECTION_DESC_BYTES)
            .sum();
        MANIFEST_HEADER_BYTES + program_bytes + terminal_bytes
    }

    /// Returns a human-readable summary of the topology.
    pub fn summary(&self) -> String {
        let data_in = self.terminals_of_type(TerminalType::DataIn).count();
        let data_out = self.terminals_of_type(TerminalType::DataOut).count();
        format!(
            "Manifest '{}' (id {}): {} programs, {} terminals ({} in / {} out), {} bytes",
            self.name,
            self.id,
            self.program_count(),
            self.terminal_count(),
            data_in,
            data_out,
            self.size_of(),
        )
    }
}

/// A small but representative manifest used by tests across the crate.
#[cfg(test)]
pub(crate) fn sample_json() -> &'static str {
    r#"{
            "id": 17,
            "name": "isa_still",
            "programs": [
                { "id": 0, "preferred_cell": 1, "terminal_dependencies": [0, 1] },
                { "id": 1, "program_dependencies": [0], "terminal_dependencies": [1, 2] }
            ],
            "terminals": [
                {
                    "id": 0,
                    "terminal_type": "data_in",
                    "attributes": {
                        "category": "load", "direction": "in",
                        "rate": "per_frame", "buffer_type": "image"
                    },
                    "frame_format": { "width": 640, "height": 480, "bits_per_element": 8 }
                },
                {
                    "id": 1,
                    "terminal_type": "param",
                    "attributes": {
                        "category": "load", "direction": "in",
                        "rate": "static", "buffer_type": "metadata"
                    },
                    "cached_sections": 2,
                    "sliced_sections": 1,
                    "associated_terminal": 0,
                    "frame_format": { "width": 0, "height": 0, "bits_per_element": 8 }
                },
                {
                    "id": 2,
                    "terminal_type": "data_out",
                    "attributes": {
                        "category": "connect", "direction": "out",
                        "rate": "per_frame", "buffer_type": "image"
                    },
                    "frame_format": { "width": 640, "height": 480, "bits_per_element": 8 }
                }
            ]
        }"#
}
