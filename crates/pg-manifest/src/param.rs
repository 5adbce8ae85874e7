// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Program group parameters: per-instantiation sizing and configuration.
//!
//! A manifest describes a topology once; a param set describes one
//! concrete runtime configuration of that topology (which kernels are
//! enabled, how many fragments a frame is split into). A new param set
//! is built for every distinct configuration, e.g. a resolution change.

use crate::{ManifestError, ProgramGroupManifest};

const PARAM_HEADER_BYTES: usize = 24;
const FRAGMENT_DESC_BYTES: usize = 16;
const TERMINAL_PARAM_BYTES: usize = 4;

/// Per-instantiation configuration of a program group.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct ProgramGroupParam {
    /// One bit per kernel; bit `i` set means kernel `i` runs.
    pub kernel_enable_bitmap: u64,
    /// Number of fragments each frame is split into. Must be >= 1.
    pub fragment_count: u16,
    /// Program count, mirrored from the manifest for consistency checks.
    pub program_count: u8,
    /// Terminal count, mirrored from the manifest.
    pub terminal_count: u8,
    /// Host/cell protocol version this param set was built for.
    pub protocol_version: u8,
}

/// The protocol version the current runtime speaks.
pub const CURRENT_PROTOCOL_VERSION: u8 = 1;

impl ProgramGroupParam {
    /// Builds a param set for a manifest with every kernel enabled and
    /// whole-frame (single-fragment) processing.
    pub fn for_manifest(manifest: &ProgramGroupManifest) -> Self {
        Self {
            kernel_enable_bitmap: u64::MAX,
            fragment_count: 1,
            program_count: manifest.program_count() as u8,
            terminal_count: manifest.terminal_count() as u8,
            protocol_version: CURRENT_PROTOCOL_VERSION,
        }
    }

    /// Sets the fragment count, returning `self` for chaining.
    pub fn with_fragments(mut self, fragment_count: u16) -> Self {
        self.fragment_count = fragment_count;
        self
    }

    /// Sets the kernel-enable bitmap, returning `self` for chaining.
    pub fn with_kernels(mut self, bitmap: u64) -> Self {
        self.kernel_enable_bitmap = bitmap;
        self
    }

    /// Validates the param set, optionally against its manifest.
    pub fn validate(&self, manifest: Option<&ProgramGroupManifest>) -> Result<(), ManifestError> {
        if self.fragment_count == 0 {
            return Err(ManifestError::InvalidParam(
                "fragment count must be at least 1".into(),
            ));
        }
        if self.kernel_enable_bitmap == 0 {
            return Err(ManifestError::InvalidParam(
                "kernel enable bitmap is empty".into(),
            ));
        }
        if let Some(m) = manifest {
            if self.program_count as usize != m.program_count() {
                return Err(ManifestError::InvalidParam(format!(
                    "program count mismatch: param has {}, manifest has {}",
                    self.program_count,
                    m.program_count(),
                )));
            }
            if self.terminal_count as usize != m.terminal_count() {
                return Err(ManifestError::InvalidParam(format!(
                    "terminal count mismatch: param has {}, manifest has {}",
                    self.terminal_count,
                    m.terminal_count(),
                )));
            }
        }
        Ok(())
    }

    /// Returns whether kernel `index` is enabled.
    pub fn is_kernel_enabled(&self, index: u8) -> bool {
        index < 64 && self.kernel_enable_bitmap & (1 << index) != 0
    }

    /// Number of enabled kernels.
    pub fn enabled_kernel_count(&self) -> u32 {
        self.kernel_enable_bitmap.count_ones()
    }

    /// Computes the byte size of the runtime parameter block: a fixed
    /// header, one fragment descriptor per fragment, and one parameter
    /// slot per terminal.
    pub fn size_of(&self) -> usize {
        PARAM_HEADER_BYTES
            + self.fragment_count as usize * FRAGMENT_DESC_BYTES
            + self.terminal_count as usize * TERMINAL_PARAM_BYTES
    }
}
