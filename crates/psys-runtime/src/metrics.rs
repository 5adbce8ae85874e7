// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-group execution timing, accumulated by the host scheduler.
//!
//! The counters mirror the phases a group passes through: scheduler
//! admission, object load, cell-side init, fragment processing,
//! next-frame re-init, and completion handling.

/// Accumulated phase timings of one process group, in nanoseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupMetrics {
    /// Time from submit to scheduler acceptance.
    pub server_init_ns: u64,
    /// Time spent loading the group onto the cell (START → started).
    pub load_ns: u64,
    /// Cell-side initialisation before the first fragment.
    pub init_ns: u64,
    /// Fragment processing time across all RUNs.
    pub processing_ns: u64,
    /// Re-initialisation between frames of a persistent group.
    pub next_frame_init_ns: u64,
    /// Completion and teardown handling.
    pub complete_ns: u64,
    /// Frames completed.
    pub frames: u64,
    /// Fragments completed.
    pub fragments: u64,
}

impl GroupMetrics {
    /// Total accounted time across all phases.
    pub fn total_ns(&self) -> u64 {
        self.server_init_ns
            + self.load_ns
            + self.init_ns
            + self.processing_ns
            + self.next_frame_init_ns
            + self.complete_ns
    }

    /// Mean processing time per frame, if any frames completed.
    pub fn per_frame_ns(&self) -> Option<u64> {
        (self.frames > 0).then(|| self.processing_ns / self.frames)
    }

    /// Resets every counter. Used by group RESET.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl std::fmt::Display for GroupMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "frames: {}, fragments: {}, load: {:.2}ms, processing: {:.2}ms, total: {:.2}ms",
            self.frames,
            self.fragments,
            self.load_ns as f64 / 1e6,
            self.processing_ns as f64 / 1e6,
            self.total_ns() as f64 / 1e6,
        )
    }
}
