// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # psys-runtime
//!
//! The process-group execution core: lifecycle state machines over
//! processes and terminals, the host-side scheduler, and a cell-domain
//! simulator for driving the whole pipeline in a single process.
//!
//! # Architecture
//!
//! ```text
//!  manifest + param          HostScheduler                CellSim
//!  ┌──────────────┐   create ┌────────────┐  commands  ┌──────────┐
//!  │ pg-manifest  │ ───────▶ │ ProcessGroup│ ─────────▶ │ fragment │
//!  │  (sizing)    │          │ state machine│ ◀───────── │   loop   │
//!  └──────────────┘          └────────────┘   events    └──────────┘
//!                                  │                         │
//!                            resource-model             bufqueue
//!                            (cell/mem/chn)           (staging slots)
//! ```
//!
//! The two domains communicate only through the transport queues and
//! the buffer-queue counters; no group state is mutated from both
//! sides.
//!
//! # Key Components
//!
//! - [`ProcessGroup`] — the runtime object, sized before allocation
//!   from its (manifest, param) pair.
//! - [`Process`] / [`Terminal`] / [`BufferSet`] — constituents.
//! - [`HostScheduler`] — issues commands, correlates events, keeps
//!   per-group [`GroupMetrics`].
//! - [`CellSim`] — simulated firmware for tests and the CLI.
//! - [`PsysConfig`] — TOML runtime configuration.

mod config;
mod error;
mod group;
mod metrics;
mod process;
mod scheduler;
mod sim;
mod terminal;

pub use config::PsysConfig;
pub use error::PsysError;
pub use group::{FragmentState, ProcessGroup, ProcessGroupState, QueueWindow};
pub use metrics::GroupMetrics;
pub use process::{Process, ProcessState};
pub use scheduler::HostScheduler;
pub use sim::{CellSim, SimGroupSpec};
pub use terminal::{BufferSet, FrameBuffer, Terminal};
