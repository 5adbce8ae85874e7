// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # pg-manifest
//!
//! Manifests describe the *shape* of an IPU pipeline: which programs run,
//! which terminals (data and parameter ports) the pipeline exposes, and
//! how large the runtime objects built from them must be.
//!
//! # Key Components
//!
//! - [`ProgramGroupManifest`] — the immutable, per-topology descriptor.
//!   Parsed from JSON at pipeline-definition time, validated once, and
//!   read-only thereafter.
//! - [`ProgramManifest`] / [`TerminalManifest`] — per-program and
//!   per-terminal entries within a group manifest.
//! - [`TerminalAttributes`] — category/direction/rate/buffer-type of a
//!   terminal. Held as a plain struct; the 16-bit packed wire layout is
//!   produced only by [`TerminalAttributes::pack`].
//! - [`ProgramGroupParam`] — per-instantiation sizing and configuration
//!   (kernel-enable bitmap, fragment count), one per distinct runtime
//!   configuration such as a resolution change.
//!
//! # Sizing Contract
//!
//! Every runtime object built from a manifest is sized *before* it is
//! allocated: [`ProgramGroupManifest::size_of`] and
//! [`ProgramGroupParam::size_of`] compute byte sizes from explicit
//! counts, and the consuming allocator records exactly that size on the
//! object it returns.

mod error;
mod group;
mod param;
mod program;
mod terminal;

pub use error::ManifestError;
pub use group::ProgramGroupManifest;
pub use param::ProgramGroupParam;
pub use program::ProgramManifest;
pub use terminal::{
    BufferType, Category, Direction, FrameFormat, RateOfUpdate, TerminalAttributes,
    TerminalManifest, TerminalType,
};
