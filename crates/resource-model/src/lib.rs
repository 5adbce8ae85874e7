// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # resource-model
//!
//! The on-chip resource model for the IPU processing subsystem (PSYS):
//! which compute cell, internal memories, external memories, and device
//! channels a process is bound to.
//!
//! # Key Components
//!
//! - [`CellId`], [`MemTypeId`], [`MemId`], [`DevChnId`] — bounded
//!   identifier newtypes. Out-of-range ids are rejected at construction.
//! - [`ResourceBindings`] — the per-process binding table with the
//!   precondition-checked setter/clearer verbs. A rejected operation
//!   never changes any binding.
//!
//! # Binding Rules
//!
//! - At most one cell per process ([`PROCESS_MAX_CELLS`] = 1).
//! - Internal and external memory bindings are cell-scoped: they can only
//!   be set while a cell is bound, and clearing the cell invalidates them.
//! - Device-channel bindings are independent of the cell.
//! - All setters are idempotent with respect to the other bindings: they
//!   touch exactly one entry.
//!
//! # Example
//! ```
//! use resource_model::{CellId, MemTypeId, ResourceBindings};
//!
//! let mut b = ResourceBindings::new();
//! let cell = CellId::new(2).unwrap();
//! let dmem = MemTypeId::new(1).unwrap();
//!
//! // Memory binding requires a bound cell.
//! assert!(b.set_internal_mem(dmem, 0x100).is_err());
//!
//! b.set_cell(cell).unwrap();
//! b.set_internal_mem(dmem, 0x100).unwrap();
//! assert_eq!(b.internal_mem(dmem), Some(0x100));
//!
//! // Clearing the cell invalidates the cell-scoped bindings.
//! b.clear_cell().unwrap();
//! assert_eq!(b.internal_mem(dmem), None);
//! ```

mod bindings;
mod error;
mod ids;

pub use bindings::{ResourceBindings, PROCESS_MAX_CELLS};
pub use error::ResourceError;
pub use ids::{CellId, DevChnId, MemId, MemTypeId, N_CELL_ID, N_DEV_CHN_ID, N_MEM_ID, N_MEM_TYPE_ID};
