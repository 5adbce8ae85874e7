// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The per-process resource binding table.
//!
//! A process owns at most one [`CellId`] plus offset bindings for the
//! memories and device channels it uses. Bindings are host-side state:
//! the cell domain never mutates them, so no locking is needed here.
//!
//! Internal- and external-memory bindings are scoped to the bound cell.
//! [`ResourceBindings::clear_cell`] therefore drops them along with the
//! cell itself; a stale memory offset without a cell would be meaningless
//! to the dispatcher.

use crate::{CellId, DevChnId, MemId, MemTypeId, ResourceError};
use std::collections::BTreeMap;

/// Maximum number of cells bound to a single process.
pub const PROCESS_MAX_CELLS: usize = 1;

/// The resource bindings of one process.
///
/// All setters validate their precondition first and mutate exactly one
/// entry on success. A rejected call returns an error and changes nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceBindings {
    cell: Option<CellId>,
    internal_mem: BTreeMap<MemTypeId, u32>,
    external_mem: BTreeMap<MemId, u32>,
    dev_chn: BTreeMap<DevChnId, u32>,
}

impl ResourceBindings {
    /// Creates an empty binding table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets every binding to "unset". Always succeeds; idempotent.
    pub fn clear_all(&mut self) {
        self.cell = None;
        self.internal_mem.clear();
        self.external_mem.clear();
        self.dev_chn.clear();
    }

    // ── Cell ───────────────────────────────────────────────────

    /// Binds the compute cell.
    ///
    /// Re-binding the same cell is a no-op; binding a different cell while
    /// one is bound is rejected (`PROCESS_MAX_CELLS` = 1).
    pub fn set_cell(&mut self, cell: CellId) -> Result<(), ResourceError> {
        match self.cell {
            Some(bound) if bound != cell => Err(ResourceError::CellAlreadyBound {
                bound: bound.raw(),
                requested: cell.raw(),
            }),
            _ => {
                self.cell = Some(cell);
                Ok(())
            }
        }
    }

    /// Unbinds the cell and invalidates the cell-scoped memory bindings.
    ///
    /// Succeeds even when no cell is bound.
    pub fn clear_cell(&mut self) -> Result<(), ResourceError> {
        if let Some(cell) = self.cell.take() {
            let dropped = self.internal_mem.len() + self.external_mem.len();
            if dropped > 0 {
                tracing::debug!(cell = cell.raw(), dropped, "cell unbound, memory bindings invalidated");
            }
            self.internal_mem.clear();
            self.external_mem.clear();
        }
        Ok(())
    }

    /// Returns the bound cell, if any.
    pub fn cell(&self) -> Option<CellId> {
        self.cell
    }

    // ── Cell-internal memory ───────────────────────────────────

    /// Binds an internal-memory offset. Requires a bound cell.
    pub fn set_internal_mem(
        &mut self,
        mem_type: MemTypeId,
        offset: u32,
    ) -> Result<(), ResourceError> {
        self.require_cell()?;
        self.internal_mem.insert(mem_type, offset);
        Ok(())
    }

    /// Clears an internal-memory binding. Requires a bound cell.
    pub fn clear_internal_mem(&mut self, mem_type: MemTypeId) -> Result<(), ResourceError> {
        self.require_cell()?;
        self.internal_mem.remove(&mem_type);
        Ok(())
    }

    /// Returns the internal-memory offset bound for `mem_type`, if any.
    pub fn internal_mem(&self, mem_type: MemTypeId) -> Option<u32> {
        self.internal_mem.get(&mem_type).copied()
    }

    // ── Cell-external memory ───────────────────────────────────

    /// Binds an external-memory offset. Requires a bound cell.
    pub fn set_external_mem(&mut self, mem: MemId, offset: u32) -> Result<(), ResourceError> {
        self.require_cell()?;
        self.external_mem.insert(mem, offset);
        Ok(())
    }

    /// Clears an external-memory binding. Requires a bound cell.
    pub fn clear_external_mem(&mut self, mem: MemId) -> Result<(), ResourceError> {
        self.require_cell()?;
        self.external_mem.remove(&mem);
        Ok(())
    }

    /// Returns the external-memory offset bound for `mem`, if any.
    pub fn external_mem(&self, mem: MemId) -> Option<u32> {
        self.external_mem.get(&mem).copied()
    }

    // ── Device channels ────────────────────────────────────────

    /// Binds a device-channel offset. No cell precondition.
    pub fn set_dev_chn(&mut self, chn: DevChnId, offset: u32) -> Result<(), ResourceError> {
        self.dev_chn.insert(chn, offset);
        Ok(())
    }

    /// Clears a device-channel binding. No cell precondition.
    pub fn clear_dev_chn(&mut self, chn: DevChnId) -> Result<(), ResourceError> {
        self.dev_chn.remove(&chn);
        Ok(())
    }

    /// Returns the device-channel offset bound for `chn`, if any.
    pub fn dev_chn(&self, chn: DevChnId) -> Option<u32> {
        self.dev_chn.get(&chn).copied()
    }

    // ── Queries ────────────────────────────────────────────────

    /// Returns `true` if no resource at all is bound.
    pub fn is_empty(&self) -> bool {
        self.cell.is_none()
            && self.internal_mem.is_empty()
            && self.external_mem.is_empty()
            && self.dev_chn.is_empty()
    }

    /// Returns the number of bound entries (cell counts as one).
    pub fn num_bindings(&self) -> usize {
        usize::from(self.cell.is_some())
            + self.internal_mem.len()
            + self.external_mem.len()
            + self.dev_chn.len()
    }

    fn require_cell(&self) -> Result<(), ResourceError> {
        if self.cell.is_some() {
            Ok(())
        } else {
            Err(ResourceError::CellNotBound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (CellId, MemTypeId, MemId, DevChnId) {
        (
            CellId::new(1).unwrap(),
            MemTypeId::new(0).unwrap(),
            MemId::new(3).unwrap(),
            DevChnId::new(2).unwrap(),
        )
    }

    #[test]
    fn test_cell_bind_unbind() {
        let (cell, ..) = ids();
        let mut b = ResourceBindings::new();

        assert_eq!(b.cell(), None);
        b.set_cell(cell).unwrap();
        assert_eq!(b.cell(), Some(cell));

        b.clear_cell().unwrap();
        assert_eq!(b.cell(), None);
    }

    #[test]
    fn test_set_cell_idempotent() {
        let (cell, ..) = ids();
        let mut b = ResourceBindings::new();
        b.set_cell(cell).unwrap();
        b.set_cell(cell).unwrap(); // Same cell: no-op.
        assert_eq!(b.cell(), Some(cell));
    }

    #[test]
    fn test_second_cell_rejected() {
        let mut b = ResourceBindings::new();
        b.set_cell(CellId::new(1).unwrap()).unwrap();
        let err = b.set_cell(CellId::new(2).unwrap()).unwrap_err();
        assert_eq!(
            err,
            ResourceError::CellAlreadyBound {
                bound: 1,
                requested: 2
            }
        );
        // Original binding is untouched.
        assert_eq!(b.cell().unwrap().raw(), 1);
    }

    #[test]
    fn test_internal_mem_requires_cell() {
        let (cell, mem_type, ..) = ids();
        let mut b = ResourceBindings::new();

        // No cell bound: rejected, no state change.
        assert_eq!(
            b.set_internal_mem(mem_type, 0x40),
            Err(ResourceError::CellNotBound)
        );
        assert!(b.is_empty());

        b.set_cell(cell).unwrap();
        b.set_internal_mem(mem_type, 0x40).unwrap();
        assert_eq!(b.internal_mem(mem_type), Some(0x40));
    }

    #[test]
    fn test_external_mem_requires_cell() {
        let (cell, _, mem, _) = ids();
        let mut b = ResourceBindings::new();

        assert_eq!(
            b.set_external_mem(mem, 0x80),
            Err(ResourceError::CellNotBound)
        );

        b.set_cell(cell).unwrap();
        b.set_external_mem(mem, 0x80).unwrap();
        assert_eq!(b.external_mem(mem), Some(0x80));

        b.clear_external_mem(mem).unwrap();
        assert_eq!(b.external_mem(mem), None);
    }

    #[test]
    fn test_clear_mem_requires_cell() {
        let (_, mem_type, ..) = ids();
        let mut b = ResourceBindings::new();
        assert_eq!(
            b.clear_internal_mem(mem_type),
            Err(ResourceError::CellNotBound)
        );
    }

    #[test]
    fn test_dev_chn_no_precondition() {
        let (.., chn) = ids();
        let mut b = ResourceBindings::new();

        // No cell required for channels.
        b.set_dev_chn(chn, 0x10).unwrap();
        assert_eq!(b.dev_chn(chn), Some(0x10));

        b.clear_dev_chn(chn).unwrap();
        assert_eq!(b.dev_chn(chn), None);
    }

    #[test]
    fn test_clear_cell_invalidates_memory() {
        let (cell, mem_type, mem, chn) = ids();
        let mut b = ResourceBindings::new();

        b.set_cell(cell).unwrap();
        b.set_internal_mem(mem_type, 1).unwrap();
        b.set_external_mem(mem, 2).unwrap();
        b.set_dev_chn(chn, 3).unwrap();

        b.clear_cell().unwrap();

        // Cell-scoped bindings are gone; channel binding survives.
        assert_eq!(b.internal_mem(mem_type), None);
        assert_eq!(b.external_mem(mem), None);
        assert_eq!(b.dev_chn(chn), Some(3));
    }

    #[test]
    fn test_setter_touches_single_binding() {
        let (cell, mem_type, mem, chn) = ids();
        let mut b = ResourceBindings::new();
        b.set_cell(cell).unwrap();
        b.set_internal_mem(mem_type, 1).unwrap();
        b.set_dev_chn(chn, 3).unwrap();

        let before = b.clone();
        // Re-setting with the same offset changes nothing at all.
        b.set_internal_mem(mem_type, 1).unwrap();
        assert_eq!(b, before);

        // Setting a different binding leaves the others untouched.
        b.set_external_mem(mem, 9).unwrap();
        assert_eq!(b.internal_mem(mem_type), Some(1));
        assert_eq!(b.dev_chn(chn), Some(3));
    }

    #[test]
    fn test_clear_all_idempotent() {
        let (cell, mem_type, _, chn) = ids();
        let mut b = ResourceBindings::new();
        b.set_cell(cell).unwrap();
        b.set_internal_mem(mem_type, 1).unwrap();
        b.set_dev_chn(chn, 3).unwrap();

        b.clear_all();
        let after_once = b.clone();
        b.clear_all();

        assert!(b.is_empty());
        assert_eq!(b, after_once);
    }

    #[test]
    fn test_num_bindings() {
        let (cell, mem_type, mem, chn) = ids();
        let mut b = ResourceBindings::new();
        assert_eq!(b.num_bindings(), 0);

        b.set_cell(cell).unwrap();
        b.set_internal_mem(mem_type, 1).unwrap();
        b.set_external_mem(mem, 2).unwrap();
        b.set_dev_chn(chn, 3).unwrap();
        assert_eq!(b.num_bindings(), 4);
    }
}
