// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the resource model.

/// Errors that can occur while binding or unbinding process resources.
///
/// Every rejected operation is synchronous and leaves the binding table
/// unchanged, so callers can always retry after fixing the precondition.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ResourceError {
    /// An identifier is outside its bounded id space.
    #[error("invalid {kind} id {id}: valid range is 0..{max}")]
    InvalidId {
        kind: &'static str,
        id: u8,
        max: u8,
    },

    /// A cell-scoped binding was attempted without a bound cell.
    #[error("no cell bound: cell-scoped memory bindings require set_cell first")]
    CellNotBound,

    /// A second cell binding was attempted while another cell is bound.
    #[error("cell {requested} cannot be bound: cell {bound} is already bound (max 1 cell per process)")]
    CellAlreadyBound { bound: u8, requested: u8 },
}
