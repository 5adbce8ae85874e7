// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the buffer queue.

/// Errors that can occur constructing or operating a [`crate::BufQueue`].
///
/// Operational errors are always synchronous rejections: the queue state
/// is unchanged and the caller may retry once the feasibility predicate
/// (`can_acquire_n` / `can_dequeue_n`) reports true.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueueError {
    /// A queue must have at least one sub-buffer.
    #[error("queue has no sub-buffers")]
    ZeroBlocks,

    /// A queue supports at most 5 sub-buffers over one control block.
    #[error("queue has {0} sub-buffers, maximum is 5")]
    TooManyBlocks(usize),

    /// A queue must have at least one slot.
    #[error("queue capacity is zero")]
    ZeroCapacity,

    /// An operation asked for more slots than its phase has available.
    #[error("{phase} of {requested} slot(s) infeasible: only {available} available")]
    InsufficientSlots {
        phase: &'static str,
        requested: usize,
        available: usize,
    },

    /// A sub-queue index beyond the number of sub-buffers.
    #[error("sub-queue index {idx} out of range: queue has {count} sub-buffers")]
    BadSubQueue { idx: usize, count: usize },
}
