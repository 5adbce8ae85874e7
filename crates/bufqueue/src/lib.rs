// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # bufqueue
//!
//! A circular queue over 1–5 parallel sub-buffers sharing one control
//! block, used to hand frame and parameter blocks between pipeline stages
//! (host → cell feeder, cell stage → cell stage).
//!
//! # The Four-Phase Protocol
//!
//! Every slot moves through four states, always in the same direction:
//!
//! ```text
//!   free ──acquire──► acquired ──enqueue──► published
//!    ▲                                          │
//!    └────release──── dequeued ◄───dequeue──────┘
//! ```
//!
//! - The **producer** side `acquire`s free slots, fills them, then
//!   `enqueue`s them to make them visible to the consumer.
//! - The **consumer** side `dequeue`s published slots, drains them, then
//!   `release`s them back to the free pool.
//!
//! # Invariants
//!
//! - `free + acquired + published + dequeued == capacity` before and after
//!   every operation (conservation).
//! - The wrap-count increments exactly once per full traversal of the
//!   index space, which lets producer and consumer agree on "same slot,
//!   different generation" without a shared lock.
//! - The queue never blocks or retries. Feasibility is reported by
//!   [`BufQueue::can_acquire_n`] / [`BufQueue::can_dequeue_n`]; an
//!   infeasible operation returns an error and changes nothing. Blocking
//!   policy belongs to the caller.
//!
//! # Concurrency
//!
//! Counters are atomics with acquire/release ordering so the host and the
//! cell domain observe consistent slot states. Each side of the protocol
//! is single-threaded: exactly one producer advances acquire/enqueue and
//! exactly one consumer advances dequeue/release. Under that discipline
//! the check-then-advance pattern is race-free.
//!
//! # Sub-Queues
//!
//! When sub-buffers drain at different rates (e.g. luma and chroma
//! planes), the `_subq` operation variants run the same four-phase
//! protocol independently per sub-buffer index.

mod block;
mod ctrl;
mod error;
mod queue;

pub use block::{calc_block_dimensions, BlockDimensions, BufBlock};
pub use ctrl::QueueCounts;
pub use error::QueueError;
pub use queue::{BufQueue, MAX_SUB_BUFFERS};
