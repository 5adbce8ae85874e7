// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # psys-transport
//!
//! Fixed-width command/event records and the single-writer/single-reader
//! queue set that carries them between the host control domain and the
//! cell execution domain.
//!
//! # Key Components
//!
//! - [`Command`] — 64-bit record: 16-bit opcode, 16-bit message, 32-bit
//!   context handle.
//! - [`Event`] — 128-bit record: 16-bit status, 16-bit echoed opcode,
//!   32-bit context handle, 64-bit caller token.
//! - [`transport`] / [`HostPort`] / [`CellPort`] — the queue set: one
//!   shared command queue, one device queue, N dedicated
//!   persistent-group queues, and a single shared event queue.
//!
//! # Ordering Guarantees
//!
//! Each queue is strictly in-order. The shared event queue guarantees
//! FIFO order per context handle only; events for different groups may
//! interleave.

mod command;
mod error;
mod event;
mod queues;

pub use command::{Command, CommandOp};
pub use error::TransportError;
pub use event::{Event, EventStatus};
pub use queues::{transport, CellPort, EventSender, HostPort, QueueId, TransportConfig};
