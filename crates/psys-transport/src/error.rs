// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for record decoding and queue delivery.

use crate::QueueId;

/// Errors that can occur in the command/event transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// A command record carries an opcode outside the known set.
    #[error("unknown command opcode: {0:#06x}")]
    UnknownOpcode(u16),

    /// An event record carries a status outside the closed taxonomy.
    #[error("unknown event status: {0:#06x}")]
    UnknownStatus(u16),

    /// The addressed queue does not exist in this transport instance.
    #[error("no such queue: {0}")]
    NoSuchQueue(QueueId),

    /// The addressed queue is at capacity.
    #[error("queue {0} is full")]
    QueueFull(QueueId),

    /// The other side of the addressed queue has been dropped.
    #[error("queue {0} is closed")]
    QueueClosed(QueueId),

    /// The shared event queue has been dropped.
    #[error("event queue is closed")]
    EventQueueClosed,
}
