// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The fixed queue set connecting the host and cell domains.
//!
//! Host → cell: one shared command queue for scheduled submissions, one
//! device queue for state-affecting administrative commands, and N
//! dedicated queues for persistent process groups, so one pipeline's
//! backlog cannot head-of-line-block another's commands.
//!
//! Cell → host: a single shared event queue. Only per-context FIFO
//! order is guaranteed on it; events for different context handles may
//! interleave.
//!
//! Every queue is single-writer/single-reader. The bounded channels are
//! the only synchronization point between the two domains.

use crate::{Command, Event, TransportError};
use tokio::sync::mpsc;

/// Addresses one host-to-cell queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueId {
    /// Shared queue for scheduled submissions (SUBMIT, RUN, ...).
    Command,
    /// Shared queue for administrative commands (STOP, ABORT, ...).
    Device,
    /// Dedicated queue of persistent process group `i`.
    Ppg(u8),
}

impl QueueId {
    fn index(self, num_ppg: u8) -> Result<usize, TransportError> {
        match self {
            QueueId::Command => Ok(0),
            QueueId::Device => Ok(1),
            QueueId::Ppg(i) if i < num_ppg => Ok(2 + i as usize),
            QueueId::Ppg(_) => Err(TransportError::NoSuchQueue(self)),
        }
    }
}

impl std::fmt::Display for QueueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueId::Command => write!(f, "command"),
            QueueId::Device => write!(f, "device"),
            QueueId::Ppg(i) => write!(f, "ppg[{i}]"),
        }
    }
}

/// Shape of the queue set.
#[derive(Debug, Clone, Copy)]
pub struct TransportConfig {
    /// Number of dedicated persistent-process-group queues.
    pub num_ppg_queues: u8,
    /// Depth of every command queue and the event queue.
    pub depth: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            num_ppg_queues: 4,
            depth: 32,
        }
    }
}

/// Builds the queue set and returns its two ends.
pub fn transport(config: TransportConfig) -> (HostPort, CellPort) {
    let total = 2 + config.num_ppg_queues as usize;
    let mut senders = Vec::with_capacity(total);
    let mut receivers = Vec::with_capacity(total);
    for _ in 0..total {
        let (tx, rx) = mpsc::channel(config.depth);
        senders.push(tx);
        receivers.push(Some(rx));
    }
    let (event_tx, event_rx) = mpsc::channel(config.depth);

    let host = HostPort {
        num_ppg: config.num_ppg_queues,
        senders,
        events: event_rx,
    };
    let cell = CellPort {
        num_ppg: config.num_ppg_queues,
        receivers,
        event_tx,
    };
    (host, cell)
}

/// Host-side end: sends commands, receives events.
pub struct HostPort {
    num_ppg: u8,
    senders: Vec<mpsc::Sender<Command>>,
    events: mpsc::Receiver<Event>,
}

impl HostPort {
    /// Number of dedicated persistent-group queues in this set.
    pub fn num_ppg_queues(&self) -> u8 {
        self.num_ppg
    }

    /// Sends a command, waiting while the addressed queue is full.
    pub async fn send(&self, queue: QueueId, cmd: Command) -> Result<(), TransportError> {
        let idx = queue.index(self.num_ppg)?;
        tracing::trace!(%queue, op = %cmd.op, context = cmd.context, "sending command");
        self.senders[idx]
            .send(cmd)
            .await
            .map_err(|_| TransportError::QueueClosed(queue))
    }

    /// Sends a command without waiting; fails if the queue is full.
    pub fn try_send(&self, queue: QueueId, cmd: Command) -> Result<(), TransportError> {
        let idx = queue.index(self.num_ppg)?;
        self.senders[idx].try_send(cmd).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => TransportError::QueueFull(queue),
            mpsc::error::TrySendError::Closed(_) => TransportError::QueueClosed(queue),
        })
    }

    /// Receives the next event, or `None` once the cell side is gone.
    pub async fn recv_event(&mut self) -> Option<Event> {
        self.events.recv().await
    }
}

/// Cell-side end: receives commands, sends events.
pub struct CellPort {
    num_ppg: u8,
    receivers: Vec<Option<mpsc::Receiver<Command>>>,
    event_tx: mpsc::Sender<Event>,
}

impl CellPort {
    /// Number of dedicated persistent-group queues in this set.
    pub fn num_ppg_queues(&self) -> u8 {
        self.num_ppg
    }

    /// Receives the next command on one queue, or `None` once the host
    /// side is gone.
    pub async fn recv(&mut self, queue: QueueId) -> Result<Option<Command>, TransportError> {
        let idx = queue.index(self.num_ppg)?;
        match self.receivers[idx].as_mut() {
            Some(rx) => Ok(rx.recv().await),
            None => Err(TransportError::NoSuchQueue(queue)),
        }
    }

    /// Moves one queue's receiver out, so it can be driven from its own
    /// task. Subsequent `recv` calls on that queue fail.
    pub fn take_queue(
        &mut self,
        queue: QueueId,
    ) -> Result<mpsc::Receiver<Command>, TransportError> {
        let idx = queue.index(self.num_ppg)?;
        self.receivers[idx]
            .take()
            .ok_or(TransportError::NoSuchQueue(queue))
    }

    /// Returns a cloneable handle for emitting events.
    pub fn event_sender(&self) -> EventSender {
        EventSender {
            tx: self.event_tx.clone(),
        }
    }

    /// Sends an event, waiting while the event queue is full.
    pub async fn send_event(&self, event: Event) -> Result<(), TransportError> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| TransportError::EventQueueClosed)
    }
}

/// Cloneable event-emitting handle for cell-side tasks.
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::Sender<Event>,
}

impl EventSender {
    pub async fn send(&self, event: Event) -> Result<(), TransportError> {
        self.tx
            .send(event)
            .await
            .map_err(|_| TransportError::EventQueueClosed)
    }
}
