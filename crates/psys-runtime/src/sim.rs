// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! A single-process cell-domain simulator.
//!
//! The simulator stands in for the accelerator firmware: it drains the
//! command queues, walks each frame's fragments through a staging
//! [`BufQueue`], and answers every command with an event. It shares no
//! state with the host scheduler; the transport queues and the buffer
//! queue counters are the only synchronization points, exactly as in a
//! real host/cell split.
//!
//! Frame execution per fragment: acquire a free slot (yielding to the
//! runtime while the queue is full), publish it, then consume it again
//! from the other side. A `fail_after_fragments` knob injects a
//! fragment-load failure for exercising the error path.

use crate::PsysError;
use bufqueue::{BufBlock, BufQueue};
use psys_transport::{CellPort, Command, CommandOp, Event, EventSender, EventStatus, QueueId};
use std::collections::HashMap;
use tokio::sync::mpsc;

/// What the simulator needs to know about one registered group.
#[derive(Debug, Clone)]
pub struct SimGroupSpec {
    /// Context handle the host scheduler assigned.
    pub context: u32,
    /// Caller token echoed in every event.
    pub user_token: u64,
    /// Fragments per frame.
    pub fragment_count: u16,
    /// Frame size in bytes, used to shape the staging queue.
    pub frame_bytes: u32,
    /// Staging queue depth in slots.
    pub queue_capacity: usize,
    /// Injects a fragment-load failure after this many fragments.
    pub fail_after_fragments: Option<u16>,
}

struct SimGroup {
    spec: SimGroupSpec,
    staging: BufQueue,
}

/// The cell-domain simulator. Consumes the cell end of the transport.
pub struct CellSim {
    cell: CellPort,
    groups: HashMap<u32, SimGroup>,
}

impl CellSim {
    pub fn new(cell: CellPort) -> Self {
        Self {
            cell,
            groups: HashMap::new(),
        }
    }

    /// Registers a group before the simulator starts. The firmware
    /// learns group layouts at load time; the simulator learns them
    /// here.
    pub fn insert_group(&mut self, spec: SimGroupSpec) -> Result<(), PsysError> {
        let staging = BufQueue::new(
            spec.context,
            spec.queue_capacity,
            vec![BufBlock::new(0, spec.frame_bytes, spec.frame_bytes, 1)],
        )?;
        self.groups.insert(spec.context, SimGroup { spec, staging });
        Ok(())
    }

    /// Runs the simulator until every host-side sender is dropped.
    ///
    /// All command queues are merged into one stream via forwarder
    /// tasks; per-queue FIFO order is preserved, which is all the
    /// transport guarantees anyway.
    pub async fn run(mut self) -> Result<(), PsysError> {
        let events = self.cell.event_sender();
        let (merge_tx, mut merge_rx) = mpsc::channel::<(QueueId, Command)>(64);

        let mut queue_ids = vec![QueueId::Command, QueueId::Device];
        queue_ids.extend((0..self.cell.num_ppg_queues()).map(QueueId::Ppg));
        for qid in queue_ids {
            let mut rx = self.cell.take_queue(qid)?;
            let tx = merge_tx.clone();
            tokio::spawn(async move {
                while let Some(cmd) = rx.recv().await {
                    if tx.send((qid, cmd)).await.is_err() {
                        break;
                    }
                }
            });
        }
        drop(merge_tx);

        while let Some((qid, cmd)) = merge_rx.recv().await {
            tracing::debug!(queue = %qid, op = %cmd.op, context = cmd.context,
                "cell received command");
            self.handle(cmd, &events).await?;
        }
        tracing::debug!("host side gone, cell simulator exiting");
        Ok(())
    }

    async fn handle(&mut self, cmd: Command, events: &EventSender) -> Result<(), PsysError> {
        let group = match self.groups.get(&cmd.context) {
            Some(g) => g,
            None => {
                events
                    .send(Event::new(
                        EventStatus::ObjectNotFound,
                        cmd.op,
                        cmd.context,
                        0,
                    ))
                    .await?;
                return Ok(());
            }
        };
        let token = group.spec.user_token;

        let status = match cmd.op {
            CommandOp::Run => self.execute_frame(cmd.context).await?,
            CommandOp::Abort => EventStatus::Aborted,
            CommandOp::BufferSetEnqueue => {
                if group.staging.can_acquire_n(1) {
                    group.staging.acquire()?;
                    group.staging.enqueue()?;
                    EventStatus::Success
                } else {
                    EventStatus::FrameLoadFailed
                }
            }
            // Submit, Attach, Detach, Start, Disown, Stop, Suspend,
            // Resume, Reset: the host already validated the transition;
            // the simulated firmware just acknowledges.
            _ => EventStatus::Success,
        };

        events
            .send(Event::new(status, cmd.op, cmd.context, token))
            .await?;
        Ok(())
    }

    /// Walks one frame's fragments through the staging queue.
    async fn execute_frame(&mut self, context: u32) -> Result<EventStatus, PsysError> {
        let group = match self.groups.get_mut(&context) {
            Some(g) => g,
            None => return Ok(EventStatus::ObjectNotFound),
        };
        let q = &group.staging;

        for fragment in 0..group.spec.fragment_count {
            if group.spec.fail_after_fragments == Some(fragment) {
                tracing::warn!(context, fragment, "injected fragment-load failure");
                return Ok(EventStatus::FragmentLoadFailed);
            }

            // Producer side: wait for a free slot. Infeasible acquire
            // yields to the runtime rather than spinning.
            while !q.can_acquire_n(1) {
                tokio::task::yield_now().await;
            }
            q.acquire()?;
            q.enqueue()?;

            // Consumer side: the next stage drains the slot.
            while !q.can_dequeue_n(1) {
                tokio::task::yield_now().await;
            }
            q.dequeue()?;
            q.release()?;

            tracing::trace!(context, fragment, wrap = q.wrapcount(), "fragment complete");
        }
        Ok(EventStatus::Success)
    }
}
