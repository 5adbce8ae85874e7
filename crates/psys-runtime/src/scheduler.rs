// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The host-side scheduler: owns the host end of the transport,
//! registered process groups, and the dedicated-queue registry.
//!
//! Every state-changing command is applied to the local group first
//! (synchronous guard: a rejected transition never reaches the wire)
//! and then sent to the cell domain. Completion comes back as events;
//! the scheduler correlates them by context handle and accumulates
//! per-phase timing into the group's metrics.

use crate::{ProcessGroup, PsysError, QueueWindow};
use psys_transport::{Command, CommandOp, Event, EventStatus, HostPort, QueueId};
use std::collections::HashMap;
use std::time::Instant;

/// Host-side control domain over a set of process groups.
pub struct HostScheduler {
    host: HostPort,
    groups: HashMap<u32, ProcessGroup>,
    next_handle: u32,
    free_ppg: Vec<u8>,
    ppg_assignment: HashMap<u32, u8>,
    pending: HashMap<(u32, u16), Instant>,
}

impl HostScheduler {
    pub fn new(host: HostPort) -> Self {
        // Dedicated queues are handed out lowest-index first.
        let free_ppg = (0..host.num_ppg_queues()).rev().collect();
        Self {
            host,
            groups: HashMap::new(),
            next_handle: 1,
            free_ppg,
            ppg_assignment: HashMap::new(),
            pending: HashMap::new(),
        }
    }

    // ── Registration ────────────────────────────────────────────────

    /// Registers a group and returns its context handle. The group uses
    /// the shared command queue.
    pub fn register(&mut self, group: ProcessGroup) -> u32 {
        let handle = self.next_handle;
        self.next_handle += 1;
        tracing::debug!(handle, group = group.manifest().id, "registered group");
        self.groups.insert(handle, group);
        handle
    }

    /// Registers a persistent group, assigning it a dedicated command
    /// queue so other pipelines cannot head-of-line-block it.
    pub fn register_persistent(&mut self, mut group: ProcessGroup) -> Result<u32, PsysError> {
        let queue = self.free_ppg.pop().ok_or(PsysError::PpgQueuesExhausted {
            capacity: self.host.num_ppg_queues(),
        })?;
        group.assign_queue_window(QueueWindow {
            base: queue,
            count: 1,
        });
        let handle = self.register(group);
        self.ppg_assignment.insert(handle, queue);
        Ok(handle)
    }

    /// Removes a group, returning it and freeing its dedicated queue.
    pub fn unregister(&mut self, handle: u32) -> Result<ProcessGroup, PsysError> {
        let group = self
            .groups
            .remove(&handle)
            .ok_or(PsysError::UnknownContext(handle))?;
        if let Some(queue) = self.ppg_assignment.remove(&handle) {
            self.free_ppg.push(queue);
        }
        Ok(group)
    }

    pub fn group(&self, handle: u32) -> Result<&ProcessGroup, PsysError> {
        self.groups
            .get(&handle)
            .ok_or(PsysError::UnknownContext(handle))
    }

    pub fn group_mut(&mut self, handle: u32) -> Result<&mut ProcessGroup, PsysError> {
        self.groups
            .get_mut(&handle)
            .ok_or(PsysError::UnknownContext(handle))
    }

    /// Dedicated queues still available.
    pub fn free_ppg_queues(&self) -> usize {
        self.free_ppg.len()
    }

    // ── Command issue ───────────────────────────────────────────────

    fn queue_for(&self, handle: u32, op: CommandOp) -> QueueId {
        if op.is_administrative() {
            return QueueId::Device;
        }
        match self.ppg_assignment.get(&handle) {
            Some(&q) => QueueId::Ppg(q),
            None => QueueId::Command,
        }
    }

    async fn issue(&mut self, handle: u32, op: CommandOp) -> Result<(), PsysError> {
        let queue = self.queue_for(handle, op);
        self.pending.insert((handle, op as u16), Instant::now());
        self.host.send(queue, Command::new(op, handle)).await?;
        Ok(())
    }

    /// SUBMIT: local guard + transition, then hand to the cell domain.
    pub async fn submit(&mut self, handle: u32) -> Result<(), PsysError> {
        self.group_mut(handle)?.submit()?;
        self.issue(handle, CommandOp::Submit).await
    }

    pub async fn start(&mut self, handle: u32) -> Result<(), PsysError> {
        self.group_mut(handle)?.start()?;
        self.issue(handle, CommandOp::Start).await
    }

    pub async fn disown(&mut self, handle: u32) -> Result<(), PsysError> {
        self.group_mut(handle)?.disown()?;
        self.issue(handle, CommandOp::Disown).await
    }

    pub async fn run(&mut self, handle: u32) -> Result<(), PsysError> {
        self.group_mut(handle)?.run()?;
        self.issue(handle, CommandOp::Run).await
    }

    pub async fn stop(&mut self, handle: u32) -> Result<(), PsysError> {
        self.group_mut(handle)?.stop()?;
        self.issue(handle, CommandOp::Stop).await
    }

    pub async fn suspend(&mut self, handle: u32) -> Result<(), PsysError> {
        self.group_mut(handle)?.suspend()?;
        self.issue(handle, CommandOp::Suspend).await
    }

    pub async fn resume(&mut self, handle: u32) -> Result<(), PsysError> {
        self.group_mut(handle)?.resume()?;
        self.issue(handle, CommandOp::Resume).await
    }

    pub async fn abort(&mut self, handle: u32) -> Result<(), PsysError> {
        self.group_mut(handle)?.abort()?;
        self.issue(handle, CommandOp::Abort).await
    }

    pub async fn reset(&mut self, handle: u32) -> Result<(), PsysError> {
        self.group_mut(handle)?.reset()?;
        self.issue(handle, CommandOp::Reset).await
    }

    /// Enqueues a buffer set for a persistent group's next frame.
    /// Guarded by the joint precondition: resources attached and every
    /// buffer shaped to its terminal descriptor.
    pub async fn enqueue_buffer_set(
        &mut self,
        handle: u32,
        buffers: &crate::BufferSet,
    ) -> Result<(), PsysError> {
        let group = self.group(handle)?;
        if !group.resources_attached() {
            return Err(PsysError::ResourcesNotAttached);
        }
        group.check_buffer_set(buffers)?;
        self.issue(handle, CommandOp::BufferSetEnqueue).await
    }

    // ── Event handling ──────────────────────────────────────────────

    /// Receives and applies the next event. Returns the event, or
    /// `None` once the cell side is gone.
    pub async fn next_event(&mut self) -> Result<Option<Event>, PsysError> {
        match self.host.recv_event().await {
            Some(event) => {
                self.apply_event(&event)?;
                Ok(Some(event))
            }
            None => Ok(None),
        }
    }

    /// Pumps events until one answers `op` for `handle`. Events for
    /// other groups are applied along the way (the shared event queue
    /// only guarantees per-context order).
    pub async fn await_completion(
        &mut self,
        handle: u32,
        op: CommandOp,
    ) -> Result<Event, PsysError> {
        loop {
            match self.next_event().await? {
                Some(event) if event.context == handle && event.op == op => return Ok(event),
                Some(_) => continue,
                None => return Err(PsysError::UnknownContext(handle)),
            }
        }
    }

    fn apply_event(&mut self, event: &Event) -> Result<(), PsysError> {
        let elapsed_ns = self
            .pending
            .remove(&(event.context, event.op as u16))
            .map(|t| t.elapsed().as_nanos() as u64)
            .unwrap_or(0);

        let group = match self.groups.get_mut(&event.context) {
            Some(g) => g,
            None => {
                tracing::warn!(context = event.context, status = ?event.status,
                    "event for unknown context");
                return Ok(());
            }
        };

        if event.status.is_failure() {
            tracing::error!(context = event.context, op = %event.op,
                status = ?event.status, "group failed");
            group.fail();
            return Ok(());
        }

        let fragments = group.fragment_state().total as u64;
        let m = group.metrics_mut();
        match event.op {
            CommandOp::Submit => m.server_init_ns += elapsed_ns,
            CommandOp::Start => m.load_ns += elapsed_ns,
            CommandOp::Run => {
                if event.status == EventStatus::Success {
                    m.processing_ns += elapsed_ns;
                    m.frames += 1;
                    m.fragments += fragments;
                }
            }
            CommandOp::Stop | CommandOp::Abort => m.complete_ns += elapsed_ns,
            CommandOp::Resume => m.next_frame_init_ns += elapsed_ns,
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BufferSet, FrameBuffer, ProcessGroup};
    use pg_manifest::{ProgramGroupManifest, ProgramGroupParam};
    use psys_transport::{transport, TransportConfig};
    use std::sync::Arc;

    fn group() -> ProcessGroup {
        let m = Arc::new(
            ProgramGroupManifest::from_json(
                r#"{
                    "id": 2,
                    "name": "sched_pipe",
                    "programs": [{ "id": 0 }],
                    "terminals": [
                        {
                            "id": 0,
                            "terminal_type": "data_in",
                            "attributes": {
                                "category": "load", "direction": "in",
                                "rate": "per_frame", "buffer_type": "image"
                            },
                            "frame_format": { "width": 8, "height": 8, "bits_per_element": 8 }
                        },
                        {
                            "id": 1,
                            "terminal_type": "data_out",
                            "attributes": {
                                "category": "connect", "direction": "out",
                                "rate": "per_frame", "buffer_type": "image"
                            },
                            "frame_format": { "width": 8, "height": 8, "bits_per_element": 8 }
                        }
                    ]
                }"#,
            )
            .unwrap(),
        );
        let param = ProgramGroupParam::for_manifest(&m);
        let mut g = ProcessGroup::create(m, param, 1).unwrap();
        let buffers = BufferSet::new()
            .with_buffer(0, FrameBuffer { handle: 1, len: 64 })
            .with_buffer(1, FrameBuffer { handle: 2, len: 64 });
        g.attach(&buffers).unwrap();
        g
    }

    fn scheduler(num_ppg: u8) -> HostScheduler {
        let (host, _cell) = transport(TransportConfig {
            num_ppg_queues: num_ppg,
            depth: 8,
        });
        HostScheduler::new(host)
    }

    #[test]
    fn test_ppg_registry_bounded() {
        let mut s = scheduler(2);
        let a = s.register_persistent(group()).unwrap();
        let _b = s.register_persistent(group()).unwrap();
        assert_eq!(s.free_ppg_queues(), 0);
        assert!(matches!(
            s.register_persistent(group()),
            Err(PsysError::PpgQueuesExhausted { capacity: 2 })
        ));

        // Unregistering returns the queue to the pool.
        s.unregister(a).unwrap();
        assert_eq!(s.free_ppg_queues(), 1);
        s.register_persistent(group()).unwrap();
    }

    #[test]
    fn test_queue_routing() {
        let mut s = scheduler(2);
        let shared = s.register(group());
        let dedicated = s.register_persistent(group()).unwrap();

        assert_eq!(s.queue_for(shared, CommandOp::Run), QueueId::Command);
        assert_eq!(s.queue_for(dedicated, CommandOp::Run), QueueId::Ppg(0));
        // Administrative commands always take the device queue.
        assert_eq!(s.queue_for(dedicated, CommandOp::Abort), QueueId::Device);
        assert_eq!(s.queue_for(shared, CommandOp::Stop), QueueId::Device);
    }

    #[tokio::test]
    async fn test_rejected_transition_never_reaches_wire() {
        let (host, mut cell) = transport(TransportConfig {
            num_ppg_queues: 0,
            depth: 4,
        });
        let mut s = HostScheduler::new(host);
        let handle = s.register(group());

        // START from CREATED is illegal; nothing may be sent.
        assert!(s.start(handle).await.is_err());
        let mut rx = cell.take_queue(QueueId::Command).unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unknown_handle() {
        let mut s = scheduler(0);
        assert!(matches!(
            s.submit(99).await,
            Err(PsysError::UnknownContext(99))
        ));
    }
}
