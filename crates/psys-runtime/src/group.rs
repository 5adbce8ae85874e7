// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The process group: lifecycle state machine over processes and
//! terminals.
//!
//! # State Machine
//!
//! ```text
//! CREATED ──SUBMIT──▶ READY ──START──▶ STARTED ──RUN──▶ RUNNING
//!    ▲                                                 │  │  │
//!    │                                          SUSPEND│  │  │stall
//!    │                                                 ▼  │  ▼
//!    │                                            BLOCKED │ STALLED
//!    │                                                    │
//!    └───────────RESET──────── STOPPED ◀───STOP/ABORT─────┘
//! ```
//!
//! `ERROR` is reachable from every state on a fatal failure; only
//! `RESET` leaves it. Rejected commands are synchronous errors and
//! leave the group unchanged.
//!
//! Resource acquisition is a precondition of dispatch: `RUN` checks
//! that every enabled process has acquired its cell, it never acquires
//! anything itself.

use crate::{BufferSet, GroupMetrics, Process, ProcessState, PsysError, Terminal};
use pg_manifest::{ProgramGroupManifest, ProgramGroupParam};
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// Descriptor sizes of the runtime object layout; together with the
// manifest/param sizes they make group sizing fully count-driven.
const GROUP_HEADER_BYTES: usize = 64;
const PROCESS_BYTES: usize = 48;
const TERMINAL_BYTES: usize = 32;

// Private tokens are process-wide unique and never zero.
static NEXT_PRIVATE_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Lifecycle states of a process group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessGroupState {
    /// Allocated from (manifest, param); not yet scheduled.
    Created,
    /// Submitted; queued at the scheduler.
    Ready,
    /// Suspended at a fragment boundary.
    Blocked,
    /// Dispatched to the cell domain.
    Started,
    /// Executing fragments.
    Running,
    /// Liveness failure observed; controller should ABORT.
    Stalled,
    /// Execution finished or was stopped.
    Stopped,
    /// Fatal failure; only RESET recovers.
    Error,
}

impl ProcessGroupState {
    pub fn as_str(self) -> &'static str {
        match self {
            ProcessGroupState::Created => "CREATED",
            ProcessGroupState::Ready => "READY",
            ProcessGroupState::Blocked => "BLOCKED",
            ProcessGroupState::Started => "STARTED",
            ProcessGroupState::Running => "RUNNING",
            ProcessGroupState::Stalled => "STALLED",
            ProcessGroupState::Stopped => "STOPPED",
            ProcessGroupState::Error => "ERROR",
        }
    }
}

/// Fragment progress within the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentState {
    pub current: u16,
    pub total: u16,
}

/// The window of dedicated command queues assigned to a persistent
/// group by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueWindow {
    /// First dedicated queue index.
    pub base: u8,
    /// Number of consecutive queues, not counting the shared device
    /// queue.
    pub count: u8,
}

/// The runtime object: owned exclusively by the submitting context
/// until destroyed or disowned.
#[derive(Debug)]
pub struct ProcessGroup {
    state: ProcessGroupState,
    processes: Vec<Process>,
    terminals: Vec<Terminal>,
    user_token: u64,
    private_token: NonZeroU64,
    resources_attached: bool,
    host_owned: bool,
    fragment: FragmentState,
    queue_window: Option<QueueWindow>,
    size: usize,
    manifest: Arc<ProgramGroupManifest>,
    param: ProgramGroupParam,
    metrics: GroupMetrics,
}

impl ProcessGroup {
    /// Computes the byte size of the runtime object a given
    /// (manifest, param) pair produces. Callers size before they
    /// allocate; [`ProcessGroup::create`] records exactly this value.
    pub fn size_of(manifest: &ProgramGroupManifest, param: &ProgramGroupParam) -> usize {
        GROUP_HEADER_BYTES
            + manifest.size_of()
            + param.size_of()
            + manifest.program_count() * PROCESS_BYTES
            + manifest.terminal_count() * TERMINAL_BYTES
    }

    /// Creates a group from a validated (manifest, param) pair.
    pub fn create(
        manifest: Arc<ProgramGroupManifest>,
        param: ProgramGroupParam,
        user_token: u64,
    ) -> Result<Self, PsysError> {
        manifest.validate()?;
        param.validate(Some(&manifest))?;

        let size = Self::size_of(&manifest, &param);
        let processes = manifest.programs.iter().map(Process::new).collect();
        let terminals = manifest
            .terminals
            .iter()
            .enumerate()
            .map(|(i, t)| Terminal::new(i, t.clone()))
            .collect();

        let raw = NEXT_PRIVATE_TOKEN.fetch_add(1, Ordering::Relaxed);
        let private_token = NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN);

        tracing::debug!(
            group = manifest.id,
            user_token,
            size,
            "created process group"
        );

        Ok(Self {
            state: ProcessGroupState::Created,
            processes,
            terminals,
            user_token,
            private_token,
            resources_attached: false,
            host_owned: true,
            fragment: FragmentState {
                current: 0,
                total: param.fragment_count,
            },
            queue_window: None,
            size,
            manifest,
            param,
            metrics: GroupMetrics::default(),
        })
    }

    // ── Pure queries ────────────────────────────────────────────────

    /// Structural consistency with the manifest/param pair. Pure; no
    /// side effects.
    pub fn is_valid(&self) -> bool {
        self.processes.len() == self.manifest.program_count()
            && self.terminals.len() == self.manifest.terminal_count()
            && self.param.program_count as usize == self.manifest.program_count()
            && self.param.terminal_count as usize == self.manifest.terminal_count()
            && self.fragment.total >= 1
    }

    /// Submit precondition: every data terminal has an attached frame
    /// buffer. Pure; no side effects.
    pub fn can_submit(&self) -> bool {
        self.resources_attached
            && self
                .terminals
                .iter()
                .filter(|t| t.is_data())
                .all(|t| t.attachment().is_some())
    }

    /// Dispatch precondition: every enabled process has acquired its
    /// resources. Pure; no side effects.
    pub fn can_run(&self) -> bool {
        self.enabled_processes().all(Process::is_resource_acquired)
    }

    /// Joint precondition for enqueuing a buffer set: group resources
    /// attached and every buffer matches its terminal descriptor. Pure;
    /// no side effects.
    pub fn can_enqueue_buffer_set(&self, buffers: &BufferSet) -> bool {
        self.resources_attached && self.check_buffer_set(buffers).is_ok()
    }

    /// Validates a buffer set against the terminal descriptors.
    pub fn check_buffer_set(&self, buffers: &BufferSet) -> Result<(), PsysError> {
        for (terminal_id, _) in buffers.iter() {
            if self.terminals.iter().all(|t| t.id() != *terminal_id) {
                return Err(PsysError::NoSuchTerminal(*terminal_id));
            }
        }
        for t in self.terminals.iter().filter(|t| t.is_data()) {
            let buffer = buffers
                .buffer(t.id())
                .ok_or(PsysError::ResourcesNotAttached)?;
            if buffer.len != t.required_bytes() {
                return Err(PsysError::BufferShapeMismatch {
                    terminal: t.id(),
                    expected: t.required_bytes(),
                    actual: buffer.len,
                });
            }
        }
        Ok(())
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn state(&self) -> ProcessGroupState {
        self.state
    }

    /// Recorded byte size; equals `size_of(manifest, param)`.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn user_token(&self) -> u64 {
        self.user_token
    }

    pub fn private_token(&self) -> NonZeroU64 {
        self.private_token
    }

    pub fn manifest(&self) -> &ProgramGroupManifest {
        &self.manifest
    }

    pub fn param(&self) -> &ProgramGroupParam {
        &self.param
    }

    pub fn resources_attached(&self) -> bool {
        self.resources_attached
    }

    /// Whether the host context still owns the group (cleared by
    /// DISOWN).
    pub fn is_host_owned(&self) -> bool {
        self.host_owned
    }

    pub fn fragment_state(&self) -> FragmentState {
        self.fragment
    }

    pub fn metrics(&self) -> &GroupMetrics {
        &self.metrics
    }

    pub(crate) fn metrics_mut(&mut self) -> &mut GroupMetrics {
        &mut self.metrics
    }

    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    pub fn terminals(&self) -> &[Terminal] {
        &self.terminals
    }

    /// The process for a program id.
    pub fn process_mut(&mut self, program_id: u8) -> Result<&mut Process, PsysError> {
        self.processes
            .iter_mut()
            .find(|p| p.program_id() == program_id)
            .ok_or(PsysError::NoSuchProcess(program_id))
    }

    /// Processes whose kernel bit is set in the enable bitmap.
    pub fn enabled_processes(&self) -> impl Iterator<Item = &Process> {
        self.processes
            .iter()
            .filter(|p| self.param.is_kernel_enabled(p.program_id()))
    }

    fn enabled_processes_mut(&mut self) -> impl Iterator<Item = &mut Process> {
        let param = self.param;
        self.processes
            .iter_mut()
            .filter(move |p| param.is_kernel_enabled(p.program_id()))
    }

    /// The dedicated-queue window, if the scheduler assigned one.
    pub fn queue_window(&self) -> Option<QueueWindow> {
        self.queue_window
    }

    pub(crate) fn assign_queue_window(&mut self, window: QueueWindow) {
        self.queue_window = Some(window);
    }

    // ── Commands ────────────────────────────────────────────────────

    fn reject(&self, command: &'static str) -> PsysError {
        PsysError::InvalidTransition {
            entity: "process group",
            from: self.state.as_str(),
            command,
        }
    }

    /// ATTACH: binds external frame buffers to the data terminals.
    /// Accepted before submission and after a stop; every data terminal
    /// must receive a buffer whose size matches its descriptor.
    pub fn attach(&mut self, buffers: &BufferSet) -> Result<(), PsysError> {
        if !matches!(
            self.state,
            ProcessGroupState::Created | ProcessGroupState::Ready | ProcessGroupState::Stopped
        ) {
            return Err(self.reject("ATTACH"));
        }

        // Validate everything before mutating anything.
        self.check_buffer_set(buffers)?;

        for t in self.terminals.iter_mut() {
            if let Some(buffer) = buffers.buffer(t.id()) {
                t.attach(buffer);
            }
        }
        self.resources_attached = true;
        tracing::debug!(group = self.manifest.id, "attached external resources");
        Ok(())
    }

    /// DETACH: releases external buffers. Only legal while the group is
    /// not executing (STOP's post-condition makes this safe).
    pub fn detach(&mut self) -> Result<(), PsysError> {
        if !matches!(
            self.state,
            ProcessGroupState::Created | ProcessGroupState::Ready | ProcessGroupState::Stopped
        ) {
            return Err(self.reject("DETACH"));
        }
        for t in self.terminals.iter_mut() {
            t.detach();
        }
        self.resources_attached = false;
        Ok(())
    }

    /// SUBMIT: `Created/Ready → Ready`, handing the group to the
    /// scheduler. Requires every external resource attached.
    pub fn submit(&mut self) -> Result<(), PsysError> {
        if !matches!(
            self.state,
            ProcessGroupState::Created | ProcessGroupState::Ready
        ) {
            return Err(self.reject("SUBMIT"));
        }
        if !self.can_submit() {
            return Err(PsysError::ResourcesNotAttached);
        }
        self.state = ProcessGroupState::Ready;
        tracing::info!(group = self.manifest.id, "submitted");
        Ok(())
    }

    /// START: `Ready → Started`, dispatching to the cell domain.
    /// Enabled processes that have acquired resources move with it.
    pub fn start(&mut self) -> Result<(), PsysError> {
        if self.state != ProcessGroupState::Ready {
            return Err(self.reject("START"));
        }
        for p in self.enabled_processes_mut() {
            if p.state() == ProcessState::Ready {
                p.start()?;
            }
        }
        self.state = ProcessGroupState::Started;
        tracing::info!(group = self.manifest.id, "started");
        Ok(())
    }

    /// DISOWN: transfers ownership of a started group to the firmware.
    pub fn disown(&mut self) -> Result<(), PsysError> {
        if !matches!(
            self.state,
            ProcessGroupState::Started | ProcessGroupState::Running
        ) || !self.host_owned
        {
            return Err(self.reject("DISOWN"));
        }
        self.host_owned = false;
        Ok(())
    }

    /// RUN: `Started/Running → Running`, beginning a frame. Rejected
    /// unless every enabled process has already acquired its resources.
    pub fn run(&mut self) -> Result<(), PsysError> {
        if !matches!(
            self.state,
            ProcessGroupState::Started | ProcessGroupState::Running
        ) {
            return Err(self.reject("RUN"));
        }
        if let Some(p) = self
            .enabled_processes()
            .find(|p| !p.is_resource_acquired())
        {
            return Err(PsysError::ResourcesNotAcquired {
                process: p.program_id(),
            });
        }
        for p in self.enabled_processes_mut() {
            if p.state() == ProcessState::Started {
                p.load()?;
            }
        }
        self.fragment.current = 0;
        self.state = ProcessGroupState::Running;
        tracing::info!(group = self.manifest.id, "running");
        Ok(())
    }

    /// STOP: graceful stop after the current frame. Post-condition:
    /// external resources may be safely detached.
    pub fn stop(&mut self) -> Result<(), PsysError> {
        if !matches!(
            self.state,
            ProcessGroupState::Started
                | ProcessGroupState::Running
                | ProcessGroupState::Blocked
                | ProcessGroupState::Stalled
        ) {
            return Err(self.reject("STOP"));
        }
        for p in self.processes.iter_mut() {
            p.force_stop();
        }
        self.state = ProcessGroupState::Stopped;
        tracing::info!(group = self.manifest.id, "stopped");
        Ok(())
    }

    /// SUSPEND: `Running → Blocked` at the next fragment boundary.
    pub fn suspend(&mut self) -> Result<(), PsysError> {
        if self.state != ProcessGroupState::Running {
            return Err(self.reject("SUSPEND"));
        }
        for p in self.enabled_processes_mut() {
            if p.state() == ProcessState::Running {
                p.suspend()?;
            }
        }
        self.state = ProcessGroupState::Blocked;
        Ok(())
    }

    /// RESUME: `Blocked → Running`.
    pub fn resume(&mut self) -> Result<(), PsysError> {
        if self.state != ProcessGroupState::Blocked {
            return Err(self.reject("RESUME"));
        }
        for p in self.enabled_processes_mut() {
            if p.state() == ProcessState::Suspended {
                p.resume()?;
            }
        }
        self.state = ProcessGroupState::Running;
        Ok(())
    }

    /// ABORT: the cancellation primitive. Accepted from any
    /// non-terminal state; forces every process toward `Stopped`
    /// without completing in-flight work.
    pub fn abort(&mut self) -> Result<(), PsysError> {
        if matches!(
            self.state,
            ProcessGroupState::Stopped | ProcessGroupState::Error
        ) {
            return Err(self.reject("ABORT"));
        }
        for p in self.processes.iter_mut() {
            p.force_stop();
        }
        self.state = ProcessGroupState::Stopped;
        tracing::warn!(group = self.manifest.id, "aborted");
        Ok(())
    }

    /// RESET: `Stopped/Error → Created`, discarding per-run state
    /// (process states, bindings, fragment progress, metrics) while
    /// preserving the manifest binding and terminal attachments.
    pub fn reset(&mut self) -> Result<(), PsysError> {
        if !matches!(
            self.state,
            ProcessGroupState::Stopped | ProcessGroupState::Error
        ) {
            return Err(self.reject("RESET"));
        }
        for p in self.processes.iter_mut() {
            p.reset();
        }
        self.fragment = FragmentState {
            current: 0,
            total: self.param.fragment_count,
        };
        self.metrics.clear();
        self.state = ProcessGroupState::Created;
        tracing::info!(group = self.manifest.id, "reset");
        Ok(())
    }

    /// Marks a liveness failure observed by the controller. The usual
    /// follow-up is ABORT.
    pub fn mark_stalled(&mut self) -> Result<(), PsysError> {
        if self.state != ProcessGroupState::Running {
            return Err(self.reject("STALL"));
        }
        self.state = ProcessGroupState::Stalled;
        tracing::warn!(group = self.manifest.id, "stalled");
        Ok(())
    }

    /// Marks a fatal validation or hardware failure. Reachable from any
    /// state; never fails.
    pub fn fail(&mut self) {
        for p in self.processes.iter_mut() {
            p.fail();
        }
        self.state = ProcessGroupState::Error;
        tracing::error!(group = self.manifest.id, "entered error state");
    }

    /// Advances fragment progress by one; returns `true` when the frame
    /// is complete.
    pub fn advance_fragment(&mut self) -> bool {
        if self.fragment.current < self.fragment.total {
            self.fragment.current += 1;
        }
        self.fragment.current == self.fragment.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FrameBuffer;
    use resource_model::CellId;

    fn manifest() -> Arc<ProgramGroupManifest> {
        Arc::new(
            ProgramGroupManifest::from_json(
                r#"{
                    "id": 1,
                    "name": "test_pipe",
                    "programs": [{ "id": 0, "terminal_dependencies": [0, 1] }],
                    "terminals": [
                        {
                            "id": 0,
                            "terminal_type": "data_in",
                            "attributes": {
                                "category": "load", "direction": "in",
                                "rate": "per_frame", "buffer_type": "image"
                            },
                            "frame_format": { "width": 64, "height": 32, "bits_per_element": 8 }
                        },
                        {
                            "id": 1,
                            "terminal_type": "data_out",
                            "attributes": {
                                "category": "connect", "direction": "out",
                                "rate": "per_frame", "buffer_type": "image"
                            },
                            "frame_format": { "width": 64, "height": 32, "bits_per_element": 8 }
                        }
                    ]
                }"#,
            )
            .unwrap(),
        )
    }

    fn group() -> ProcessGroup {
        let m = manifest();
        let param = ProgramGroupParam::for_manifest(&m);
        ProcessGroup::create(m, param, 0xABCD).unwrap()
    }

    fn buffers() -> BufferSet {
        BufferSet::new()
            .with_buffer(
                0,
                FrameBuffer {
                    handle: 1,
                    len: 64 * 32,
                },
            )
            .with_buffer(
                1,
                FrameBuffer {
                    handle: 2,
                    len: 64 * 32,
                },
            )
    }

    fn acquire_all(g: &mut ProcessGroup) {
        let p = g.process_mut(0).unwrap();
        p.bindings_mut().set_cell(CellId::new(0).unwrap()).unwrap();
        p.acquire().unwrap();
    }

    #[test]
    fn test_size_roundtrip() {
        let m = manifest();
        let param = ProgramGroupParam::for_manifest(&m);
        let size = ProcessGroup::size_of(&m, &param);
        let g = ProcessGroup::create(m, param, 1).unwrap();
        assert_eq!(g.size(), size);
    }

    #[test]
    fn test_private_tokens_nonzero_and_distinct() {
        let a = group();
        let b = group();
        assert_ne!(a.private_token(), b.private_token());
        assert_eq!(a.user_token(), 0xABCD);
    }

    #[test]
    fn test_submit_requires_attachment() {
        let mut g = group();
        assert!(!g.can_submit());
        assert!(matches!(g.submit(), Err(PsysError::ResourcesNotAttached)));
        assert_eq!(g.state(), ProcessGroupState::Created);

        g.attach(&buffers()).unwrap();
        assert!(g.can_submit());
        g.submit().unwrap();
        assert_eq!(g.state(), ProcessGroupState::Ready);
    }

    #[test]
    fn test_attach_rejects_shape_mismatch() {
        let mut g = group();
        let bad = BufferSet::new()
            .with_buffer(
                0,
                FrameBuffer {
                    handle: 1,
                    len: 10,
                },
            )
            .with_buffer(
                1,
                FrameBuffer {
                    handle: 2,
                    len: 64 * 32,
                },
            );
        assert!(matches!(
            g.attach(&bad),
            Err(PsysError::BufferShapeMismatch {
                terminal: 0,
                expected: 2048,
                actual: 10,
            })
        ));
        assert!(!g.resources_attached());
        assert!(g.terminals()[0].attachment().is_none());
    }

    #[test]
    fn test_attach_rejects_unknown_terminal() {
        let mut g = group();
        let bad = buffers().with_buffer(9, FrameBuffer { handle: 3, len: 1 });
        assert!(matches!(g.attach(&bad), Err(PsysError::NoSuchTerminal(9))));
    }

    #[test]
    fn test_run_guard() {
        let mut g = group();
        g.attach(&buffers()).unwrap();
        g.submit().unwrap();
        g.start().unwrap();
        // No process has acquired resources yet.
        assert!(!g.can_run());
        assert!(matches!(
            g.run(),
            Err(PsysError::ResourcesNotAcquired { process: 0 })
        ));
        assert_eq!(g.state(), ProcessGroupState::Started);
    }

    #[test]
    fn test_happy_path() {
        let mut g = group();
        g.attach(&buffers()).unwrap();
        acquire_all(&mut g);
        g.submit().unwrap();
        assert_eq!(g.state(), ProcessGroupState::Ready);
        g.start().unwrap();
        g.run().unwrap();
        assert_eq!(g.state(), ProcessGroupState::Running);
        assert_eq!(g.processes()[0].state(), ProcessState::Running);
        g.stop().unwrap();
        assert_eq!(g.state(), ProcessGroupState::Stopped);
        // Post-condition of STOP: detach is legal.
        g.detach().unwrap();
        assert!(!g.resources_attached());
    }

    #[test]
    fn test_suspend_resume() {
        let mut g = group();
        g.attach(&buffers()).unwrap();
        acquire_all(&mut g);
        g.submit().unwrap();
        g.start().unwrap();
        g.run().unwrap();
        g.suspend().unwrap();
        assert_eq!(g.state(), ProcessGroupState::Blocked);
        assert_eq!(g.processes()[0].state(), ProcessState::Suspended);
        g.resume().unwrap();
        assert_eq!(g.state(), ProcessGroupState::Running);
    }

    #[test]
    fn test_abort_mid_run_then_reset() {
        let mut g = group();
        g.attach(&buffers()).unwrap();
        acquire_all(&mut g);
        g.submit().unwrap();
        g.start().unwrap();
        g.run().unwrap();

        g.abort().unwrap();
        assert_eq!(g.state(), ProcessGroupState::Stopped);
        assert_eq!(g.processes()[0].state(), ProcessState::Stopped);

        // RUN stays rejected until RESET.
        assert!(g.run().is_err());
        g.reset().unwrap();
        assert_eq!(g.state(), ProcessGroupState::Created);
        assert_eq!(g.processes()[0].state(), ProcessState::Created);
        assert!(g.processes()[0].bindings().is_empty());
    }

    #[test]
    fn test_abort_rejected_from_terminal_states() {
        let mut g = group();
        g.fail();
        assert!(g.abort().is_err());
        g.reset().unwrap();
        assert_eq!(g.state(), ProcessGroupState::Created);
    }

    #[test]
    fn test_detach_rejected_while_running() {
        let mut g = group();
        g.attach(&buffers()).unwrap();
        acquire_all(&mut g);
        g.submit().unwrap();
        g.start().unwrap();
        g.run().unwrap();
        assert!(g.detach().is_err());
        assert!(g.resources_attached());
    }

    #[test]
    fn test_stall_then_abort() {
        let mut g = group();
        g.attach(&buffers()).unwrap();
        acquire_all(&mut g);
        g.submit().unwrap();
        g.start().unwrap();
        g.run().unwrap();
        g.mark_stalled().unwrap();
        assert_eq!(g.state(), ProcessGroupState::Stalled);
        g.abort().unwrap();
        assert_eq!(g.state(), ProcessGroupState::Stopped);
    }

    #[test]
    fn test_disown() {
        let mut g = group();
        g.attach(&buffers()).unwrap();
        acquire_all(&mut g);
        g.submit().unwrap();
        assert!(g.disown().is_err());
        g.start().unwrap();
        g.disown().unwrap();
        assert!(!g.is_host_owned());
        assert!(g.disown().is_err());
    }

    #[test]
    fn test_fragment_progress() {
        let m = manifest();
        let param = ProgramGroupParam::for_manifest(&m).with_fragments(3);
        let mut g = ProcessGroup::create(m, param, 1).unwrap();
        assert!(!g.advance_fragment());
        assert!(!g.advance_fragment());
        assert!(g.advance_fragment());
        assert_eq!(g.fragment_state().current, 3);
    }

    #[test]
    fn test_is_valid() {
        let g = group();
        assert!(g.is_valid());
    }

    #[test]
    fn test_can_enqueue_buffer_set() {
        let mut g = group();
        let set = buffers();
        // Joint precondition: attachment AND shape agreement.
        assert!(!g.can_enqueue_buffer_set(&set));
        g.attach(&set).unwrap();
        assert!(g.can_enqueue_buffer_set(&set));

        let bad = BufferSet::new()
            .with_buffer(0, FrameBuffer { handle: 1, len: 1 })
            .with_buffer(
                1,
                FrameBuffer {
                    handle: 2,
                    len: 64 * 32,
                },
            );
        assert!(!g.can_enqueue_buffer_set(&bad));
    }
}
