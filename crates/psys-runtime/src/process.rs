// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Processes: the per-program execution units inside a process group.
//!
//! A process mirrors the group state machine at finer grain. Resource
//! acquisition (cell, internal memory, device channels) is a
//! precondition of dispatch: the group rejects RUN until every enabled
//! process has acquired, so `load` never allocates anything itself.

use crate::PsysError;
use pg_manifest::ProgramManifest;
use resource_model::ResourceBindings;

/// Lifecycle states of one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// Built from the manifest; no resources bound.
    Created,
    /// Resources acquired; eligible for dispatch.
    Ready,
    /// Dispatched to its cell.
    Started,
    /// Executing a fragment.
    Running,
    /// Execution finished or was stopped.
    Stopped,
    /// Paused at a fragment boundary.
    Suspended,
    /// Fatal failure; only a group RESET recovers.
    Error,
}

impl ProcessState {
    pub fn as_str(self) -> &'static str {
        match self {
            ProcessState::Created => "CREATED",
            ProcessState::Ready => "READY",
            ProcessState::Started => "STARTED",
            ProcessState::Running => "RUNNING",
            ProcessState::Stopped => "STOPPED",
            ProcessState::Suspended => "SUSPENDED",
            ProcessState::Error => "ERROR",
        }
    }
}

/// One execution unit of a process group.
#[derive(Debug, Clone)]
pub struct Process {
    program_id: u8,
    preferred_cell: Option<u8>,
    state: ProcessState,
    bindings: ResourceBindings,
}

impl Process {
    /// Builds a process from its program manifest entry.
    pub fn new(program: &ProgramManifest) -> Self {
        Self {
            program_id: program.id,
            preferred_cell: program.preferred_cell,
            state: ProcessState::Created,
            bindings: ResourceBindings::new(),
        }
    }

    pub fn program_id(&self) -> u8 {
        self.program_id
    }

    pub fn preferred_cell(&self) -> Option<u8> {
        self.preferred_cell
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    /// Read access to the resource bindings.
    pub fn bindings(&self) -> &ResourceBindings {
        &self.bindings
    }

    /// Write access to the resource bindings. Binding is host-side work
    /// done before `acquire`; the state machine does not gate it.
    pub fn bindings_mut(&mut self) -> &mut ResourceBindings {
        &mut self.bindings
    }

    /// Returns whether the process holds the resources dispatch needs:
    /// a bound cell, in a state where the bindings are live.
    pub fn is_resource_acquired(&self) -> bool {
        self.bindings.cell().is_some()
            && !matches!(self.state, ProcessState::Created | ProcessState::Error)
    }

    fn reject(&self, command: &'static str) -> PsysError {
        PsysError::InvalidTransition {
            entity: "process",
            from: self.state.as_str(),
            command,
        }
    }

    /// ACQUIRE: `Created → Ready`. Requires a cell already bound.
    pub fn acquire(&mut self) -> Result<(), PsysError> {
        if self.state != ProcessState::Created {
            return Err(self.reject("ACQUIRE"));
        }
        if self.bindings.cell().is_none() {
            return Err(PsysError::ResourcesNotAcquired {
                process: self.program_id,
            });
        }
        self.state = ProcessState::Ready;
        Ok(())
    }

    /// RELEASE: `Ready → Created`, dropping every binding.
    pub fn release(&mut self) -> Result<(), PsysError> {
        if self.state != ProcessState::Ready {
            return Err(self.reject("RELEASE"));
        }
        self.bindings.clear_all();
        self.state = ProcessState::Created;
        Ok(())
    }

    /// START: `Ready → Started`.
    pub fn start(&mut self) -> Result<(), PsysError> {
        if self.state != ProcessState::Ready {
            return Err(self.reject("START"));
        }
        self.state = ProcessState::Started;
        Ok(())
    }

    /// LOAD: `Started → Running`.
    pub fn load(&mut self) -> Result<(), PsysError> {
        if self.state != ProcessState::Started {
            return Err(self.reject("LOAD"));
        }
        self.state = ProcessState::Running;
        Ok(())
    }

    /// STOP: `Started/Running/Suspended → Stopped`.
    pub fn stop(&mut self) -> Result<(), PsysError> {
        match self.state {
            ProcessState::Started | ProcessState::Running | ProcessState::Suspended => {
                self.state = ProcessState::Stopped;
                Ok(())
            }
            _ => Err(self.reject("STOP")),
        }
    }

    /// SUSPEND: `Running → Suspended`.
    pub fn suspend(&mut self) -> Result<(), PsysError> {
        if self.state != ProcessState::Running {
            return Err(self.reject("SUSPEND"));
        }
        self.state = ProcessState::Suspended;
        Ok(())
    }

    /// RESUME: `Suspended → Running`.
    pub fn resume(&mut self) -> Result<(), PsysError> {
        if self.state != ProcessState::Suspended {
            return Err(self.reject("RESUME"));
        }
        self.state = ProcessState::Running;
        Ok(())
    }

    /// Forces the process toward a stop, from any state. Used by group
    /// ABORT; never fails.
    pub fn force_stop(&mut self) {
        if self.state != ProcessState::Error {
            self.state = ProcessState::Stopped;
        }
    }

    /// Marks a fatal failure.
    pub fn fail(&mut self) {
        self.state = ProcessState::Error;
    }

    /// Returns the process to `Created`, dropping bindings. Used by
    /// group RESET.
    pub fn reset(&mut self) {
        self.bindings.clear_all();
        self.state = ProcessState::Created;
    }
}
