// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The 64-bit command record sent from host to cell.
//!
//! Wire layout (little-endian bit positions):
//!
//! ```text
//! 63                32 31      16 15       0
//! ┌──────────────────┬──────────┬──────────┐
//! │  context handle  │  message │  opcode  │
//! └──────────────────┴──────────┴──────────┘
//! ```

use crate::TransportError;

/// Command opcodes understood by the cell-side scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum CommandOp {
    /// Hand a created, resource-attached group to the scheduler.
    Submit = 0x0001,
    /// Attach external resources (frames) to the group.
    Attach = 0x0002,
    /// Detach external resources from the group.
    Detach = 0x0003,
    /// Begin hardware setup of a submitted group.
    Start = 0x0004,
    /// Transfer ownership of a started group to the firmware.
    Disown = 0x0005,
    /// Execute one frame through a started group.
    Run = 0x0006,
    /// Stop a running group after the current frame completes.
    Stop = 0x0007,
    /// Suspend a running group at the next fragment boundary.
    Suspend = 0x0008,
    /// Resume a suspended group.
    Resume = 0x0009,
    /// Force a group to stop immediately, abandoning work in flight.
    Abort = 0x000A,
    /// Return an errored group to a recoverable state.
    Reset = 0x000B,
    /// Enqueue a buffer set on a persistent group's dedicated queue.
    BufferSetEnqueue = 0x000C,
}

impl CommandOp {
    /// Decodes an opcode from its wire value.
    pub fn from_raw(raw: u16) -> Result<Self, TransportError> {
        match raw {
            0x0001 => Ok(CommandOp::Submit),
            0x0002 => Ok(CommandOp::Attach),
            0x0003 => Ok(CommandOp::Detach),
            0x0004 => Ok(CommandOp::Start),
            0x0005 => Ok(CommandOp::Disown),
            0x0006 => Ok(CommandOp::Run),
            0x0007 => Ok(CommandOp::Stop),
            0x0008 => Ok(CommandOp::Suspend),
            0x0009 => Ok(CommandOp::Resume),
            0x000A => Ok(CommandOp::Abort),
            0x000B => Ok(CommandOp::Reset),
            0x000C => Ok(CommandOp::BufferSetEnqueue),
            other => Err(TransportError::UnknownOpcode(other)),
        }
    }

    /// Returns `true` for opcodes that must travel on the device queue
    /// (state-affecting administrative commands) rather than the shared
    /// command queue.
    pub fn is_administrative(self) -> bool {
        matches!(
            self,
            CommandOp::Stop
                | CommandOp::Suspend
                | CommandOp::Resume
                | CommandOp::Abort
                | CommandOp::Reset
        )
    }
}

impl std::fmt::Display for CommandOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CommandOp::Submit => "SUBMIT",
            CommandOp::Attach => "ATTACH",
            CommandOp::Detach => "DETACH",
            CommandOp::Start => "START",
            CommandOp::Disown => "DISOWN",
            CommandOp::Run => "RUN",
            CommandOp::Stop => "STOP",
            CommandOp::Suspend => "SUSPEND",
            CommandOp::Resume => "RESUME",
            CommandOp::Abort => "ABORT",
            CommandOp::Reset => "RESET",
            CommandOp::BufferSetEnqueue => "BUFFER_SET_ENQUEUE",
        };
        f.write_str(name)
    }
}

/// A fixed-width command record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    /// What to do.
    pub op: CommandOp,
    /// Sub-opcode or small argument (e.g. fragment index for RUN).
    pub message: u16,
    /// Handle identifying the target process group or buffer set.
    pub context: u32,
}

impl Command {
    /// Builds a command with a zero message field.
    pub fn new(op: CommandOp, context: u32) -> Self {
        Self {
            op,
            message: 0,
            context,
        }
    }

    /// Builds a command carrying a sub-opcode/argument.
    pub fn with_message(op: CommandOp, message: u16, context: u32) -> Self {
        Self {
            op,
            message,
            context,
        }
    }

    /// Encodes the record into its 64-bit wire form.
    pub fn encode(self) -> u64 {
        (self.op as u64) | ((self.message as u64) << 16) | ((self.context as u64) << 32)
    }

    /// Decodes a 64-bit wire record.
    pub fn decode(raw: u64) -> Result<Self, TransportError> {
        Ok(Self {
            op: CommandOp::from_raw(raw as u16)?,
            message: (raw >> 16) as u16,
            context: (raw >> 32) as u32,
        })
    }
}
