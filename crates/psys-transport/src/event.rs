// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The 128-bit event record returned from cell to host.
//!
//! Wire layout:
//!
//! ```text
//! 127              64 63              32 31     16 15      0
//! ┌──────────────────┬──────────────────┬─────────┬─────────┐
//! │   caller token   │  context handle  │  opcode │  status │
//! └──────────────────┴──────────────────┴─────────┴─────────┘
//! ```
//!
//! The opcode field echoes the command that produced the event, so the
//! host can correlate completions without extra bookkeeping.

use crate::{CommandOp, TransportError};

/// The closed status taxonomy carried by event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum EventStatus {
    /// The command completed successfully.
    Success = 0x0000,
    /// Unhandled or unclassified failure.
    UnknownError = 0x0001,
    /// A referenced remote object was not found.
    ObjectNotFound = 0x0002,
    /// A referenced remote object exceeds its size limit.
    ObjectTooLarge = 0x0003,
    /// DMA/transport failure while loading an object to the cell.
    LoadTransferFailed = 0x0004,
    /// The firmware package directory is missing.
    PackageDirMissing = 0x0005,
    /// A frame failed to load.
    FrameLoadFailed = 0x0006,
    /// A fragment failed to load.
    FragmentLoadFailed = 0x0007,
    /// The process group contains no processes.
    EmptyGroup = 0x0008,
    /// A process failed to initialise on its cell.
    ProcessInitFailed = 0x0009,
    /// The group was aborted at the caller's request.
    Aborted = 0x000A,
    /// A null process group handle was submitted.
    NullGroup = 0x000B,
    /// The process group failed validation.
    ValidationFailed = 0x000C,
    /// An invalid frame was detected upstream of the group.
    InvalidFrame = 0x000D,
}

impl EventStatus {
    /// Decodes a status from its wire value.
    pub fn from_raw(raw: u16) -> Result<Self, TransportError> {
        match raw {
            0x0000 => Ok(EventStatus::Success),
            0x0001 => Ok(EventStatus::UnknownError),
            0x0002 => Ok(EventStatus::ObjectNotFound),
            0x0003 => Ok(EventStatus::ObjectTooLarge),
            0x0004 => Ok(EventStatus::LoadTransferFailed),
            0x0005 => Ok(EventStatus::PackageDirMissing),
            0x0006 => Ok(EventStatus::FrameLoadFailed),
            0x0007 => Ok(EventStatus::FragmentLoadFailed),
            0x0008 => Ok(EventStatus::EmptyGroup),
            0x0009 => Ok(EventStatus::ProcessInitFailed),
            0x000A => Ok(EventStatus::Aborted),
            0x000B => Ok(EventStatus::NullGroup),
            0x000C => Ok(EventStatus::ValidationFailed),
            0x000D => Ok(EventStatus::InvalidFrame),
            other => Err(TransportError::UnknownStatus(other)),
        }
    }

    /// Returns `true` for genuine failures. `Success` is not one, and
    /// neither is `Aborted`: an abort is a caller request honoured, not
    /// a fault.
    pub fn is_failure(self) -> bool {
        !matches!(self, EventStatus::Success | EventStatus::Aborted)
    }
}

/// A fixed-width event record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    /// Outcome of the echoed command.
    pub status: EventStatus,
    /// The command opcode this event answers.
    pub op: CommandOp,
    /// Handle identifying the originating process group or buffer set.
    pub context: u32,
    /// Caller-supplied token, returned verbatim.
    pub token: u64,
}

impl Event {
    pub fn new(status: EventStatus, op: CommandOp, context: u32, token: u64) -> Self {
        Self {
            status,
            op,
            context,
            token,
        }
    }

    /// Encodes the record into its 128-bit wire form.
    pub fn encode(self) -> u128 {
        (self.status as u128)
            | ((self.op as u128) << 16)
            | ((self.context as u128) << 32)
            | ((self.token as u128) << 64)
    }

    /// Decodes a 128-bit wire record.
    pub fn decode(raw: u128) -> Result<Self, TransportError> {
        Ok(Self {
            status: EventStatus::from_raw(raw as u16)?,
            op: CommandOp::from_raw((raw >> 16) as u16)?,
            context: (raw >> 32) as u32,
            token: (raw >> 64) as u64,
        })
    }
}
