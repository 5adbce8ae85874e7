// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the process-group runtime.
//!
//! Rejected state transitions are synchronous errors and leave the
//! target unchanged; failures during execution come back asynchronously
//! as transport events and are never retried here.

use bufqueue::QueueError;
use pg_manifest::ManifestError;
use psys_transport::TransportError;
use resource_model::ResourceError;

/// Errors that can occur in the runtime.
#[derive(Debug, thiserror::Error)]
pub enum PsysError {
    /// Manifest loading or validation failed.
    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// A resource-binding operation was rejected.
    #[error("resource error: {0}")]
    Resource(#[from] ResourceError),

    /// A buffer-queue operation was rejected.
    #[error("buffer queue error: {0}")]
    Queue(#[from] QueueError),

    /// A transport operation failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The command is not legal from the entity's current state.
    #[error("{entity}: cannot {command} from state {from}")]
    InvalidTransition {
        entity: &'static str,
        from: &'static str,
        command: &'static str,
    },

    /// SUBMIT issued before external resources were attached.
    #[error("external resources not attached")]
    ResourcesNotAttached,

    /// RUN issued while an enabled process has not acquired resources.
    #[error("process {process} has not acquired its resources")]
    ResourcesNotAcquired { process: u8 },

    /// A buffer in a buffer set does not match its terminal descriptor.
    #[error("buffer for terminal {terminal}: expected {expected} bytes, got {actual}")]
    BufferShapeMismatch {
        terminal: u8,
        expected: usize,
        actual: usize,
    },

    /// No terminal with the given id exists on the group.
    #[error("no such terminal: {0}")]
    NoSuchTerminal(u8),

    /// No process with the given program id exists on the group.
    #[error("no such process: {0}")]
    NoSuchProcess(u8),

    /// No registered group matches the context handle.
    #[error("unknown context handle: {0}")]
    UnknownContext(u32),

    /// All dedicated persistent-group queues are in use.
    #[error("no free persistent-group queue ({capacity} configured)")]
    PpgQueuesExhausted { capacity: u8 },

    /// Reading a configuration file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is malformed.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The configuration is structurally invalid.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
