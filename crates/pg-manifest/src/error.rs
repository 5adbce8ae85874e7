// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for manifest parsing and validation.

/// Errors that can occur while loading or validating manifests.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// Reading the manifest file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The manifest JSON is malformed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The manifest is structurally inconsistent.
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    /// A terminal entry is inconsistent.
    #[error("invalid terminal {terminal}: {detail}")]
    InvalidTerminal { terminal: u8, detail: String },

    /// A program entry is inconsistent.
    #[error("invalid program {program}: {detail}")]
    InvalidProgram { program: u8, detail: String },

    /// A packed terminal-attribute field holds an out-of-range value.
    #[error("bad packed attribute field '{field}': value {value}")]
    BadAttributeField { field: &'static str, value: u16 },

    /// A program group parameter set is inconsistent.
    #[error("invalid param: {0}")]
    InvalidParam(String),
}
