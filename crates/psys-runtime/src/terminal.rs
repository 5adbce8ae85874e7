// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runtime terminals and buffer sets.
//!
//! A terminal is a typed port instantiated from its manifest entry at
//! group-creation time and fixed thereafter; only its frame-buffer
//! attachment slot changes at runtime. Terminals are addressed by index
//! into the owning group's arena, never by back-pointer.

use pg_manifest::TerminalManifest;

/// An externally managed frame buffer handed to a data terminal.
///
/// The runtime never looks inside frames; it only checks that the byte
/// size a producer hands over matches the terminal descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameBuffer {
    /// Opaque handle from the external buffer manager.
    pub handle: u64,
    /// Buffer size in bytes.
    pub len: usize,
}

/// A runtime port on a process group.
#[derive(Debug, Clone)]
pub struct Terminal {
    index: usize,
    manifest: TerminalManifest,
    attachment: Option<FrameBuffer>,
}

impl Terminal {
    pub(crate) fn new(index: usize, manifest: TerminalManifest) -> Self {
        Self {
            index,
            manifest,
            attachment: None,
        }
    }

    /// Arena index within the owning group.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Terminal id from the manifest.
    pub fn id(&self) -> u8 {
        self.manifest.id
    }

    /// The manifest entry this terminal was built from.
    pub fn manifest(&self) -> &TerminalManifest {
        &self.manifest
    }

    /// Whether this terminal carries frame data.
    pub fn is_data(&self) -> bool {
        self.manifest.terminal_type.is_data()
    }

    /// The byte size a frame buffer for this terminal must have.
    pub fn required_bytes(&self) -> usize {
        self.manifest.frame_format.frame_bytes()
    }

    /// The currently attached frame buffer, if any.
    pub fn attachment(&self) -> Option<FrameBuffer> {
        self.attachment
    }

    pub(crate) fn attach(&mut self, buffer: FrameBuffer) {
        self.attachment = Some(buffer);
    }

    pub(crate) fn detach(&mut self) {
        self.attachment = None;
    }
}

/// Buffers for one execution, one per data terminal.
#[derive(Debug, Clone, Default)]
pub struct BufferSet {
    entries: Vec<(u8, FrameBuffer)>,
}

impl BufferSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a buffer for a terminal id, returning `self` for chaining.
    pub fn with_buffer(mut self, terminal: u8, buffer: FrameBuffer) -> Self {
        self.entries.push((terminal, buffer));
        self
    }

    /// The buffer bound to a terminal id, if present.
    pub fn buffer(&self, terminal: u8) -> Option<FrameBuffer> {
        self.entries
            .iter()
            .find(|(t, _)| *t == terminal)
            .map(|(_, b)| *b)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(u8, FrameBuffer)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pg_manifest::{
        BufferType, Category, Direction, FrameFormat, RateOfUpdate, TerminalAttributes,
        TerminalType,
    };

    fn data_in_manifest() -> TerminalManifest {
        TerminalManifest {
            id: 0,
            terminal_type: TerminalType::DataIn,
            attributes: TerminalAttributes {
                category: Category::Load,
                direction: Direction::In,
                rate: RateOfUpdate::PerFrame,
                buffer_type: BufferType::Image,
            },
            associated_terminal: None,
            cached_sections: 0,
            sliced_sections: 0,
            spatial_sections: 0,
            frame_format: FrameFormat {
                width: 64,
                height: 32,
                bits_per_element: 8,
            },
        }
    }

    #[test]
    fn test_attachment_slot() {
        let mut t = Terminal::new(0, data_in_manifest());
        assert!(t.is_data());
        assert_eq!(t.required_bytes(), 64 * 32);
        assert!(t.attachment().is_none());

        t.attach(FrameBuffer {
            handle: 7,
            len: 2048,
        });
        assert_eq!(t.attachment().map(|b| b.handle), Some(7));
        t.detach();
        assert!(t.attachment().is_none());
    }

    #[test]
    fn test_buffer_set_lookup() {
        let set = BufferSet::new()
            .with_buffer(0, FrameBuffer { handle: 1, len: 10 })
            .with_buffer(2, FrameBuffer { handle: 2, len: 20 });
        assert_eq!(set.len(), 2);
        assert_eq!(set.buffer(2).map(|b| b.len), Some(20));
        assert!(set.buffer(1).is_none());
    }
}
