// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Sub-buffer geometry: block descriptors and the template helper that
//! derives block dimensions from buffer/fragment geometry.

/// Geometry of one sub-buffer: where its blocks live in device memory and
/// how big each block is.
///
/// A sub-buffer holds `capacity` consecutive blocks starting at `offset`;
/// block `i` lives at `offset + i * size`. The queue itself never touches
/// the memory — it only schedules which block index each side may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufBlock {
    /// Byte offset of block 0 in its memory region.
    pub offset: u32,
    /// Size of one block in bytes.
    pub size: u32,
    /// Block width in elements.
    pub width: u32,
    /// Block height in lines.
    pub height: u32,
    /// Line stride in bytes.
    pub stride: u32,
}

impl BufBlock {
    /// Creates a dense (stride == width) block descriptor.
    pub fn new(offset: u32, size: u32, width: u32, height: u32) -> Self {
        Self {
            offset,
            size,
            width,
            height,
            stride: width,
        }
    }

    /// Creates a block descriptor with an explicit line stride.
    pub fn with_stride(offset: u32, size: u32, width: u32, height: u32, stride: u32) -> Self {
        Self {
            offset,
            size,
            width,
            height,
            stride,
        }
    }

    /// Returns the byte offset of block `index` within this sub-buffer.
    pub fn block_offset(&self, index: usize) -> u32 {
        self.offset + index as u32 * self.size
    }
}

/// Block dimensions derived from buffer and fragment geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockDimensions {
    /// Width of one block in elements.
    pub block_width: u32,
    /// Height of one block in lines.
    pub block_height: u32,
}

/// Derives block dimensions for template queue creation.
///
/// A block spans the full buffer width but only one fragment of its
/// height, so a queue of blocks can stream a frame fragment by fragment.
/// The fragment height is clamped to the buffer height, and a fragment
/// height of zero yields whole-buffer blocks.
pub fn calc_block_dimensions(
    buffer_width: u32,
    buffer_height: u32,
    _fragment_width: u32,
    fragment_height: u32,
) -> BlockDimensions {
    let block_height = if fragment_height == 0 {
        buffer_height
    } else {
        fragment_height.min(buffer_height)
    };
    BlockDimensions {
        block_width: buffer_width,
        block_height,
    }
}

impl BlockDimensions {
    /// Builds a dense block descriptor at `offset` from these dimensions,
    /// assuming `bits_per_element` wide elements.
    pub fn to_block(self, offset: u32, bits_per_element: u32) -> BufBlock {
        let bytes_per_line = (self.block_width * bits_per_element).div_ceil(8);
        BufBlock::with_stride(
            offset,
            bytes_per_line * self.block_height,
            self.block_width,
            self.block_height,
            bytes_per_line,
        )
    }
}
