// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Terminal manifests: typed data/parameter ports of a program group.
//!
//! Attributes are held as a plain struct in memory. The firmware wire
//! layout packs them into a 16-bit field (category:1, direction:1,
//! rate-of-update:2, buffer-type:2, upper bits zero); that layout only
//! exists at the serialization boundary via [`TerminalAttributes::pack`]
//! and [`TerminalAttributes::unpack`].

use crate::ManifestError;

/// The kind of port a terminal is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalType {
    /// Frame data flowing into the group.
    DataIn,
    /// Frame data flowing out of the group.
    DataOut,
    /// Algorithm parameters loaded before execution.
    Param,
    /// Persistent program state carried across executions.
    State,
    /// One-time program control initialisation.
    ProgramControlInit,
}

impl TerminalType {
    /// Returns `true` for the frame-carrying terminal types.
    pub fn is_data(self) -> bool {
        matches!(self, TerminalType::DataIn | TerminalType::DataOut)
    }
}

/// Load (contents DMA'd in) vs. connect (wired to another stage).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Load,
    Connect,
}

/// Data direction relative to the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    In,
    Out,
}

/// How often the terminal's contents change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateOfUpdate {
    /// Fixed for the lifetime of the group.
    Static,
    /// Updated once per frame.
    PerFrame,
    /// Updated once per fragment.
    PerFragment,
}

/// What the terminal's buffer carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferType {
    Image,
    Metadata,
}

/// The attribute set of one terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TerminalAttributes {
    pub category: Category,
    pub direction: Direction,
    pub rate: RateOfUpdate,
    pub buffer_type: BufferType,
}

impl TerminalAttributes {
    /// Packs the attributes into the 16-bit wire layout:
    /// bit 0 category, bit 1 direction, bits 2–3 rate of update,
    /// bits 4–5 buffer type, bits 6–15 zero.
    pub fn pack(self) -> u16 {
        let cat = match self.category {
            Category::Load => 0,
            Category::Connect => 1,
        };
        let dir = match self.direction {
            Direction::In => 0,
            Direction::Out => 1,
        };
        let rou = match self.rate {
            RateOfUpdate::Static => 0,
            RateOfUpdate::PerFrame => 1,
            RateOfUpdate::PerFragment => 2,
        };
        let buf = match self.buffer_type {
            BufferType::Image => 0,
            BufferType::Metadata => 1,
        };
        cat | (dir << 1) | (rou << 2) | (buf << 4)
    }

    /// Unpacks the 16-bit wire layout, rejecting out-of-range field
    /// values and non-zero reserved bits.
    pub fn unpack(raw: u16) -> Result<Self, ManifestError> {
        if raw & !0x3F != 0 {
            return Err(ManifestError::BadAttributeField {
                field: "reserved",
                value: raw,
            });
        }
        let rate = match (raw >> 2) & 0x3 {
            0 => RateOfUpdate::Static,
            1 => RateOfUpdate::PerFrame,
            2 => RateOfUpdate::PerFragment,
            v => {
                return Err(ManifestError::BadAttributeField {
                    field: "rate_of_update",
                    value: v,
                })
            }
        };
        let buffer_type = match (raw >> 4) & 0x3 {
            0 => BufferType::Image,
            1 => BufferType::Metadata,
            v => {
                return Err(ManifestError::BadAttributeField {
                    field: "buffer_type",
                    value: v,
                })
            }
        };
        Ok(Self {
            category: if raw & 0x1 == 0 {
                Category::Load
            } else {
                Category::Connect
            },
            direction: if raw & 0x2 == 0 {
                Direction::In
            } else {
                Direction::Out
            },
            rate,
            buffer_type,
        })
    }
}

/// Frame geometry and element width of a data terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameFormat {
    /// Frame width in elements.
    pub width: u32,
    /// Frame height in lines.
    pub height: u32,
    /// Bits per element (e.g. 8, 10, 16).
    pub bits_per_element: u32,
}

impl FrameFormat {
    /// Returns the byte size of one frame, lines rounded to whole bytes.
    pub fn frame_bytes(&self) -> usize {
        let bytes_per_line = (self.width * self.bits_per_element).div_ceil(8) as usize;
        bytes_per_line * self.height as usize
    }
}

/// One terminal entry in a [`crate::ProgramGroupManifest`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TerminalManifest {
    /// Unique terminal id within the group.
    pub id: u8,
    /// Port kind.
    pub terminal_type: TerminalType,
    /// Attribute set (category, direction, rate, buffer type).
    pub attributes: TerminalAttributes,
    /// Optional associated terminal (e.g. the param terminal feeding a
    /// data terminal). Default: no association.
    #[serde(default)]
    pub associated_terminal: Option<u8>,
    /// Number of cached parameter sections.
    #[serde(default)]
    pub cached_sections: u8,
    /// Number of sliced parameter sections.
    #[serde(default)]
    pub sliced_sections: u8,
    /// Number of spatial parameter sections.
    #[serde(default)]
    pub spatial_sections: u8,
    /// Frame geometry for data terminals.
    pub frame_format: FrameFormat,
}

impl TerminalManifest {
    /// Total parameter sections across all three section kinds.
    pub fn total_sections(&self) -> usize {
        self.cached_sections as usize
            + self.sliced_sections as usize
            + self.spatial_sections as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs() -> TerminalAttributes {
        TerminalAttributes {
            category: Category::Connect,
            direction: Direction::Out,
            rate: RateOfUpdate::PerFragment,
            buffer_type: BufferType::Metadata,
        }
    }

    #[test]
    fn test_pack_layout() {
        // connect=1, out=1<<1, per_fragment=2<<2, metadata=1<<4.
        assert_eq!(attrs().pack(), 0b01_10_1_1);
    }

    #[test]
    fn test_pack_unpack_roundtrip() {
        let a = attrs();
        assert_eq!(TerminalAttributes::unpack(a.pack()).unwrap(), a);

        let b = TerminalAttributes {
            category: Category::Load,
            direction: Direction::In,
            rate: RateOfUpdate::Static,
            buffer_type: BufferType::Image,
        };
        assert_eq!(b.pack(), 0);
        assert_eq!(TerminalAttributes::unpack(0).unwrap(), b);
    }

    #[test]
    fn test_unpack_rejects_bad_rate() {
        // rate-of-update value 3 is undefined.
        let raw = 0b11 << 2;
        assert!(matches!(
            TerminalAttributes::unpack(raw),
            Err(ManifestError::BadAttributeField {
                field: "rate_of_update",
                value: 3,
            })
        ));
    }

    #[test]
    fn test_unpack_rejects_bad_buffer_type() {
        let raw = 0b10 << 4;
        assert!(matches!(
            TerminalAttributes::unpack(raw),
            Err(ManifestError::BadAttributeField {
                field: "buffer_type",
                ..
            })
        ));
    }

    #[test]
    fn test_unpack_rejects_reserved_bits() {
        assert!(TerminalAttributes::unpack(0x40).is_err());
        assert!(TerminalAttributes::unpack(0x8000).is_err());
    }

    #[test]
    fn test_frame_bytes() {
        let f = FrameFormat {
            width: 640,
            height: 480,
            bits_per_element: 8,
        };
        assert_eq!(f.frame_bytes(), 640 * 480);

        // 10-bit elements round lines up to whole bytes.
        let f10 = FrameFormat {
            width: 12,
            height: 2,
            bits_per_element: 10,
        };
        assert_eq!(f10.frame_bytes(), 15 * 2);
    }

    #[test]
    fn test_terminal_type_is_data() {
        assert!(TerminalType::DataIn.is_data());
        assert!(TerminalType::DataOut.is_data());
        assert!(!TerminalType::Param.is_data());
        assert!(!TerminalType::State.is_data());
    }

    #[test]
    fn test_total_sections() {
        let t = TerminalManifest {
            id: 0,
            terminal_type: TerminalType::Param,
            attributes: attrs(),
            associated_terminal: None,
            cached_sections: 2,
            sliced_sections: 1,
            spatial_sections: 3,
            frame_format: FrameFormat {
                width: 0,
                height: 0,
                bits_per_element: 8,
            },
        };
        assert_eq!(t.total_sections(), 6);
    }
}
