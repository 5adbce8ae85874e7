// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Bounded identifier newtypes for PSYS hardware resources.
//!
//! Each id lives in a small, fixed id space sized by an `N_*` constant.
//! Construction via `new()` rejects out-of-range values, so a held id is
//! always valid — the binding table never has to re-check ranges.

use crate::ResourceError;

/// Number of compute cells in the resource model.
pub const N_CELL_ID: u8 = 16;

/// Number of cell-internal memory types (DMEM, VMEM, BAMEM, ...).
pub const N_MEM_TYPE_ID: u8 = 6;

/// Number of cell-external memory instances.
pub const N_MEM_ID: u8 = 8;

/// Number of DMA/device channels.
pub const N_DEV_CHN_ID: u8 = 8;

macro_rules! bounded_id {
    ($(#[$doc:meta])* $name:ident, $max:expr, $kind:literal) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u8);

        impl $name {
            /// Creates the id, rejecting values outside `0..{N}`.
            pub fn new(raw: u8) -> Result<Self, ResourceError> {
                if raw < $max {
                    Ok(Self(raw))
                } else {
                    Err(ResourceError::InvalidId {
                        kind: $kind,
                        id: raw,
                        max: $max,
                    })
                }
            }

            /// Returns the raw id value.
            pub fn raw(self) -> u8 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}{}", $kind, self.0)
            }
        }
    };
}

bounded_id!(
    /// A schedulable hardware compute unit (fixed-function or programmable).
    CellId, N_CELL_ID, "cell"
);

bounded_id!(
    /// A type of memory internal to a cell (e.g. DMEM, VMEM).
    MemTypeId, N_MEM_TYPE_ID, "mem_type"
);

bounded_id!(
    /// A memory instance external to the cell.
    MemId, N_MEM_ID, "mem"
);

bounded_id!(
    /// A DMA/device channel.
    DevChnId, N_DEV_CHN_ID, "dev_chn"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_range() {
        assert_eq!(CellId::new(0).unwrap().raw(), 0);
        assert_eq!(CellId::new(N_CELL_ID - 1).unwrap().raw(), N_CELL_ID - 1);
        assert_eq!(MemTypeId::new(2).unwrap().raw(), 2);
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(
            CellId::new(N_CELL_ID),
            Err(ResourceError::InvalidId { kind: "cell", .. })
        ));
        assert!(MemTypeId::new(N_MEM_TYPE_ID).is_err());
        assert!(MemId::new(N_MEM_ID).is_err());
        assert!(DevChnId::new(N_DEV_CHN_ID).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", CellId::new(3).unwrap()), "cell3");
        assert_eq!(format!("{}", DevChnId::new(1).unwrap()), "dev_chn1");
    }

    #[test]
    fn test_serde_transparent() {
        let id = MemId::new(5).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "5");
        let back: MemId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
