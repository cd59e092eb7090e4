//! # Packed Voxels
//!
//! Generated terrain stores one `u16` per voxel:
//!
//! ```text
//!  15            8 7             0
//! ┌───────────────┬───────────────┐
//! │    amount     │   material    │
//! └───────────────┴───────────────┘
//! ```
//!
//! Material `0` is empty space; the amount byte is meaningless for it.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// A packed voxel value (low byte material tag, high byte amount).
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize)]
pub struct Voxel(u16);

impl Voxel {
    /// Empty space.
    pub const EMPTY: Self = Self(0);

    /// Material tag written by the default terrain classifier.
    pub const SOLID: u8 = 1;

    /// Packs a material tag and an amount.
    #[inline]
    #[must_use]
    pub const fn pack(material: u8, amount: u8) -> Self {
        Self(((amount as u16) << 8) | material as u16)
    }

    /// Wraps an already packed value.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// Returns the packed value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Material tag (low byte).
    #[inline]
    #[must_use]
    pub const fn material(self) -> u8 {
        (self.0 & 0x00FF) as u8
    }

    /// Amount/density (high byte), 0-255.
    #[inline]
    #[must_use]
    pub const fn amount(self) -> u8 {
        ((self.0 & 0xFF00) >> 8) as u8
    }

    /// True for material `0`.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.material() == 0
    }
}

impl From<u16> for Voxel {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl From<Voxel> for u16 {
    fn from(voxel: Voxel) -> Self {
        voxel.0
    }
}
