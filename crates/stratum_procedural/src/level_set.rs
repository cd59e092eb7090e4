//! # Level-Set Conversion
//!
//! Maps packed voxels to the signed scalar field the mesher contours at
//! iso level 0.
//!
//! ```text
//! empty voxel          →  +0.5
//! solid, amount a      →  a / 255 - 0.5     (−0.5 ..= +0.5)
//! ```
//!
//! At iso 0, amounts up to 127 read as inside and amounts from 128 up
//! read as outside, the same as empty space.

use stratum_core::{ChunkGrid, Voxel};

/// Level value of an empty voxel.
pub const EMPTY_LEVEL: f32 = 0.5;

/// Converts one packed voxel to its level-set value.
#[inline]
#[must_use]
pub fn level_set_value(voxel: Voxel) -> f32 {
    if voxel.is_empty() {
        EMPTY_LEVEL
    } else {
        f32::from(voxel.amount()) / 255.0 - 0.5
    }
}

/// Converts a chunk group to level sets.
///
/// The result keeps every chunk's origin, size and grid position and is
/// linked with the same lattice shape as the input.
#[must_use]
pub fn convert_chunks(voxels: &ChunkGrid<Voxel>) -> ChunkGrid<f32> {
    let level_sets = voxels.map(level_set_value);
    tracing::trace!(chunks = level_sets.len(), "converted chunk group to level sets");
    level_sets
}
