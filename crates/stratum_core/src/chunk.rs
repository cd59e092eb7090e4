//! # Voxel Chunks
//!
//! A chunk is a dense 3D array of scalars plus non-owning links to the
//! six face-adjacent chunks of its lattice.
//!
//! ## Layout
//!
//! Row-major with x fastest, then y, then z:
//!
//! ```text
//! index = z * size.y * size.x + y * size.x + x
//! ```
//!
//! ## Indexing Policy
//!
//! Reads outside `[0, size)` return `None` and writes are dropped. Lookups
//! that should continue into a neighbor go through
//! [`ChunkGrid::get_with_boundary_jump`](crate::grid::ChunkGrid::get_with_boundary_jump),
//! since neighbors live in the grid's arena, not in the chunk.

use serde::{Deserialize, Serialize};

use crate::math::IVec3;
use crate::voxel::Voxel;

/// Index of a chunk inside its [`ChunkGrid`](crate::grid::ChunkGrid) arena.
pub type ChunkId = usize;

/// One of the three lattice axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// X axis.
    X = 0,
    /// Y axis.
    Y = 1,
    /// Z axis.
    Z = 2,
}

impl Axis {
    /// All axes in resolution order.
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Array index of this axis.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Links to the face-adjacent chunks, one per axis and direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NeighborLinks {
    /// Neighbor one grid step in the positive direction, per axis.
    pub next: [Option<ChunkId>; 3],
    /// Neighbor one grid step in the negative direction, per axis.
    pub prev: [Option<ChunkId>; 3],
}

impl NeighborLinks {
    /// No neighbors at all.
    pub const NONE: Self = Self {
        next: [None; 3],
        prev: [None; 3],
    };

    /// True when no link is set.
    #[must_use]
    pub fn is_unlinked(&self) -> bool {
        *self == Self::NONE
    }
}

/// Identifies a chunk without its data: enough to re-translate or
/// re-identify the source of a mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Chunk origin in voxel space.
    pub coords: IVec3,
    /// Voxel dimensions.
    pub size: [usize; 3],
}

/// A dense block of voxel scalars.
///
/// `T` is [`Voxel`] for generated terrain and `f32` for level sets.
#[derive(Clone, Debug)]
pub struct VoxelChunk<T> {
    /// Chunk origin in voxel space (not chunk-grid space).
    coords: IVec3,
    /// Voxel dimensions along each axis.
    size: [usize; 3],
    /// Voxel data, row-major with x fastest.
    data: Vec<T>,
    /// Lattice links, set by the graph builder.
    links: NeighborLinks,
}

/// Chunk of packed terrain voxels.
pub type PackedChunk = VoxelChunk<Voxel>;

/// Chunk of signed level-set values.
pub type LevelSetChunk = VoxelChunk<f32>;

impl<T: Copy + Default> VoxelChunk<T> {
    /// Creates a chunk filled with `T::default()`.
    #[must_use]
    pub fn new(coords: IVec3, size: [usize; 3]) -> Self {
        Self::filled(coords, size, T::default())
    }

    /// Creates a chunk with every voxel set to `value`.
    #[must_use]
    pub fn filled(coords: IVec3, size: [usize; 3], value: T) -> Self {
        Self {
            coords,
            size,
            data: vec![value; size[0] * size[1] * size[2]],
            links: NeighborLinks::NONE,
        }
    }
}

impl<T: Copy> VoxelChunk<T> {
    /// Chunk origin in voxel space.
    #[inline]
    #[must_use]
    pub const fn coords(&self) -> IVec3 {
        self.coords
    }

    /// Voxel dimensions.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> [usize; 3] {
        self.size
    }

    /// Coordinates and size, without the data.
    #[inline]
    #[must_use]
    pub const fn metadata(&self) -> ChunkMetadata {
        ChunkMetadata {
            coords: self.coords,
            size: self.size,
        }
    }

    /// Number of voxels.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True for a zero-volume chunk.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw voxel data.
    #[inline]
    #[must_use]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Lattice links.
    #[inline]
    #[must_use]
    pub const fn links(&self) -> &NeighborLinks {
        &self.links
    }

    /// Neighbor one step along `axis`, forward when `positive`.
    #[inline]
    #[must_use]
    pub const fn neighbor(&self, axis: Axis, positive: bool) -> Option<ChunkId> {
        if positive {
            self.links.next[axis.index()]
        } else {
            self.links.prev[axis.index()]
        }
    }

    /// Replaces the lattice links.
    #[inline]
    pub fn set_links(&mut self, links: NeighborLinks) {
        self.links = links;
    }

    /// Drops every lattice link.
    #[inline]
    pub fn clear_links(&mut self) {
        self.links = NeighborLinks::NONE;
    }

    /// Flat index of `(x, y, z)`, or `None` when any coordinate is outside
    /// `[0, size)`.
    #[inline]
    #[must_use]
    pub fn index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        let [sx, sy, sz] = self.size;
        let in_bounds = |v: i32, s: usize| v >= 0 && (v as usize) < s;
        if in_bounds(x, sx) && in_bounds(y, sy) && in_bounds(z, sz) {
            Some(z as usize * sy * sx + y as usize * sx + x as usize)
        } else {
            None
        }
    }

    /// Inverse of [`index`](Self::index); `None` past the end of the data.
    #[inline]
    #[must_use]
    pub fn index_to_coords(&self, index: usize) -> Option<[usize; 3]> {
        if index >= self.data.len() {
            return None;
        }
        let [sx, sy, _] = self.size;
        let x = index % sx;
        let y = (index / sx) % sy;
        let z = index / (sx * sy);
        Some([x, y, z])
    }

    /// Bounds-checked read, no neighbor traversal.
    #[inline]
    #[must_use]
    pub fn get(&self, x: i32, y: i32, z: i32) -> Option<T> {
        self.index(x, y, z).map(|i| self.data[i])
    }

    /// Bounds-checked read by flat index.
    #[inline]
    #[must_use]
    pub fn get_at_index(&self, index: usize) -> Option<T> {
        self.data.get(index).copied()
    }

    /// Bounds-checked write; out-of-bounds writes are dropped.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, z: i32, value: T) {
        match self.index(x, y, z) {
            Some(i) => self.data[i] = value,
            None => tracing::trace!(x, y, z, "dropped out-of-bounds voxel write"),
        }
    }

    /// Bounds-checked write by flat index; out-of-bounds writes are dropped.
    #[inline]
    pub fn set_at_index(&mut self, index: usize, value: T) {
        match self.data.get_mut(index) {
            Some(slot) => *slot = value,
            None => tracing::trace!(index, "dropped out-of-bounds voxel write"),
        }
    }

    /// Builds a chunk with the same origin and size whose voxels are
    /// `f(self voxel)`. Links are not copied.
    #[must_use]
    pub fn map<U: Copy, F: Fn(T) -> U>(&self, f: F) -> VoxelChunk<U> {
        VoxelChunk {
            coords: self.coords,
            size: self.size,
            data: self.data.iter().map(|&v| f(v)).collect(),
            links: NeighborLinks::NONE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_4() -> VoxelChunk<f32> {
        let mut chunk = VoxelChunk::new(IVec3::ZERO, [4, 3, 2]);
        for i in 0..chunk.len() {
            chunk.set_at_index(i, i as f32);
        }
        chunk
    }

    #[test]
    fn test_row_major_layout() {
        let chunk = chunk_4();
        assert_eq!(chunk.index(0, 0, 0), Some(0));
        assert_eq!(chunk.index(1, 0, 0), Some(1));
        assert_eq!(chunk.index(0, 1, 0), Some(4));
        assert_eq!(chunk.index(0, 0, 1), Some(12));
        assert_eq!(chunk.get(3, 2, 1), Some(23.0));
    }

    #[test]
    fn test_index_round_trip() {
        let chunk = chunk_4();
        for z in 0..2 {
            for y in 0..3 {
                for x in 0..4 {
                    let index = chunk.index(x, y, z).unwrap();
                    assert_eq!(
                        chunk.index_to_coords(index),
                        Some([x as usize, y as usize, z as usize]),
                        "round trip failed at ({x}, {y}, {z})"
                    );
                }
            }
        }
        assert_eq!(chunk.index_to_coords(chunk.len()), None);
    }

    #[test]
    fn test_out_of_bounds_reads_are_none() {
        let chunk = chunk_4();
        for (x, y, z) in [(-1, 0, 0), (4, 0, 0), (0, -1, 0), (0, 3, 0), (0, 0, -1), (0, 0, 2)] {
            assert_eq!(chunk.get(x, y, z), None, "({x}, {y}, {z}) should be out of bounds");
        }
        assert_eq!(chunk.get_at_index(24), None);
    }

    #[test]
    fn test_out_of_bounds_writes_are_dropped() {
        let mut chunk = chunk_4();
        let before = chunk.data().to_vec();
        chunk.set(-1, 0, 0, 99.0);
        chunk.set(0, 0, 2, 99.0);
        chunk.set_at_index(24, 99.0);
        assert_eq!(chunk.data(), before.as_slice());

        chunk.set(1, 1, 1, 99.0);
        assert_eq!(chunk.get(1, 1, 1), Some(99.0));
    }

    #[test]
    fn test_map_keeps_metadata() {
        let mut chunk: PackedChunk = VoxelChunk::new(IVec3::new(31, 0, -31), [2, 2, 2]);
        chunk.set(1, 1, 1, Voxel::pack(1, 200));
        let mapped = chunk.map(|v| f32::from(v.amount()));
        assert_eq!(mapped.metadata(), chunk.metadata());
        assert_eq!(mapped.get(1, 1, 1), Some(200.0));
        assert!(mapped.links().is_unlinked());
    }
}
