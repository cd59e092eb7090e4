//! # Chunk Lattice
//!
//! Chunks of one generation request live in a flat arena, ordered by
//! chunk-grid coordinate:
//!
//! ```text
//! id = cz * num_chunks.y * num_chunks.x + cy * num_chunks.x + cx
//! ```
//!
//! Neighbor links are arena indices, so the lattice has no ownership
//! cycles and "no neighbor" is just `None`.

use crate::chunk::{Axis, ChunkId, NeighborLinks, VoxelChunk};

/// Flat arena index of chunk-grid coordinate `(cx, cy, cz)`.
#[inline]
#[must_use]
pub const fn grid_index(num_chunks: [usize; 3], cx: usize, cy: usize, cz: usize) -> ChunkId {
    cz * num_chunks[1] * num_chunks[0] + cy * num_chunks[0] + cx
}

/// Wires `chunks` into a 3D lattice.
///
/// Each chunk gets `next`/`prev` links to the chunks one grid step away on
/// every axis, left `None` at the grid boundary. Existing links are
/// replaced, so calling this twice is harmless.
pub fn build_chunk_graph<T: Copy>(chunks: &mut [VoxelChunk<T>], num_chunks: [usize; 3]) {
    let [nx, ny, nz] = num_chunks;
    let total = chunks.len();
    let link = |cx: usize, cy: usize, cz: usize| {
        let id = grid_index(num_chunks, cx, cy, cz);
        (id < total).then_some(id)
    };

    for cz in 0..nz {
        for cy in 0..ny {
            for cx in 0..nx {
                let id = grid_index(num_chunks, cx, cy, cz);
                let Some(chunk) = chunks.get_mut(id) else {
                    continue;
                };

                let mut links = NeighborLinks::NONE;
                if cx > 0 {
                    links.prev[Axis::X.index()] = link(cx - 1, cy, cz);
                }
                if cx + 1 < nx {
                    links.next[Axis::X.index()] = link(cx + 1, cy, cz);
                }
                if cy > 0 {
                    links.prev[Axis::Y.index()] = link(cx, cy - 1, cz);
                }
                if cy + 1 < ny {
                    links.next[Axis::Y.index()] = link(cx, cy + 1, cz);
                }
                if cz > 0 {
                    links.prev[Axis::Z.index()] = link(cx, cy, cz - 1);
                }
                if cz + 1 < nz {
                    links.next[Axis::Z.index()] = link(cx, cy, cz + 1);
                }
                chunk.set_links(links);
            }
        }
    }
}

/// An ordered, linked group of chunks.
#[derive(Clone, Debug)]
pub struct ChunkGrid<T> {
    /// Chunks in grid order.
    chunks: Vec<VoxelChunk<T>>,
    /// Chunks per axis.
    num_chunks: [usize; 3],
}

impl<T: Copy> ChunkGrid<T> {
    /// Takes ownership of `chunks` (in grid order) and links them.
    #[must_use]
    pub fn new(mut chunks: Vec<VoxelChunk<T>>, num_chunks: [usize; 3]) -> Self {
        build_chunk_graph(&mut chunks, num_chunks);
        Self { chunks, num_chunks }
    }

    /// Chunks per axis.
    #[inline]
    #[must_use]
    pub const fn num_chunks(&self) -> [usize; 3] {
        self.num_chunks
    }

    /// Number of chunks.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// True when the grid holds no chunks.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// All chunks in grid order.
    #[inline]
    #[must_use]
    pub fn chunks(&self) -> &[VoxelChunk<T>] {
        &self.chunks
    }

    /// Chunk by arena id.
    #[inline]
    #[must_use]
    pub fn chunk(&self, id: ChunkId) -> Option<&VoxelChunk<T>> {
        self.chunks.get(id)
    }

    /// Mutable chunk by arena id.
    #[inline]
    pub fn chunk_mut(&mut self, id: ChunkId) -> Option<&mut VoxelChunk<T>> {
        self.chunks.get_mut(id)
    }

    /// Chunk at chunk-grid coordinate `(cx, cy, cz)`.
    #[must_use]
    pub fn chunk_at(&self, cx: usize, cy: usize, cz: usize) -> Option<&VoxelChunk<T>> {
        let [nx, ny, nz] = self.num_chunks;
        if cx < nx && cy < ny && cz < nz {
            self.chunk(grid_index(self.num_chunks, cx, cy, cz))
        } else {
            None
        }
    }

    /// Borrowing view of one chunk that can see across its links.
    #[inline]
    #[must_use]
    pub fn view(&self, id: ChunkId) -> ChunkView<'_, T> {
        ChunkView { grid: self, id }
    }

    /// Re-runs the graph builder over the current chunks.
    pub fn relink(&mut self) {
        build_chunk_graph(&mut self.chunks, self.num_chunks);
    }

    /// Breaks the lattice. Chunks stay readable, but boundary jumps now
    /// stop at every chunk face.
    pub fn unlink(&mut self) {
        for chunk in &mut self.chunks {
            chunk.clear_links();
        }
    }

    /// Builds a grid of the same shape whose voxels are `f(voxel)`, linked
    /// independently of this one.
    #[must_use]
    pub fn map<U: Copy, F: Fn(T) -> U>(&self, f: F) -> ChunkGrid<U> {
        let chunks = self.chunks.iter().map(|chunk| chunk.map(&f)).collect();
        ChunkGrid::new(chunks, self.num_chunks)
    }

    /// Reads `(x, y, z)` relative to chunk `id`, continuing into linked
    /// neighbors when the position is outside the chunk.
    ///
    /// Overflow is corrected one axis per step, in x, y, z order: a
    /// position outside on x moves to `prev.x`/`next.x` with x re-based
    /// into the neighbor's frame, and the remaining axes are resolved from
    /// there. If the link needed for the current step is missing the result
    /// is `None`, even when another path through the lattice exists.
    #[must_use]
    pub fn get_with_boundary_jump(&self, id: ChunkId, x: i32, y: i32, z: i32) -> Option<T> {
        let mut pos = [x, y, z];
        let mut current = self.chunks.get(id)?;

        loop {
            if let Some(value) = current.get(pos[0], pos[1], pos[2]) {
                return Some(value);
            }

            let size = current.size();
            let axis = Axis::ALL
                .into_iter()
                .find(|axis| {
                    let v = pos[axis.index()];
                    v < 0 || v as usize >= size[axis.index()]
                })?;
            let a = axis.index();

            if pos[a] < 0 {
                let next = self.chunks.get(current.neighbor(axis, false)?)?;
                pos[a] += next.size()[a] as i32;
                current = next;
            } else {
                let next = self.chunks.get(current.neighbor(axis, true)?)?;
                pos[a] -= size[a] as i32;
                current = next;
            }
        }
    }
}

/// A chunk together with the grid that resolves its links.
#[derive(Clone, Copy, Debug)]
pub struct ChunkView<'a, T> {
    grid: &'a ChunkGrid<T>,
    id: ChunkId,
}

impl<'a, T: Copy> ChunkView<'a, T> {
    /// Arena id of the viewed chunk.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> ChunkId {
        self.id
    }

    /// The viewed chunk, if the id is valid.
    #[inline]
    #[must_use]
    pub fn chunk(&self) -> Option<&'a VoxelChunk<T>> {
        self.grid.chunk(self.id)
    }

    /// Bounds-checked read, no neighbor traversal.
    #[inline]
    #[must_use]
    pub fn get(&self, x: i32, y: i32, z: i32) -> Option<T> {
        self.chunk()?.get(x, y, z)
    }

    /// See [`ChunkGrid::get_with_boundary_jump`].
    #[inline]
    #[must_use]
    pub fn get_with_boundary_jump(&self, x: i32, y: i32, z: i32) -> Option<T> {
        self.grid.get_with_boundary_jump(self.id, x, y, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::IVec3;

    /// Grid of 4^3 chunks where every voxel holds its chunk id.
    fn tagged_grid(num_chunks: [usize; 3]) -> ChunkGrid<i32> {
        let mut chunks = Vec::new();
        for cz in 0..num_chunks[2] {
            for cy in 0..num_chunks[1] {
                for cx in 0..num_chunks[0] {
                    let id = grid_index(num_chunks, cx, cy, cz) as i32;
                    let origin = IVec3::new(cx as i32 * 4, cy as i32 * 4, cz as i32 * 4);
                    chunks.push(VoxelChunk::filled(origin, [4, 4, 4], id));
                }
            }
        }
        ChunkGrid::new(chunks, num_chunks)
    }

    #[test]
    fn test_links_are_symmetric() {
        let grid = tagged_grid([3, 2, 2]);
        for (id, chunk) in grid.chunks().iter().enumerate() {
            for axis in Axis::ALL {
                if let Some(next) = chunk.neighbor(axis, true) {
                    assert_eq!(grid.chunk(next).unwrap().neighbor(axis, false), Some(id));
                }
                if let Some(prev) = chunk.neighbor(axis, false) {
                    assert_eq!(grid.chunk(prev).unwrap().neighbor(axis, true), Some(id));
                }
            }
        }
    }

    #[test]
    fn test_boundary_links_are_none() {
        let grid = tagged_grid([2, 2, 2]);
        let origin = grid.chunk_at(0, 0, 0).unwrap();
        assert_eq!(origin.links().prev, [None, None, None]);
        assert_eq!(origin.neighbor(Axis::X, true), Some(1));
        assert_eq!(origin.neighbor(Axis::Y, true), Some(2));
        assert_eq!(origin.neighbor(Axis::Z, true), Some(4));

        let far = grid.chunk_at(1, 1, 1).unwrap();
        assert_eq!(far.links().next, [None, None, None]);
    }

    #[test]
    fn test_jump_into_next_x() {
        let mut a = VoxelChunk::filled(IVec3::ZERO, [4, 4, 4], 0.0f32);
        let mut b = VoxelChunk::filled(IVec3::new(4, 0, 0), [4, 4, 4], 0.0f32);
        a.set(3, 1, 1, -1.0);
        b.set(0, 1, 1, 7.5);
        let grid = ChunkGrid::new(vec![a, b], [2, 1, 1]);

        let b_value = grid.chunk(1).unwrap().get(0, 1, 1);
        assert_eq!(grid.get_with_boundary_jump(0, 4, 1, 1), b_value);
        assert_eq!(grid.view(0).get_with_boundary_jump(4, 1, 1), Some(7.5));
        assert_eq!(grid.view(1).get_with_boundary_jump(-1, 1, 1), Some(-1.0));
    }

    #[test]
    fn test_jump_without_link_is_none() {
        let grid = tagged_grid([2, 1, 1]);
        assert_eq!(grid.get_with_boundary_jump(0, -1, 0, 0), None);
        assert_eq!(grid.get_with_boundary_jump(1, 4, 0, 0), None);
        assert_eq!(grid.get_with_boundary_jump(0, 0, 4, 0), None);
        assert_eq!(grid.get_with_boundary_jump(0, 0, 0, -1), None);
        assert_eq!(grid.get_with_boundary_jump(99, 0, 0, 0), None);
    }

    #[test]
    fn test_multi_axis_overflow_resolves_x_first() {
        let grid = tagged_grid([2, 2, 1]);
        // From chunk 0, (4, 4, 0) -> next.x (chunk 1) -> next.y (chunk 3)
        assert_eq!(grid.get_with_boundary_jump(0, 4, 4, 0), Some(3));
        // From chunk 1, (4, 4, 0) has no next.x, so the diagonal stays unreachable
        assert_eq!(grid.get_with_boundary_jump(1, 4, 4, 0), None);
    }

    #[test]
    fn test_unlink_breaks_jumps() {
        let mut grid = tagged_grid([2, 1, 1]);
        assert_eq!(grid.get_with_boundary_jump(0, 4, 0, 0), Some(1));
        grid.unlink();
        assert!(grid.chunks().iter().all(|c| c.links().is_unlinked()));
        assert_eq!(grid.get_with_boundary_jump(0, 4, 0, 0), None);
        assert_eq!(grid.get_with_boundary_jump(0, 3, 0, 0), Some(0));
    }

    #[test]
    fn test_map_builds_independent_links() {
        let mut grid = tagged_grid([2, 2, 2]);
        let mapped = grid.map(|id| id as f32 * 0.5);
        grid.unlink();

        assert_eq!(mapped.num_chunks(), [2, 2, 2]);
        assert_eq!(mapped.get_with_boundary_jump(0, 0, 0, 4), Some(2.0));
        assert_eq!(grid.get_with_boundary_jump(0, 0, 0, 4), None);
    }
}
