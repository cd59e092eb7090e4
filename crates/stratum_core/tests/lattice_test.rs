//! # Lattice Tests
//!
//! Boundary-jump reads across a full 2x2x2 chunk group.

use stratum_core::{Axis, ChunkGrid, IVec3, VoxelChunk};

/// Eight 4^3 chunks, each filled with its own id.
fn cube_of_chunks() -> ChunkGrid<f32> {
    let mut chunks = Vec::new();
    for cz in 0..2 {
        for cy in 0..2 {
            for cx in 0..2 {
                let id = (cz * 4 + cy * 2 + cx) as f32;
                chunks.push(VoxelChunk::filled(IVec3::new(cx * 4, cy * 4, cz * 4), [4, 4, 4], id));
            }
        }
    }
    ChunkGrid::new(chunks, [2, 2, 2])
}

/// Test: links are symmetric on every axis.
#[test]
fn test_links_are_symmetric() {
    let grid = cube_of_chunks();
    for (id, chunk) in grid.chunks().iter().enumerate() {
        for axis in Axis::ALL {
            if let Some(next) = chunk.neighbor(axis, true) {
                assert_eq!(grid.chunk(next).unwrap().neighbor(axis, false), Some(id));
            }
        }
    }
}

/// Test: single-axis overflow lands in the face neighbor.
#[test]
fn test_face_neighbors_are_reachable() {
    let grid = cube_of_chunks();
    assert_eq!(grid.get_with_boundary_jump(0, 4, 1, 1), Some(1.0));
    assert_eq!(grid.get_with_boundary_jump(0, 1, 4, 1), Some(2.0));
    assert_eq!(grid.get_with_boundary_jump(0, 1, 1, 4), Some(4.0));
    assert_eq!(grid.get_with_boundary_jump(7, -1, 0, 0), Some(6.0));
    assert_eq!(grid.get_with_boundary_jump(0, -1, 0, 0), None);
}

/// Test: multi-axis overflow resolves x first, then y, then z.
#[test]
fn test_multi_axis_overflow_is_sequential() {
    let grid = cube_of_chunks();
    // x into chunk 1, then y into chunk 3, then z into chunk 7
    assert_eq!(grid.get_with_boundary_jump(0, 4, 4, 4), Some(7.0));
    // x overflow from chunk 1 has no next link
    assert_eq!(grid.get_with_boundary_jump(1, 4, 4, 0), None);
}

/// Test: reads through a view match reads through the grid.
#[test]
fn test_view_reads() {
    let grid = cube_of_chunks();
    let view = grid.view(3);
    assert_eq!(view.get(0, 0, 0), Some(3.0));
    assert_eq!(view.get(-1, 0, 0), None);
    assert_eq!(view.get_with_boundary_jump(-1, 0, 0), grid.get_with_boundary_jump(3, -1, 0, 0));
}
