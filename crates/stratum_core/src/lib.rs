//! # Stratum Core
//!
//! Data containers shared by every stage of the terrain pipeline.
//!
//! ## Core Components
//!
//! - `VoxelChunk`: dense per-voxel storage with permissive bounds handling
//! - `Voxel`: packed 16-bit material/amount value
//! - `ChunkGrid`: arena of chunks linked into a 6-neighbor lattice
//! - `Vec3` / `IVec3`: positions, normals and integer offsets
//!
//! ## Example
//!
//! ```rust
//! use stratum_core::{ChunkGrid, IVec3, VoxelChunk};
//!
//! let a = VoxelChunk::filled(IVec3::ZERO, [4, 4, 4], 0.0f32);
//! let b = VoxelChunk::filled(IVec3::new(4, 0, 0), [4, 4, 4], 1.0f32);
//! let grid = ChunkGrid::new(vec![a, b], [2, 1, 1]);
//!
//! // x = 4 is outside chunk 0, so the read continues into chunk 1
//! assert_eq!(grid.get_with_boundary_jump(0, 4, 1, 1), Some(1.0));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod chunk;
pub mod grid;
pub mod math;
pub mod voxel;

pub use chunk::{
    Axis, ChunkId, ChunkMetadata, LevelSetChunk, NeighborLinks, PackedChunk, VoxelChunk,
};
pub use grid::{build_chunk_graph, grid_index, ChunkGrid, ChunkView};
pub use math::{IVec3, Vec3};
pub use voxel::Voxel;
