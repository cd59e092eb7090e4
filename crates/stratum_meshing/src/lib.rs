//! # Stratum Meshing
//!
//! Turns level-set chunks into triangle meshes.
//!
//! ## Core Components
//!
//! - `MarchingCubes`: per-chunk iso-surface extraction
//! - `RawMesh`: soup and indexed meshes, with weld, translate and merge
//!
//! ## Example
//!
//! ```rust
//! use stratum_core::{ChunkGrid, IVec3, Vec3, VoxelChunk};
//! use stratum_meshing::{MarchingCubes, RawMesh};
//!
//! let mut chunk = VoxelChunk::filled(IVec3::new(31, 0, 0), [2, 2, 2], 0.5f32);
//! chunk.set(0, 0, 0, -0.5);
//! let grid = ChunkGrid::new(vec![chunk], [1, 1, 1]);
//!
//! let local = MarchingCubes::new(0.0).extract(grid.view(0), [2, 2, 2]);
//! let world = local.translated(Vec3::from(IVec3::new(31, 0, 0)));
//! let merged = RawMesh::merge(&[world]);
//!
//! assert_eq!(merged.face_count(), 1);
//! assert!(merged.is_consistent());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod marching_cubes;
pub mod mesh;
pub mod tables;

pub use marching_cubes::{below_iso, InsidePredicate, MarchingCubes};
pub use mesh::{face_normal, MergeStrategy, RawMesh, Triangle};
