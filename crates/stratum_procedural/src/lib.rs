//! # Stratum Procedural
//!
//! Deterministic terrain sampling for chunked voxel worlds.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: the same seed and request always yield the same voxels
//! 2. **Chunked**: terrain is produced one chunk group at a time
//! 3. **Seamless**: neighboring chunks share their boundary voxel layer
//!
//! ## Core Components
//!
//! - `SimplexNoise`: seeded 3D gradient noise
//! - `TerrainGenerator`: warps and classifies every voxel of a chunk group
//! - `convert_chunks`: packed voxels to level sets for the mesher
//!
//! ## Example
//!
//! ```rust
//! use stratum_core::IVec3;
//! use stratum_procedural::{convert_chunks, TerrainGenerator, WorldSeed};
//!
//! let generator = TerrainGenerator::new(WorldSeed::new(12345));
//! let voxels = generator.generate([8, 8, 8], [2, 1, 2], IVec3::ZERO);
//! let levels = convert_chunks(&voxels);
//!
//! assert_eq!(levels.len(), 4);
//! assert!(levels.chunks()[0].data().iter().all(|v| (-0.5..=0.5).contains(v)));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod level_set;
pub mod noise;
pub mod terrain;

pub use level_set::{convert_chunks, level_set_value, EMPTY_LEVEL};
pub use noise::{SimplexNoise, WorldSeed};
pub use terrain::{
    CoordinateWarp, IdentityWarp, NoiseThreshold, NoiseThresholdClassifier, SineWarp,
    TerrainGenerator, VoxelClassifier,
};
