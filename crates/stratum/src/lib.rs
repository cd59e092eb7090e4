//! # Stratum
//!
//! Procedural voxel terrain, from seed to mesh.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌──────────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ WorkQueue │──►│ TerrainGenerator │──►│ LevelSet     │──►│ MarchingCubes│
//! │ (nearest  │   │ (noise → voxels) │   │ (voxels → f32│   │ + RawMesh    │
//! │  first)   │   └──────────────────┘   └──────────────┘   └──────┬───────┘
//! └───────────┘                                                    │
//!                                            GenerationResult ◄────┘
//! ```
//!
//! [`Pipeline`] runs one request; [`GenerationWorker`] runs it on a
//! background thread; [`finish_level_generation`] drains a whole queue.
//!
//! ## Example
//!
//! ```rust
//! use stratum::{finish_level_generation, Pipeline, WorkQueue, WorldConfig};
//!
//! let config = WorldConfig::from_toml_str(
//!     "[generation]\nchunk_size = [8, 8, 8]\ngroup_size = [1, 1, 1]\ngroup_counts = [2, 1, 1]\n",
//! )?;
//! let pipeline = Pipeline::from_config(&config)?;
//! let mut queue = WorkQueue::initial(&config.generation);
//!
//! let groups = finish_level_generation(&pipeline, &mut queue, config.meshing.merge_strategy())?;
//! assert_eq!(groups.len(), 2);
//! assert!(groups.iter().all(|g| g.mesh.is_consistent()));
//! # Ok::<(), stratum::StratumError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod pipeline;
pub mod queue;
pub mod worker;

pub use config::{GenerationConfig, MeshingConfig, WorldConfig};
pub use error::{StratumError, StratumResult};
pub use pipeline::{ChunkMesh, GenerationRequest, GenerationResult, Pipeline};
pub use queue::WorkQueue;
pub use worker::{finish_level_generation, CompletedGroup, GenerationWorker, GroupMesh};
