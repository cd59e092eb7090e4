//! # Generation Pipeline
//!
//! One work item, start to finish:
//!
//! ```text
//! GenerationRequest
//!   → TerrainGenerator   (packed voxels, linked)
//!   → convert_chunks     (level sets, linked)
//!   → MarchingCubes      (chunk-local soups)
//!   → translate          (world space)
//!   → GenerationResult   (one mesh per chunk, links dropped)
//! ```
//!
//! Requests and results are plain serializable data, so they can cross a
//! thread or process boundary unchanged.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use stratum_core::{ChunkMetadata, IVec3, Vec3};
use stratum_meshing::{MarchingCubes, MergeStrategy, RawMesh};
use stratum_procedural::{
    convert_chunks, CoordinateWarp, NoiseThresholdClassifier, SineWarp, TerrainGenerator,
    VoxelClassifier,
};

use crate::config::{validate_chunk_layout, WorldConfig};
use crate::error::{StratumError, StratumResult};

/// A chunk group to generate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Voxels per chunk along each axis.
    pub chunk_size: [usize; 3],
    /// Chunks in the group along each axis.
    pub num_chunks: [usize; 3],
    /// Group offset in chunk units.
    pub coords: IVec3,
}

impl GenerationRequest {
    /// Creates a request.
    #[must_use]
    pub const fn new(chunk_size: [usize; 3], num_chunks: [usize; 3], coords: IVec3) -> Self {
        Self {
            chunk_size,
            num_chunks,
            coords,
        }
    }

    /// Euclidean length of `coords`; the work queue orders by this.
    #[must_use]
    pub fn distance_from_origin(&self) -> f64 {
        self.coords.length()
    }

    /// Checks that the request describes at least one meshable chunk and
    /// that every voxel of the group has an `i32` coordinate.
    ///
    /// # Errors
    ///
    /// [`StratumError::InvalidConfig`](crate::StratumError::InvalidConfig)
    /// for chunk sizes below 2, zero chunk counts, or groups reaching past
    /// the `i32` voxel range.
    pub fn validate(&self) -> StratumResult<()> {
        validate_chunk_layout(self.chunk_size, self.num_chunks)?;
        let last = self.num_chunks.map(|n| n - 1);
        for corner in [[0; 3], last] {
            if <TerrainGenerator>::checked_chunk_origin(self.chunk_size, self.coords, corner).is_none() {
                return Err(StratumError::InvalidConfig(format!(
                    "group at {:?} reaches past the voxel coordinate range",
                    self.coords.to_array()
                )));
            }
        }
        Ok(())
    }
}

/// World-space mesh of one chunk, with the chunk it came from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChunkMesh {
    /// Source chunk.
    pub chunk: ChunkMetadata,
    /// Surface, already translated by `chunk.coords`.
    pub mesh: RawMesh,
}

/// Output of one request: a mesh per chunk, in grid order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Per-chunk meshes.
    pub raw_meshes: Vec<ChunkMesh>,
}

impl GenerationResult {
    /// Total triangles across all chunks.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.raw_meshes.iter().map(|m| m.mesh.face_count()).sum()
    }

    /// Total vertices across all chunks.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.raw_meshes.iter().map(|m| m.mesh.vertex_count()).sum()
    }

    /// Merges every chunk mesh into one.
    #[must_use]
    pub fn merge(&self, strategy: MergeStrategy) -> RawMesh {
        let meshes: Vec<RawMesh> = self.raw_meshes.iter().map(|m| m.mesh.clone()).collect();
        RawMesh::merge_with(&meshes, strategy)
    }
}

/// Generator, extractor and scheduling switches for one world.
pub struct Pipeline<W = SineWarp, C = NoiseThresholdClassifier> {
    /// Voxel source.
    generator: TerrainGenerator<W, C>,
    /// Surface extraction.
    extractor: MarchingCubes,
    /// Extract chunks on the rayon pool.
    parallel: bool,
}

impl Pipeline {
    /// Builds the default pipeline described by `config`.
    ///
    /// # Errors
    ///
    /// Any validation error of [`WorldConfig::validate`].
    pub fn from_config(config: &WorldConfig) -> StratumResult<Self> {
        config.validate()?;
        let generation = &config.generation;
        let parallel = config.meshing.parallel;

        let generator = TerrainGenerator::with_threshold(generation.world_seed(), generation.threshold)
            .with_parallel(parallel);
        Ok(Self::new(generator, MarchingCubes::new(generation.iso_level)).with_parallel(parallel))
    }
}

impl<W: CoordinateWarp, C: VoxelClassifier> Pipeline<W, C> {
    /// Creates a sequential pipeline from its stages.
    #[must_use]
    pub const fn new(generator: TerrainGenerator<W, C>, extractor: MarchingCubes) -> Self {
        Self {
            generator,
            extractor,
            parallel: false,
        }
    }

    /// Enables or disables parallel extraction.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Runs one request to completion.
    ///
    /// # Errors
    ///
    /// Validation errors of [`GenerationRequest::validate`]. Generation
    /// itself cannot fail.
    pub fn process(&self, request: &GenerationRequest) -> StratumResult<GenerationResult> {
        request.validate()?;
        let start = Instant::now();

        let voxels = self
            .generator
            .generate(request.chunk_size, request.num_chunks, request.coords);
        let mut levels = convert_chunks(&voxels);
        drop(voxels);

        let meshes = self.extractor.extract_grid(&levels, self.parallel);
        levels.unlink();

        let raw_meshes: Vec<ChunkMesh> = meshes
            .into_iter()
            .zip(levels.chunks())
            .map(|(mesh, chunk)| ChunkMesh {
                chunk: chunk.metadata(),
                mesh: mesh.translated(Vec3::from(chunk.coords())),
            })
            .collect();
        let result = GenerationResult { raw_meshes };

        tracing::info!(
            coords = ?request.coords.to_array(),
            chunks = result.raw_meshes.len(),
            vertices = result.vertex_count(),
            faces = result.face_count(),
            "generate took {} ms",
            start.elapsed().as_millis()
        );
        Ok(result)
    }
}
