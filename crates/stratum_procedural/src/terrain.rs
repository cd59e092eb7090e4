//! # Terrain Generator
//!
//! Fills a group of chunks with packed voxels and links them into a
//! lattice.
//!
//! ## Per-Voxel Pipeline
//!
//! ```text
//! voxel-space position ──► CoordinateWarp ──► VoxelClassifier ──► Voxel
//! ```
//!
//! Both stages are strategies. The defaults are [`SineWarp`], which bends
//! each axis by a low-frequency term of the others, and
//! [`NoiseThresholdClassifier`], which turns 3D simplex noise below a
//! threshold into solid material.
//!
//! ## Chunk Placement
//!
//! Chunks advance by `size - 1` voxels, so neighbors share one voxel layer
//! on every common face:
//!
//! ```text
//! origin.axis = (group_offset.axis + grid.axis) * (chunk_size.axis - 1)
//! ```

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use stratum_core::{grid_index, ChunkGrid, IVec3, PackedChunk, Voxel, VoxelChunk};

use crate::noise::{SimplexNoise, WorldSeed};

/// Maps a voxel-space position to the point where the classifier samples.
pub trait CoordinateWarp: Sync {
    /// Warps `position`; `chunk_size` is the size of the chunks being built.
    fn transform(&self, position: [f64; 3], chunk_size: [usize; 3]) -> [f64; 3];
}

impl<F> CoordinateWarp for F
where
    F: Fn([f64; 3], [usize; 3]) -> [f64; 3] + Sync,
{
    fn transform(&self, position: [f64; 3], chunk_size: [usize; 3]) -> [f64; 3] {
        self(position, chunk_size)
    }
}

/// Turns a warped position into a packed voxel.
pub trait VoxelClassifier: Sync {
    /// Classifies the voxel at `position`.
    fn classify(&self, position: [f64; 3]) -> Voxel;
}

impl<F> VoxelClassifier for F
where
    F: Fn([f64; 3]) -> Voxel + Sync,
{
    fn classify(&self, position: [f64; 3]) -> Voxel {
        self(position)
    }
}

/// Leaves positions unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityWarp;

impl CoordinateWarp for IdentityWarp {
    fn transform(&self, position: [f64; 3], _chunk_size: [usize; 3]) -> [f64; 3] {
        position
    }
}

/// Default warp: scales each axis to noise frequency and offsets it by a
/// small sine/cosine term, giving terrain features that are not aligned
/// with the voxel axes.
#[derive(Clone, Copy, Debug, Default)]
pub struct SineWarp;

impl CoordinateWarp for SineWarp {
    fn transform(&self, [x, y, z]: [f64; 3], chunk_size: [usize; 3]) -> [f64; 3] {
        use std::f64::consts::PI;

        let extent = chunk_size[0].max(1) as f64;
        [
            x / 34.0 + ((x / extent) * PI * 0.3).sin() * 0.006,
            y / 37.0 - ((x * 4.0).cos() - (y * 6.7).sin() + (z * 2.4).sin()).cos() * 0.001,
            z / 46.0 + ((5.0 + x / extent) * PI * 0.4).cos() * 0.007,
        ]
    }
}

/// Noise band that produces solid material.
///
/// Noise below `upper` is solid; its amount grows linearly from 0 at
/// `lower` to 255 at `upper`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct NoiseThreshold {
    /// Noise value mapped to amount 0.
    pub lower: f64,
    /// Noise value at and above which space is empty.
    pub upper: f64,
}

impl NoiseThreshold {
    /// Creates a threshold band.
    #[must_use]
    pub const fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// True when both bounds are finite and `lower < upper`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lower.is_finite() && self.upper.is_finite() && self.lower < self.upper
    }

    /// Packs a noise sample into a voxel.
    #[must_use]
    pub fn pack(&self, noise: f64) -> Voxel {
        if noise >= self.upper {
            return Voxel::EMPTY;
        }
        let clamped = noise.clamp(self.lower, self.upper);
        let normalized = (clamped - self.lower) / (self.upper - self.lower).abs();
        let amount = (255.0 * normalized).floor() as u32;
        Voxel::pack(Voxel::SOLID, (amount & 0xFF) as u8)
    }
}

impl Default for NoiseThreshold {
    fn default() -> Self {
        Self::new(-1.0, 0.0)
    }
}

impl From<[f64; 2]> for NoiseThreshold {
    fn from([lower, upper]: [f64; 2]) -> Self {
        Self::new(lower, upper)
    }
}

impl From<NoiseThreshold> for [f64; 2] {
    fn from(t: NoiseThreshold) -> Self {
        [t.lower, t.upper]
    }
}

/// Default classifier: seeded 3D simplex noise against a [`NoiseThreshold`].
#[derive(Clone)]
pub struct NoiseThresholdClassifier {
    /// Noise source.
    noise: SimplexNoise,
    /// Solid band.
    threshold: NoiseThreshold,
}

impl NoiseThresholdClassifier {
    /// Creates a classifier from a seed and threshold band.
    #[must_use]
    pub fn new(seed: WorldSeed, threshold: NoiseThreshold) -> Self {
        Self {
            noise: SimplexNoise::new(seed),
            threshold,
        }
    }

    /// The solid band.
    #[must_use]
    pub const fn threshold(&self) -> NoiseThreshold {
        self.threshold
    }
}

impl VoxelClassifier for NoiseThresholdClassifier {
    fn classify(&self, [x, y, z]: [f64; 3]) -> Voxel {
        self.threshold.pack(self.noise.sample(x, y, z))
    }
}

/// Chunk-group generator.
///
/// A pure function of its strategies and the request: the same request
/// always yields the same voxels.
pub struct TerrainGenerator<W = SineWarp, C = NoiseThresholdClassifier> {
    /// Coordinate warp.
    warp: W,
    /// Voxel classifier.
    classifier: C,
    /// Fill chunks on the rayon pool.
    parallel: bool,
}

impl TerrainGenerator {
    /// Creates a generator with the default warp and classifier.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        Self::with_threshold(seed, NoiseThreshold::default())
    }

    /// Creates a default generator with a custom solid band.
    #[must_use]
    pub fn with_threshold(seed: WorldSeed, threshold: NoiseThreshold) -> Self {
        Self::with_strategies(SineWarp, NoiseThresholdClassifier::new(seed, threshold))
    }
}

impl<W: CoordinateWarp, C: VoxelClassifier> TerrainGenerator<W, C> {
    /// Creates a generator from explicit strategies.
    #[must_use]
    pub const fn with_strategies(warp: W, classifier: C) -> Self {
        Self {
            warp,
            classifier,
            parallel: false,
        }
    }

    /// Enables or disables parallel chunk filling. Output is identical
    /// either way.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Voxel-space origin of the chunk at `grid_coord` in the group at
    /// `group_offset`.
    ///
    /// Callers must keep the origin within `i32`; see
    /// [`checked_chunk_origin`](Self::checked_chunk_origin).
    #[must_use]
    pub fn chunk_origin(chunk_size: [usize; 3], group_offset: IVec3, grid_coord: [usize; 3]) -> IVec3 {
        let axis = |a: usize, offset: i32| (offset + grid_coord[a] as i32) * (chunk_size[a] as i32 - 1);
        IVec3::new(
            axis(0, group_offset.x),
            axis(1, group_offset.y),
            axis(2, group_offset.z),
        )
    }

    /// [`chunk_origin`](Self::chunk_origin), or `None` when the origin or
    /// the chunk's last voxel falls outside `i32`.
    #[must_use]
    pub fn checked_chunk_origin(
        chunk_size: [usize; 3],
        group_offset: IVec3,
        grid_coord: [usize; 3],
    ) -> Option<IVec3> {
        let axis = |a: usize, offset: i32| -> Option<i32> {
            let stride = i32::try_from(chunk_size[a]).ok()?.checked_sub(1)?;
            let origin = i32::try_from(grid_coord[a])
                .ok()?
                .checked_add(offset)?
                .checked_mul(stride)?;
            origin.checked_add(stride)?;
            Some(origin)
        };
        Some(IVec3::new(
            axis(0, group_offset.x)?,
            axis(1, group_offset.y)?,
            axis(2, group_offset.z)?,
        ))
    }

    /// Generates `num_chunks` chunks of `chunk_size` voxels for the group at
    /// `group_offset`, in grid order, linked into a lattice.
    #[must_use]
    pub fn generate(
        &self,
        chunk_size: [usize; 3],
        num_chunks: [usize; 3],
        group_offset: IVec3,
    ) -> ChunkGrid<Voxel> {
        let [nx, ny, nz] = num_chunks;
        let total = nx * ny * nz;
        tracing::debug!(
            total,
            offset = ?group_offset.to_array(),
            "generating chunk group"
        );

        let mut grid_coords = Vec::with_capacity(total);
        for cz in 0..nz {
            for cy in 0..ny {
                for cx in 0..nx {
                    debug_assert_eq!(grid_index(num_chunks, cx, cy, cz), grid_coords.len());
                    grid_coords.push([cx, cy, cz]);
                }
            }
        }

        let fill = |grid_coord: &[usize; 3]| {
            let origin = Self::chunk_origin(chunk_size, group_offset, *grid_coord);
            self.fill_chunk(origin, chunk_size)
        };
        let chunks: Vec<PackedChunk> = if self.parallel {
            grid_coords.par_iter().map(fill).collect()
        } else {
            grid_coords.iter().map(fill).collect()
        };

        ChunkGrid::new(chunks, num_chunks)
    }

    /// Fills one chunk at `origin`.
    fn fill_chunk(&self, origin: IVec3, chunk_size: [usize; 3]) -> PackedChunk {
        let mut chunk = VoxelChunk::new(origin, chunk_size);
        let [sx, sy, sz] = chunk_size;

        for vz in 0..sz {
            for vy in 0..sy {
                for vx in 0..sx {
                    let position = [
                        f64::from(origin.x) + vx as f64,
                        f64::from(origin.y) + vy as f64,
                        f64::from(origin.z) + vz as f64,
                    ];
                    let warped = self.warp.transform(position, chunk_size);
                    let voxel = self.classifier.classify(warped);
                    chunk.set(vx as i32, vy as i32, vz as i32, voxel);
                }
            }
        }

        chunk
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_packing() {
        let threshold = NoiseThreshold::new(-1.0, 0.0);
        assert_eq!(threshold.pack(0.0), Voxel::EMPTY);
        assert_eq!(threshold.pack(0.5), Voxel::EMPTY);

        let deep = threshold.pack(-1.0);
        assert_eq!(deep.material(), Voxel::SOLID);
        assert_eq!(deep.amount(), 0);

        let mid = threshold.pack(-0.5);
        assert_eq!(mid.amount(), 127);

        // Below the band clamps to the bottom
        assert_eq!(threshold.pack(-3.0).amount(), 0);
    }

    #[test]
    fn test_threshold_validity() {
        assert!(NoiseThreshold::default().is_valid());
        assert!(!NoiseThreshold::new(0.0, 0.0).is_valid());
        assert!(!NoiseThreshold::new(0.5, -0.5).is_valid());
        assert!(!NoiseThreshold::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_chunk_origins_overlap_by_one_layer() {
        type Gen = TerrainGenerator;
        let size = [32, 32, 32];
        assert_eq!(Gen::chunk_origin(size, IVec3::ZERO, [0, 0, 0]), IVec3::ZERO);
        assert_eq!(Gen::chunk_origin(size, IVec3::ZERO, [1, 0, 0]), IVec3::new(31, 0, 0));
        assert_eq!(Gen::chunk_origin(size, IVec3::new(-1, 2, 0), [1, 1, 1]), IVec3::new(0, 93, 31));
    }

    #[test]
    fn test_checked_chunk_origin() {
        type Gen = TerrainGenerator;
        let size = [32, 32, 32];
        let offset = IVec3::new(-1, 2, 0);
        assert_eq!(
            Gen::checked_chunk_origin(size, offset, [1, 1, 1]),
            Some(Gen::chunk_origin(size, offset, [1, 1, 1]))
        );

        assert_eq!(Gen::checked_chunk_origin([4, 4, 4], IVec3::new(1_000_000_000, 0, 0), [0, 0, 0]), None);
        assert_eq!(Gen::checked_chunk_origin([4, 4, 4], IVec3::new(i32::MAX, 0, 0), [1, 0, 0]), None);
        // Origin fits but the last voxel does not
        let edge = i32::MAX / 3;
        assert_eq!(Gen::checked_chunk_origin([4, 4, 4], IVec3::new(0, 0, edge), [0, 0, 0]), None);
        assert!(Gen::checked_chunk_origin([4, 4, 4], IVec3::new(0, 0, edge - 1), [0, 0, 0]).is_some());
    }

    #[test]
    fn test_generation_determinism() {
        let gen1 = TerrainGenerator::new(WorldSeed::new(42));
        let gen2 = TerrainGenerator::new(WorldSeed::new(42));

        let a = gen1.generate([8, 8, 8], [2, 1, 2], IVec3::new(1, 0, -1));
        let b = gen2.generate([8, 8, 8], [2, 1, 2], IVec3::new(1, 0, -1));

        assert_eq!(a.len(), 4);
        for (ca, cb) in a.chunks().iter().zip(b.chunks()) {
            assert_eq!(ca.coords(), cb.coords());
            assert_eq!(ca.data(), cb.data());
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let seq = TerrainGenerator::new(WorldSeed::new(9));
        let par = TerrainGenerator::new(WorldSeed::new(9)).with_parallel(true);

        let a = seq.generate([6, 6, 6], [2, 2, 2], IVec3::ZERO);
        let b = par.generate([6, 6, 6], [2, 2, 2], IVec3::ZERO);
        for (ca, cb) in a.chunks().iter().zip(b.chunks()) {
            assert_eq!(ca.data(), cb.data());
        }
    }

    #[test]
    fn test_shared_faces_agree() {
        // Overlapping layers sample the same voxel-space positions
        let gen = TerrainGenerator::new(WorldSeed::new(3));
        let grid = gen.generate([5, 5, 5], [2, 1, 1], IVec3::ZERO);
        let (a, b) = (grid.chunk(0).unwrap(), grid.chunk(1).unwrap());
        for z in 0..5 {
            for y in 0..5 {
                assert_eq!(a.get(4, y, z), b.get(0, y, z));
            }
        }
    }

    #[test]
    fn test_custom_strategies() {
        let warp = |p: [f64; 3], _size: [usize; 3]| p;
        let classifier = |[_, y, _]: [f64; 3]| {
            if y < 2.0 {
                Voxel::pack(Voxel::SOLID, 255)
            } else {
                Voxel::EMPTY
            }
        };
        let gen = TerrainGenerator::with_strategies(warp, classifier);
        let grid = gen.generate([4, 4, 4], [1, 1, 1], IVec3::ZERO);
        let chunk = grid.chunk(0).unwrap();

        assert_eq!(chunk.get(0, 1, 0), Some(Voxel::pack(1, 255)));
        assert_eq!(chunk.get(3, 2, 3), Some(Voxel::EMPTY));
    }

    #[test]
    fn test_identity_warp_with_default_classifier() {
        let classifier = NoiseThresholdClassifier::new(WorldSeed::new(5), NoiseThreshold::new(-1.0, 1.5));
        let gen = TerrainGenerator::with_strategies(IdentityWarp, classifier);
        let grid = gen.generate([3, 3, 3], [1, 1, 1], IVec3::ZERO);
        // Upper bound above the noise range: everything is solid
        assert!(grid.chunk(0).unwrap().data().iter().all(|v| !v.is_empty()));
    }

    #[test]
    fn test_band_below_noise_range_is_all_empty() {
        let gen = TerrainGenerator::with_threshold(WorldSeed::new(42), NoiseThreshold::new(-3.0, -2.0));
        let grid = gen.generate([8, 8, 8], [2, 2, 2], IVec3::new(-1, -1, -1));
        for chunk in grid.chunks() {
            assert!(chunk.data().iter().all(|v| v.is_empty()));
        }
    }
}
