//! # Marching Cubes
//!
//! Extracts the iso-surface of a level-set chunk as a flat-shaded
//! triangle soup in chunk-local coordinates.
//!
//! ## Per-Cell Steps
//!
//! 1. Read the 8 corners through the chunk grid (corners past the chunk
//!    face continue into a linked neighbor).
//! 2. Build the cube index from the inside predicate.
//! 3. Place a vertex on every crossed edge.
//! 4. Emit the table's triangles, rounding positions to 2 decimals.
//!
//! A corner with no value (outside the lattice) is never inside.

use rayon::prelude::*;
use stratum_core::{ChunkGrid, ChunkView, Vec3};

use crate::mesh::{RawMesh, Triangle};
use crate::tables::{CORNER_OFFSETS, EDGE_CORNERS, EDGE_TABLE, TRI_TABLE};

/// Values closer than this are treated as equal during edge interpolation.
pub const INTERPOLATION_EPSILON: f32 = 0.0001;

/// Decimal places kept on emitted vertex positions.
pub const VERTEX_DECIMALS: i32 = 2;

/// Decides whether a corner `value` is inside the surface at `iso_level`.
pub type InsidePredicate = fn(value: f32, iso_level: f32) -> bool;

/// Default inside test: strictly below the iso level.
#[inline]
#[must_use]
pub fn below_iso(value: f32, iso_level: f32) -> bool {
    value < iso_level
}

/// Iso-surface extractor.
#[derive(Clone, Copy, Debug)]
pub struct MarchingCubes {
    /// Surface threshold.
    iso_level: f32,
    /// Corner classification.
    inside: InsidePredicate,
}

impl Default for MarchingCubes {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl MarchingCubes {
    /// Creates an extractor with the default inside test.
    #[must_use]
    pub fn new(iso_level: f32) -> Self {
        Self {
            iso_level,
            inside: below_iso,
        }
    }

    /// Replaces the inside test.
    #[must_use]
    pub fn with_inside(mut self, inside: InsidePredicate) -> Self {
        self.inside = inside;
        self
    }

    /// Surface threshold.
    #[must_use]
    pub const fn iso_level(&self) -> f32 {
        self.iso_level
    }

    /// Extracts chunk `view` as a flat-shaded soup.
    ///
    /// Cells start at every voxel in `[0, size - 2]` on each axis.
    #[must_use]
    pub fn extract(&self, view: ChunkView<'_, f32>, size: [usize; 3]) -> RawMesh {
        RawMesh::from_triangles(&self.triangles(view, size))
    }

    /// Triangles of chunk `view`, in cell order (x fastest, then y, then z).
    #[must_use]
    pub fn triangles(&self, view: ChunkView<'_, f32>, size: [usize; 3]) -> Vec<Triangle> {
        let mut triangles = Vec::new();
        let cells = |s: usize| 0..s.saturating_sub(1) as i32;

        for z in cells(size[2]) {
            for y in cells(size[1]) {
                for x in cells(size[0]) {
                    self.polygonize(&view, [x, y, z], &mut triangles);
                }
            }
        }

        triangles
    }

    /// Extracts every chunk of `grid` in grid order, each using its own
    /// size. Meshes stay chunk-local.
    #[must_use]
    pub fn extract_grid(&self, grid: &ChunkGrid<f32>, parallel: bool) -> Vec<RawMesh> {
        let extract_one = |id: usize| {
            let view = grid.view(id);
            let size = view.chunk().map_or([0; 3], |chunk| chunk.size());
            let mesh = self.extract(view, size);
            tracing::debug!(
                chunk = id,
                triangles = mesh.face_count(),
                "extracted chunk surface"
            );
            mesh
        };

        if parallel {
            (0..grid.len()).into_par_iter().map(extract_one).collect()
        } else {
            (0..grid.len()).map(extract_one).collect()
        }
    }

    /// Appends the triangles of the cell whose minimum corner is `origin`.
    fn polygonize(&self, view: &ChunkView<'_, f32>, origin: [i32; 3], out: &mut Vec<Triangle>) {
        let mut values = [None; 8];
        let mut positions = [Vec3::ZERO; 8];
        let mut cube_index = 0usize;

        for (corner, offset) in CORNER_OFFSETS.iter().enumerate() {
            let [x, y, z] = [
                origin[0] + offset[0],
                origin[1] + offset[1],
                origin[2] + offset[2],
            ];
            let value = view.get_with_boundary_jump(x, y, z);
            if value.is_some_and(|v| (self.inside)(v, self.iso_level)) {
                cube_index |= 1 << corner;
            }
            values[corner] = value;
            positions[corner] = Vec3::new(x as f32, y as f32, z as f32);
        }

        let edges = EDGE_TABLE[cube_index];
        if edges == 0 {
            return;
        }

        let mut edge_points = [Vec3::ZERO; 12];
        for (edge, &[a, b]) in EDGE_CORNERS.iter().enumerate() {
            if edges & (1 << edge) != 0 {
                edge_points[edge] =
                    self.interpolate(positions[a], positions[b], values[a], values[b]);
            }
        }

        for triple in TRI_TABLE[cube_index].chunks_exact(3) {
            if triple[0] < 0 {
                break;
            }
            out.push([
                edge_points[triple[0] as usize].quantize(VERTEX_DECIMALS),
                edge_points[triple[1] as usize].quantize(VERTEX_DECIMALS),
                edge_points[triple[2] as usize].quantize(VERTEX_DECIMALS),
            ]);
        }
    }

    /// Surface crossing on the edge from `pa` to `pb`.
    ///
    /// Snaps to a corner whose value is within epsilon of the iso level,
    /// and to `pa` when the two values are within epsilon of each other.
    /// With one value missing the crossing snaps to the present corner.
    fn interpolate(&self, pa: Vec3, pb: Vec3, va: Option<f32>, vb: Option<f32>) -> Vec3 {
        let iso = self.iso_level;
        match (va, vb) {
            (Some(a), Some(b)) => {
                if (iso - a).abs() < INTERPOLATION_EPSILON {
                    pa
                } else if (iso - b).abs() < INTERPOLATION_EPSILON {
                    pb
                } else if (a - b).abs() < INTERPOLATION_EPSILON {
                    pa
                } else {
                    pa.lerp(pb, ((iso - a) / (b - a)).abs())
                }
            }
            (None, Some(_)) => pb,
            (Some(_) | None, None) => pa,
        }
    }
}
