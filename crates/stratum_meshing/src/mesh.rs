//! # Raw Meshes
//!
//! Triangle geometry between extraction and upload: positions, per-vertex
//! normals and index triples.
//!
//! ## Two Shapes
//!
//! | Shape    | Vertices per face | Normals            | Produced by                      |
//! |----------|-------------------|--------------------|----------------------------------|
//! | Soup     | 3 fresh slots     | flat, per face     | [`RawMesh::from_triangles`], [`RawMesh::with_flat_normals`] |
//! | Indexed  | shared            | smoothed, per vertex | [`RawMesh::optimize`]          |
//!
//! Both keep `normals.len() == vertices.len()` and every face index in
//! range.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use stratum_core::Vec3;

/// One triangle, three positions in winding order.
pub type Triangle = [Vec3; 3];

/// Flat normal of a triangle; zero for degenerate triangles.
#[inline]
#[must_use]
pub fn face_normal([a, b, c]: Triangle) -> Vec3 {
    (b - a).cross(c - b).normalize_or_zero()
}

/// How [`RawMesh::merge_with`] treats vertices on chunk seams.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Concatenate only. Seam vertices stay duplicated with flat normals.
    #[default]
    Flat,
    /// Concatenate, then weld equal positions and smooth normals.
    Welded,
}

/// Positions, normals and faces of a triangle mesh.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMesh {
    /// Vertex positions.
    pub vertices: Vec<Vec3>,
    /// One normal per vertex.
    pub normals: Vec<Vec3>,
    /// Index triples into `vertices`.
    pub faces: Vec<[u32; 3]>,
}

impl RawMesh {
    /// Creates an empty mesh.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            normals: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Builds an unindexed soup: every triangle gets 3 fresh vertices
    /// sharing its flat normal.
    #[must_use]
    pub fn from_triangles(triangles: &[Triangle]) -> Self {
        let mut mesh = Self {
            vertices: Vec::with_capacity(triangles.len() * 3),
            normals: Vec::with_capacity(triangles.len() * 3),
            faces: Vec::with_capacity(triangles.len()),
        };
        for &triangle in triangles {
            mesh.push_flat(triangle);
        }
        mesh
    }

    /// Appends one flat-shaded triangle.
    fn push_flat(&mut self, triangle: Triangle) {
        let base = self.vertices.len() as u32;
        let normal = face_normal(triangle);
        self.vertices.extend_from_slice(&triangle);
        self.normals.extend_from_slice(&[normal; 3]);
        self.faces.push([base, base + 1, base + 2]);
    }

    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    #[inline]
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// True when the mesh has no triangles.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Positions of face `index`, or `None` when the face or any of its
    /// vertices is missing.
    #[must_use]
    pub fn triangle(&self, index: usize) -> Option<Triangle> {
        let [a, b, c] = *self.faces.get(index)?;
        Some([
            *self.vertices.get(a as usize)?,
            *self.vertices.get(b as usize)?,
            *self.vertices.get(c as usize)?,
        ])
    }

    /// Iterates face positions, skipping faces with dangling indices.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.faces.len()).filter_map(|i| self.triangle(i))
    }

    /// True when normals parallel the vertices and every face index is in
    /// range.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let len = self.vertices.len();
        self.normals.len() == len
            && self
                .faces
                .iter()
                .all(|face| face.iter().all(|&i| (i as usize) < len))
    }

    /// Rebuilds the mesh as a soup with flat per-face normals.
    #[must_use]
    pub fn with_flat_normals(&self) -> Self {
        let triangles: Vec<Triangle> = self.triangles().collect();
        Self::from_triangles(&triangles)
    }

    /// Welds vertices with identical positions and smooths normals.
    ///
    /// Each unique position gets the normalized sum of the flat normals of
    /// every face touching it. A sum that cancels to zero yields a zero
    /// normal. Face order is preserved.
    #[must_use]
    pub fn optimize(&self) -> Self {
        let mut lookup: HashMap<[u32; 3], u32> = HashMap::with_capacity(self.vertices.len());
        let mut vertices = Vec::new();
        let mut sums: Vec<Vec3> = Vec::new();
        let mut faces = Vec::with_capacity(self.faces.len());

        for triangle in self.triangles() {
            let normal = face_normal(triangle);
            let mut face = [0u32; 3];
            for (slot, position) in face.iter_mut().zip(triangle) {
                let index = *lookup.entry(position_key(position)).or_insert_with(|| {
                    vertices.push(position);
                    sums.push(Vec3::ZERO);
                    (vertices.len() - 1) as u32
                });
                sums[index as usize] += normal;
                *slot = index;
            }
            faces.push(face);
        }

        tracing::debug!(
            original = self.vertices.len(),
            deduplicated = vertices.len(),
            "Original vertex count: {}, deduplicated count: {}",
            self.vertices.len(),
            vertices.len()
        );

        Self {
            vertices,
            normals: sums.into_iter().map(Vec3::normalize_or_zero).collect(),
            faces,
        }
    }

    /// Moves every vertex by `delta`.
    pub fn translate(&mut self, delta: Vec3) {
        for vertex in &mut self.vertices {
            *vertex += delta;
        }
    }

    /// Owned form of [`translate`](Self::translate).
    #[must_use]
    pub fn translated(mut self, delta: Vec3) -> Self {
        self.translate(delta);
        self
    }

    /// Negates every normal.
    pub fn flip_normals(&mut self) {
        for normal in &mut self.normals {
            *normal = -*normal;
        }
    }

    /// Appends `other`, re-basing its face indices.
    pub fn append(&mut self, other: &Self) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.normals.extend_from_slice(&other.normals);
        self.faces.extend(
            other
                .faces
                .iter()
                .map(|&[a, b, c]| [a + base, b + base, c + base]),
        );
    }

    /// Writes each face's flat normal onto its three vertices. A vertex
    /// shared by several faces keeps the normal of the last one.
    pub fn reset_flat_normals(&mut self) {
        self.normals.resize(self.vertices.len(), Vec3::ZERO);
        for index in 0..self.faces.len() {
            let Some(triangle) = self.triangle(index) else {
                continue;
            };
            let normal = face_normal(triangle);
            for corner in self.faces[index] {
                self.normals[corner as usize] = normal;
            }
        }
    }

    /// Concatenates meshes without welding and recomputes flat normals.
    /// Seam vertices stay duplicated.
    #[must_use]
    pub fn merge(meshes: &[Self]) -> Self {
        let mut merged = Self {
            vertices: Vec::with_capacity(meshes.iter().map(Self::vertex_count).sum()),
            normals: Vec::with_capacity(meshes.iter().map(Self::vertex_count).sum()),
            faces: Vec::with_capacity(meshes.iter().map(Self::face_count).sum()),
        };
        for mesh in meshes {
            merged.append(mesh);
        }
        merged.reset_flat_normals();

        tracing::info!(
            "Merged {} meshes: {} vertices, {} faces",
            meshes.len(),
            merged.vertex_count(),
            merged.face_count()
        );
        merged
    }

    /// Concatenates meshes, then welds seams with [`optimize`](Self::optimize).
    #[must_use]
    pub fn merge_welded(meshes: &[Self]) -> Self {
        Self::merge(meshes).optimize()
    }

    /// Merges with the given seam strategy.
    #[must_use]
    pub fn merge_with(meshes: &[Self], strategy: MergeStrategy) -> Self {
        match strategy {
            MergeStrategy::Flat => Self::merge(meshes),
            MergeStrategy::Welded => Self::merge_welded(meshes),
        }
    }

    /// Positions as a tightly packed `f32` byte buffer.
    #[must_use]
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Normals as a tightly packed `f32` byte buffer.
    #[must_use]
    pub fn normal_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normals)
    }

    /// Face indices as a tightly packed `u32` byte buffer.
    #[must_use]
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.faces)
    }
}

/// Exact hash key of a position; `-0.0` and `0.0` share a key.
#[inline]
fn position_key(v: Vec3) -> [u32; 3] {
    [
        (v.x + 0.0).to_bits(),
        (v.y + 0.0).to_bits(),
        (v.z + 0.0).to_bits(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> RawMesh {
        // Two triangles sharing the diagonal (0,0,0)-(1,0,1), facing +y
        RawMesh::from_triangles(&[
            [
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 1.0),
                Vec3::new(1.0, 0.0, 1.0),
            ],
            [
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 1.0),
                Vec3::new(1.0, 0.0, 0.0),
            ],
        ])
    }

    #[test]
    fn test_from_triangles_is_soup() {
        let mesh = quad();
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.faces, vec![[0, 1, 2], [3, 4, 5]]);
        assert!(mesh.is_consistent());
        for normal in &mesh.normals {
            assert!(normal.approx_eq(Vec3::Y, 1e-6), "expected +y, got {normal:?}");
        }
    }

    #[test]
    fn test_degenerate_triangle_has_zero_normal() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(face_normal([p, p, p]), Vec3::ZERO);
    }

    #[test]
    fn test_optimize_welds_shared_vertices() {
        let mesh = quad();
        let optimized = mesh.optimize();

        assert_eq!(optimized.vertex_count(), 4);
        assert_eq!(optimized.face_count(), 2);
        assert!(optimized.is_consistent());
        assert_eq!(optimized.faces[0], [0, 1, 2]);
        assert_eq!(optimized.faces[1], [0, 2, 3]);
        for normal in &optimized.normals {
            assert!(normal.approx_eq(Vec3::Y, 1e-6));
        }
    }

    #[test]
    fn test_optimize_without_duplicates_keeps_count() {
        let mesh = RawMesh::from_triangles(&[[
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]]);
        assert_eq!(mesh.optimize().vertex_count(), mesh.vertex_count());
    }

    #[test]
    fn test_opposing_faces_give_zero_normal() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(1.0, 0.0, 0.0);
        let c = Vec3::new(0.0, 1.0, 0.0);
        let mesh = RawMesh::from_triangles(&[[a, b, c], [a, c, b]]);
        let optimized = mesh.optimize();

        assert_eq!(optimized.vertex_count(), 3);
        for normal in &optimized.normals {
            assert_eq!(*normal, Vec3::ZERO);
            assert!(!normal.x.is_nan());
        }
    }

    #[test]
    fn test_negative_zero_welds_with_zero() {
        let mesh = RawMesh::from_triangles(&[
            [Vec3::new(0.0, 0.0, 0.0), Vec3::X, Vec3::Y],
            [Vec3::new(-0.0, 0.0, 0.0), Vec3::Y, Vec3::Z],
        ]);
        assert_eq!(mesh.optimize().vertex_count(), 4);
    }

    #[test]
    fn test_translate_round_trip() {
        let mesh = quad();
        let delta = Vec3::new(31.0, -62.0, 0.25);
        let back = mesh.clone().translated(delta).translated(-delta);

        for (a, b) in mesh.vertices.iter().zip(&back.vertices) {
            assert!(a.approx_eq(*b, 1e-4));
        }
        assert_eq!(mesh.normals, back.normals);
        assert_eq!(mesh.faces, back.faces);
    }

    #[test]
    fn test_flip_normals() {
        let mut mesh = quad();
        mesh.flip_normals();
        assert!(mesh.normals.iter().all(|n| n.approx_eq(-Vec3::Y, 1e-6)));
    }

    #[test]
    fn test_merge_rebases_faces() {
        let a = quad();
        let b = quad().translated(Vec3::new(5.0, 0.0, 0.0));
        let merged = RawMesh::merge(&[a.clone(), b.clone()]);

        assert_eq!(merged.vertex_count(), a.vertex_count() + b.vertex_count());
        assert_eq!(merged.face_count(), 4);
        assert_eq!(merged.faces[2], [6, 7, 8]);
        assert!(merged.is_consistent());
        assert_eq!(merged.triangle(2), b.triangle(0));
    }

    #[test]
    fn test_merge_strategies() {
        let a = quad();
        let b = quad().translated(Vec3::new(1.0, 0.0, 0.0));

        let flat = RawMesh::merge_with(&[a.clone(), b.clone()], MergeStrategy::Flat);
        let welded = RawMesh::merge_with(&[a, b], MergeStrategy::Welded);

        assert_eq!(flat.vertex_count(), 12);
        // Two unit quads side by side share an edge
        assert_eq!(welded.vertex_count(), 6);
        assert_eq!(welded.face_count(), flat.face_count());
    }

    #[test]
    fn test_merge_restores_flat_normals() {
        // A tent: two faces meeting at a ridge along z, sloping to -x and +x
        let ridge_a = Vec3::new(0.0, 1.0, 0.0);
        let ridge_b = Vec3::new(0.0, 1.0, 1.0);
        let tent = RawMesh::from_triangles(&[
            [Vec3::new(-1.0, 0.0, 0.0), ridge_b, ridge_a],
            [Vec3::new(1.0, 0.0, 0.0), ridge_a, ridge_b],
        ]);
        let welded = tent.optimize();
        assert_eq!(welded.vertex_count(), 4);
        let smoothed = welded.normals[1];
        assert!(smoothed.approx_eq(Vec3::Y, 1e-5), "ridge normal {smoothed:?}");

        let merged = RawMesh::merge(&[welded.clone()]);
        assert_eq!(merged.vertex_count(), welded.vertex_count());
        assert_eq!(merged.faces, welded.faces);

        // Every vertex carries the flat normal of the last face touching it
        let mut expected = vec![Vec3::ZERO; merged.vertex_count()];
        for triangle_index in 0..merged.face_count() {
            let normal = face_normal(merged.triangle(triangle_index).unwrap());
            for corner in merged.faces[triangle_index] {
                expected[corner as usize] = normal;
            }
        }
        assert_eq!(merged.normals, expected);
        for normal in &merged.normals {
            assert!(!normal.approx_eq(Vec3::Y, 1e-3), "smoothed normal {normal:?} survived merge");
            assert!((normal.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_merge_empty() {
        let merged = RawMesh::merge(&[]);
        assert!(merged.is_empty());
        assert!(merged.is_consistent());
    }

    #[test]
    fn test_with_flat_normals_unindexes() {
        let welded = quad().optimize();
        let flat = welded.with_flat_normals();
        assert_eq!(flat, quad());
    }

    #[test]
    fn test_byte_views() {
        let mesh = quad();
        assert_eq!(mesh.position_bytes().len(), 6 * 3 * 4);
        assert_eq!(mesh.normal_bytes().len(), 6 * 3 * 4);
        assert_eq!(mesh.index_bytes().len(), 2 * 3 * 4);
    }
}
