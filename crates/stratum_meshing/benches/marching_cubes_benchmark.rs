//! Benchmark for iso-surface extraction and mesh assembly.
//!
//! Run with: cargo bench --package stratum_meshing --bench marching_cubes_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use stratum_core::{IVec3, Vec3};
use stratum_meshing::{MarchingCubes, RawMesh};
use stratum_procedural::{convert_chunks, TerrainGenerator, WorldSeed};

fn benchmark_extract(c: &mut Criterion) {
    let generator = TerrainGenerator::new(WorldSeed::new(42));
    let levels = convert_chunks(&generator.generate([32, 32, 32], [2, 2, 2], IVec3::ZERO));
    let mc = MarchingCubes::default();

    let mut group = c.benchmark_group("extract_group");
    group.sample_size(10);
    group.bench_function("2x2x2_of_32_sequential", |b| {
        b.iter(|| black_box(mc.extract_grid(black_box(&levels), false)));
    });
    group.bench_function("2x2x2_of_32_parallel", |b| {
        b.iter(|| black_box(mc.extract_grid(black_box(&levels), true)));
    });
    group.finish();
}

fn benchmark_assemble(c: &mut Criterion) {
    let generator = TerrainGenerator::new(WorldSeed::new(42));
    let levels = convert_chunks(&generator.generate([32, 32, 32], [2, 2, 2], IVec3::ZERO));
    let meshes: Vec<RawMesh> = MarchingCubes::default()
        .extract_grid(&levels, false)
        .into_iter()
        .zip(levels.chunks())
        .map(|(mesh, chunk)| mesh.translated(Vec3::from(chunk.coords())))
        .collect();

    c.bench_function("merge_flat", |b| {
        b.iter(|| black_box(RawMesh::merge(black_box(&meshes))));
    });
    c.bench_function("merge_welded", |b| {
        b.iter(|| black_box(RawMesh::merge_welded(black_box(&meshes))));
    });
}

criterion_group!(benches, benchmark_extract, benchmark_assemble);
criterion_main!(benches);
